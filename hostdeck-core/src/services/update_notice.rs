//! Update-notice policy
//!
//! Decides whether a "new version available" prompt is shown. The download
//! and install flow itself lives outside the core.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::ShellConfig;
use crate::traits::PersistentStore;

pub const UPDATE_KEY: &str = "hostdeck.update";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdatePreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    skip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    auto_update: Option<bool>,
}

pub struct UpdateNotifier {
    store: Arc<dyn PersistentStore>,
    config: Arc<ShellConfig>,
}

impl UpdateNotifier {
    pub fn new(store: Arc<dyn PersistentStore>, config: Arc<ShellConfig>) -> Self {
        Self { store, config }
    }

    /// Whether to prompt about `version`.
    ///
    /// Always false while `notifyOnUpdate` is off.
    pub async fn should_notify(&self, version: &str) -> bool {
        if !self.config.notify_on_update {
            log::debug!("Update {version} available, notification disabled");
            return false;
        }
        self.preferences().await.skip.as_deref() != Some(version)
    }

    pub async fn skip_version(&self, version: &str) {
        let mut prefs = self.preferences().await;
        prefs.skip = Some(version.to_string());
        self.save(&prefs).await;
    }

    pub async fn skipped_version(&self) -> Option<String> {
        self.preferences().await.skip
    }

    /// Automatic update checks, on unless turned off.
    pub async fn auto_check(&self) -> bool {
        self.preferences().await.auto_update.unwrap_or(true)
    }

    pub async fn set_auto_check(&self, enabled: bool) {
        let mut prefs = self.preferences().await;
        prefs.auto_update = Some(enabled);
        self.save(&prefs).await;
    }

    async fn preferences(&self) -> UpdatePreferences {
        match self.store.get(UPDATE_KEY).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                log::warn!("Update preferences corrupted, using defaults: {e}");
                UpdatePreferences::default()
            }),
            Ok(None) => UpdatePreferences::default(),
            Err(e) => {
                log::error!("Failed to read {UPDATE_KEY}: {e}");
                UpdatePreferences::default()
            }
        }
    }

    async fn save(&self, prefs: &UpdatePreferences) {
        let result = match serde_json::to_string(prefs) {
            Ok(json) => self.store.set(UPDATE_KEY, &json).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = result {
            log::error!("Failed to persist {UPDATE_KEY}: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockStore;

    fn notifier(notify_on_update: bool) -> (UpdateNotifier, Arc<MockStore>) {
        let store = Arc::new(MockStore::new());
        let config = ShellConfig {
            notify_on_update,
            ..ShellConfig::default()
        };
        (UpdateNotifier::new(store.clone(), Arc::new(config)), store)
    }

    #[tokio::test]
    async fn disabled_by_default() {
        let (notifier, _store) = notifier(false);
        assert!(!notifier.should_notify("2.0.0").await);
    }

    #[tokio::test]
    async fn skipped_version_is_not_announced() {
        let (notifier, store) = notifier(true);
        assert!(notifier.should_notify("2.0.0").await);

        notifier.skip_version("2.0.0").await;
        assert!(!notifier.should_notify("2.0.0").await);
        assert!(notifier.should_notify("2.1.0").await);
        assert_eq!(
            store.raw(UPDATE_KEY).await.as_deref(),
            Some(r#"{"skip":"2.0.0"}"#)
        );
    }

    #[tokio::test]
    async fn auto_check_defaults_on() {
        let (notifier, store) = notifier(false);
        assert!(notifier.auto_check().await);

        notifier.set_auto_check(false).await;
        assert!(!notifier.auto_check().await);

        notifier.skip_version("1.2.3").await;
        assert_eq!(
            store.raw(UPDATE_KEY).await.as_deref(),
            Some(r#"{"skip":"1.2.3","autoUpdate":false}"#)
        );
    }

    #[tokio::test]
    async fn corrupted_preferences_fall_back() {
        let (notifier, store) = notifier(true);
        store.seed(UPDATE_KEY, "[").await;
        assert!(notifier.auto_check().await);
        assert_eq!(notifier.skipped_version().await, None);
    }
}
