//! Platform-agnostic application bootstrap for Hostdeck.
//!
//! Provides `AppState` (shell container), `AppStateBuilder` (adapter injection),
//! and `StartupHooks` (platform-specific startup callbacks).

pub mod adapters;
mod settings;

pub use settings::{load_settings, SETTINGS_FILE};

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use hostdeck_core::error::{CoreError, CoreResult};
use hostdeck_core::services::{LoadReport, ReqwestHostProbe, ServiceContext, Shell};
use hostdeck_core::traits::{
    ContentSurfaceFactory, Dialogs, HostProbe, PersistentStore, ScreenSharePicker, WindowMenu,
};
use hostdeck_core::ShellConfig;

/// Platform-specific hooks for the startup sequence.
///
/// Use `NoopStartupHooks` when there is no legacy install to import from.
#[async_trait::async_trait]
pub trait StartupHooks: Send + Sync {
    /// Host list shipped by an older install (`servers.json`), keyed by title.
    /// Only consulted when no hosts are persisted yet.
    async fn find_legacy_manifest(&self) -> Option<BTreeMap<String, String>> {
        None
    }

    /// Called once the shell has finished starting.
    async fn on_started(&self, _report: &LoadReport) {}
}

/// No-op startup hooks.
pub struct NoopStartupHooks;

#[async_trait::async_trait]
impl StartupHooks for NoopStartupHooks {}

/// Platform-agnostic application state.
///
/// Every frontend constructs this once at startup via `AppStateBuilder`.
pub struct AppState {
    /// Service context (holds all adapters)
    pub ctx: Arc<ServiceContext>,
    /// The shell coordinating registry, views, sidebar and certificates
    pub shell: Shell,
    /// Whether the startup sequence has completed
    pub startup_completed: AtomicBool,
}

impl AppState {
    /// Run the startup sequence: legacy manifest lookup, then shell start.
    ///
    /// `args` are the process launch arguments, scanned for a deep link.
    pub async fn run_startup(
        &self,
        hooks: &dyn StartupHooks,
        args: &[String],
    ) -> CoreResult<LoadReport> {
        let manifest = hooks.find_legacy_manifest().await;
        if let Some(ref manifest) = manifest {
            log::info!("Found legacy manifest with {} entries", manifest.len());
        }

        let report = self.shell.start(manifest.as_ref(), args).await?;
        hooks.on_started(&report).await;
        self.startup_completed.store(true, Ordering::SeqCst);
        Ok(report)
    }

    pub fn is_started(&self) -> bool {
        self.startup_completed.load(Ordering::SeqCst)
    }
}

/// Builder for constructing `AppState` with platform-specific adapters.
///
/// # Required adapters
/// - `store`: where shell state is persisted
/// - `surfaces`: how content views are created
/// - `dialogs`: how the user is asked
/// - `window_menu`: the application's server menu
/// - `screen_share`: the screen-source picker
///
/// # Optional
/// - `probe`: defaults to `ReqwestHostProbe`
/// - `config`: defaults to `ShellConfig::default()`
pub struct AppStateBuilder {
    store: Option<Arc<dyn PersistentStore>>,
    surfaces: Option<Arc<dyn ContentSurfaceFactory>>,
    dialogs: Option<Arc<dyn Dialogs>>,
    window_menu: Option<Arc<dyn WindowMenu>>,
    screen_share: Option<Arc<dyn ScreenSharePicker>>,
    probe: Option<Arc<dyn HostProbe>>,
    config: Option<ShellConfig>,
}

impl AppStateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: None,
            surfaces: None,
            dialogs: None,
            window_menu: None,
            screen_share: None,
            probe: None,
            config: None,
        }
    }

    #[must_use]
    pub fn store(mut self, store: Arc<dyn PersistentStore>) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn surfaces(mut self, surfaces: Arc<dyn ContentSurfaceFactory>) -> Self {
        self.surfaces = Some(surfaces);
        self
    }

    #[must_use]
    pub fn dialogs(mut self, dialogs: Arc<dyn Dialogs>) -> Self {
        self.dialogs = Some(dialogs);
        self
    }

    #[must_use]
    pub fn window_menu(mut self, menu: Arc<dyn WindowMenu>) -> Self {
        self.window_menu = Some(menu);
        self
    }

    #[must_use]
    pub fn screen_share(mut self, picker: Arc<dyn ScreenSharePicker>) -> Self {
        self.screen_share = Some(picker);
        self
    }

    #[must_use]
    pub fn probe(mut self, probe: Arc<dyn HostProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    #[must_use]
    pub fn config(mut self, config: ShellConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the `AppState`.
    ///
    /// # Errors
    /// Returns `CoreError::MissingCollaborator` if a required adapter is missing,
    /// or `CoreError::NetworkError` if the default probe cannot be created.
    pub fn build(self) -> CoreResult<AppState> {
        let store = self
            .store
            .ok_or_else(|| CoreError::MissingCollaborator("store".to_string()))?;
        let surfaces = self
            .surfaces
            .ok_or_else(|| CoreError::MissingCollaborator("surfaces".to_string()))?;
        let dialogs = self
            .dialogs
            .ok_or_else(|| CoreError::MissingCollaborator("dialogs".to_string()))?;
        let window_menu = self
            .window_menu
            .ok_or_else(|| CoreError::MissingCollaborator("window_menu".to_string()))?;
        let screen_share = self
            .screen_share
            .ok_or_else(|| CoreError::MissingCollaborator("screen_share".to_string()))?;
        let probe: Arc<dyn HostProbe> = match self.probe {
            Some(probe) => probe,
            None => Arc::new(ReqwestHostProbe::new()?),
        };

        let ctx = Arc::new(ServiceContext::new(
            store,
            surfaces,
            dialogs,
            window_menu,
            screen_share,
            probe,
            self.config.unwrap_or_default(),
        ));
        let shell = Shell::new(&ctx);

        Ok(AppState {
            ctx,
            shell,
            startup_completed: AtomicBool::new(false),
        })
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
