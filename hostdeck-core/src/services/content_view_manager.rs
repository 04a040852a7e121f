//! Content view manager
//!
//! Owns one embedded surface per registered host, keyed by host url.
//! Views are kept loaded while hidden so sessions survive switching.
//! Messages from hosted content are translated into `ShellIntent`s and
//! never applied to other components directly.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::json;

use crate::config::ShellConfig;
use crate::traits::{ContentSurface, ContentSurfaceFactory, SurfaceSpec};
use crate::types::{Badge, ContentMessage, HostRecord, LoadFailure, RegistryEvent, ShellIntent};

/// Sent to a view when it becomes active so it reports its theme colors
pub const REQUEST_SIDEBAR_COLOR: &str = "request-sidebar-color";
/// Carries the picked capture source back to the requesting content
pub const SCREENSHARE_RESULT: &str = "screenshare-result";

struct ViewSlot {
    surface: Box<dyn ContentSurface>,
    showing_error_page: bool,
}

pub struct ContentViewManager {
    factory: Arc<dyn ContentSurfaceFactory>,
    config: Arc<ShellConfig>,
    views: BTreeMap<String, ViewSlot>,
    active: Option<String>,
    landing_visible: bool,
    sidebar_visible: bool,
}

impl ContentViewManager {
    pub fn new(factory: Arc<dyn ContentSurfaceFactory>, config: Arc<ShellConfig>) -> Self {
        Self {
            factory,
            config,
            views: BTreeMap::new(),
            active: None,
            landing_visible: false,
            sidebar_visible: true,
        }
    }

    // ===== Registry events =====

    pub fn handle_event(&mut self, event: &RegistryEvent) {
        match event {
            // Loaded also precedes ActiveSet on startup; only an empty
            // registry gets the landing surface.
            RegistryEvent::Loaded => {
                if self.active.is_none() && self.views.is_empty() {
                    self.show_landing();
                }
            }
            RegistryEvent::HostAdded(record) => {
                self.add(record);
            }
            RegistryEvent::HostRemoved(url) => {
                self.remove(url);
            }
            RegistryEvent::ActiveSet(url) => self.set_active(url),
            RegistryEvent::ActiveCleared => {
                self.deactivate_all();
                self.show_landing();
            }
            RegistryEvent::TitleSet { .. } => {}
        }
    }

    // ===== Lifecycle =====

    /// Create the view for `record`; no-op if one exists.
    pub fn add(&mut self, record: &HostRecord) -> bool {
        if self.views.contains_key(&record.url) {
            return false;
        }

        let spec = SurfaceSpec {
            host_url: record.url.clone(),
            initial_url: record.start_url().to_string(),
            isolated: true,
            allow_popups: true,
            bridge_script: self.config.bridge_script.clone(),
            sidebar_visible: self.sidebar_visible,
        };
        let surface = self.factory.create(&spec);

        log::debug!("[Views] Created view for {}", record.url);
        self.views.insert(
            record.url.clone(),
            ViewSlot {
                surface,
                showing_error_page: false,
            },
        );
        true
    }

    pub fn remove(&mut self, url: &str) -> bool {
        let Some(slot) = self.views.remove(url) else {
            return false;
        };
        slot.surface.destroy();
        if self.active.as_deref() == Some(url) {
            self.active = None;
        }
        log::debug!("[Views] Destroyed view for {url}");
        true
    }

    /// Deactivate every view, then activate `url`.
    ///
    /// At no point are two views active. No-op when `url` is already active.
    pub fn set_active(&mut self, url: &str) {
        if self.active.as_deref() == Some(url) {
            return;
        }

        self.deactivate_all();
        if let Some(slot) = self.views.get(url) {
            slot.surface.set_active(true);
            slot.surface.focus();
            slot.surface.send(REQUEST_SIDEBAR_COLOR, &serde_json::Value::Null);
            self.active = Some(url.to_string());
        } else {
            log::warn!("[Views] No view to activate for {url}");
        }
    }

    /// Hide every view and the landing surface.
    pub fn deactivate_all(&mut self) {
        if let Some(url) = self.active.take() {
            if let Some(slot) = self.views.get(&url) {
                slot.surface.set_active(false);
            }
        }
        if self.landing_visible {
            self.factory.set_landing_visible(false);
            self.landing_visible = false;
        }
    }

    pub fn show_landing(&mut self) {
        if !self.landing_visible {
            self.factory.set_landing_visible(true);
            self.landing_visible = true;
        }
    }

    // ===== Content bridge =====

    /// Translate a message from `url`'s content into shell intents.
    pub fn handle_message(&self, url: &str, message: ContentMessage) -> Vec<ShellIntent> {
        if !self.views.contains_key(url) {
            log::debug!("[Views] Ignoring {} from unknown view {url}", message.channel());
            return Vec::new();
        }

        let url = url.to_string();
        let intent = match message {
            ContentMessage::TitleChanged(title) => ShellIntent::SetHostTitle { url, title },
            ContentMessage::UnreadChanged(raw) => ShellIntent::SetBadge {
                url,
                badge: Badge::parse(raw.as_deref()),
            },
            ContentMessage::Focus => ShellIntent::Activate(url),
            ContentMessage::GetSourceId => ShellIntent::RequestScreenShare(url),
            ContentMessage::ReloadServer => ShellIntent::ReloadActive,
            ContentMessage::SidebarBackground(colors) => ShellIntent::SetSidebarColors(colors),
        };
        vec![intent]
    }

    /// In-page navigation inside `host_url`'s view.
    ///
    /// Navigations that stay within the host are recorded as the last
    /// visited path.
    pub fn handle_navigation(&mut self, host_url: &str, nav_url: &str) -> Option<ShellIntent> {
        let slot = self.views.get_mut(host_url)?;
        if !nav_url.starts_with(host_url) {
            return None;
        }
        slot.showing_error_page = false;
        Some(ShellIntent::RecordLastPath {
            url: host_url.to_string(),
            path: nav_url.to_string(),
        })
    }

    /// Swap a failed view to the local error page. Returns whether it did.
    pub fn handle_load_failure(&mut self, url: &str, failure: &LoadFailure) -> bool {
        if !failure.needs_error_page() {
            return false;
        }
        let Some(slot) = self.views.get_mut(url) else {
            return false;
        };
        // The error page itself failing must not loop.
        if slot.showing_error_page {
            return false;
        }

        log::warn!("[Views] {url} failed to load ({:?}), showing error page", failure.kind);
        slot.surface.load_url(&self.config.error_page_url);
        slot.showing_error_page = true;
        true
    }

    /// User-triggered retry from the error page.
    pub fn retry(&mut self, url: &str) -> bool {
        let Some(slot) = self.views.get_mut(url) else {
            return false;
        };
        slot.showing_error_page = false;
        slot.surface.load_url(url);
        true
    }

    // ===== Active view commands =====

    /// Reload the active view's content (menu / keyboard reload).
    pub fn reload_active(&mut self) {
        let Some(url) = self.active.clone() else {
            return;
        };
        if let Some(slot) = self.views.get_mut(&url) {
            if slot.showing_error_page {
                slot.showing_error_page = false;
                slot.surface.load_url(&url);
            } else {
                slot.surface.reload();
            }
        }
    }

    /// Load the active host's root url again (content-requested reload).
    pub fn reload_active_host(&mut self) {
        if let Some(url) = self.active.clone() {
            self.retry(&url);
        }
    }

    pub fn go_back(&self) {
        if let Some(slot) = self.active_slot() {
            slot.surface.go_back();
        }
    }

    pub fn go_forward(&self) {
        if let Some(slot) = self.active_slot() {
            slot.surface.go_forward();
        }
    }

    pub fn deliver_screen_share_result(&self, source_id: &str) {
        match self.active_slot() {
            Some(slot) => slot
                .surface
                .send(SCREENSHARE_RESULT, &json!({ "sourceId": source_id })),
            None => log::debug!("[Views] Screen-share result with no active view dropped"),
        }
    }

    /// Re-layout every view for the sidebar's visibility.
    pub fn apply_sidebar_layout(&mut self, sidebar_visible: bool) {
        self.sidebar_visible = sidebar_visible;
        for slot in self.views.values() {
            slot.surface.apply_sidebar_layout(sidebar_visible);
        }
    }

    // ===== Queries =====

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn has_view(&self, url: &str) -> bool {
        self.views.contains_key(url)
    }

    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    pub fn is_landing_visible(&self) -> bool {
        self.landing_visible
    }

    pub fn is_showing_error_page(&self, url: &str) -> bool {
        self.views.get(url).is_some_and(|slot| slot.showing_error_page)
    }

    fn active_slot(&self) -> Option<&ViewSlot> {
        self.active.as_ref().and_then(|url| self.views.get(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockSurfaceFactory, SurfaceCall};
    use crate::types::{LoadFailureKind, SidebarColors};

    fn manager() -> (ContentViewManager, Arc<MockSurfaceFactory>) {
        let factory = Arc::new(MockSurfaceFactory::new());
        let manager = ContentViewManager::new(factory.clone(), Arc::new(ShellConfig::default()));
        (manager, factory)
    }

    fn record(url: &str) -> HostRecord {
        HostRecord::new(url)
    }

    #[test]
    fn add_is_idempotent_and_uses_last_path() {
        let (mut views, factory) = manager();
        let mut host = record("https://a.tld");
        host.last_visited_path = Some("https://a.tld/direct/bob".to_string());

        assert!(views.add(&host));
        assert!(!views.add(&host));
        assert_eq!(views.view_count(), 1);

        let created = factory.created();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].initial_url, "https://a.tld/direct/bob");
        assert!(created[0].isolated);
        assert!(created[0].allow_popups);
        assert_eq!(created[0].bridge_script, "preload.js");
    }

    #[test]
    fn activation_deactivates_previous_first() {
        let (mut views, factory) = manager();
        views.add(&record("https://a.tld"));
        views.add(&record("https://b.tld"));
        views.set_active("https://a.tld");
        factory.clear_calls();

        views.set_active("https://b.tld");
        let calls = factory.calls();
        assert_eq!(
            calls,
            vec![
                SurfaceCall::SetActive("https://a.tld".into(), false),
                SurfaceCall::SetActive("https://b.tld".into(), true),
                SurfaceCall::Focus("https://b.tld".into()),
                SurfaceCall::Send(
                    "https://b.tld".into(),
                    REQUEST_SIDEBAR_COLOR.into(),
                    serde_json::Value::Null
                ),
            ]
        );
        assert_eq!(views.active(), Some("https://b.tld"));
    }

    #[test]
    fn activating_active_view_is_noop() {
        let (mut views, factory) = manager();
        views.add(&record("https://a.tld"));
        views.set_active("https://a.tld");
        factory.clear_calls();

        views.set_active("https://a.tld");
        assert!(factory.calls().is_empty());
    }

    #[test]
    fn registry_events_drive_lifecycle() {
        let (mut views, factory) = manager();
        views.handle_event(&RegistryEvent::HostAdded(record("https://a.tld")));
        views.handle_event(&RegistryEvent::ActiveSet("https://a.tld".into()));
        assert!(!views.is_landing_visible());

        views.handle_event(&RegistryEvent::HostRemoved("https://a.tld".into()));
        views.handle_event(&RegistryEvent::ActiveCleared);

        assert_eq!(views.view_count(), 0);
        assert_eq!(views.active(), None);
        assert!(views.is_landing_visible());
        assert!(factory
            .calls()
            .contains(&SurfaceCall::Destroy("https://a.tld".into())));
        assert_eq!(factory.landing_visible(), Some(true));
    }

    #[test]
    fn loaded_with_views_keeps_landing_hidden() {
        let (mut views, factory) = manager();
        views.add(&record("https://a.tld"));
        views.handle_event(&RegistryEvent::Loaded);
        views.handle_event(&RegistryEvent::ActiveSet("https://a.tld".into()));

        assert!(!views.is_landing_visible());
        assert_eq!(factory.landing_visible(), None);

        let (mut empty, factory) = manager();
        empty.handle_event(&RegistryEvent::Loaded);
        assert!(empty.is_landing_visible());
        assert_eq!(factory.landing_visible(), Some(true));
    }

    #[test]
    fn messages_become_intents() {
        let (mut views, _factory) = manager();
        views.add(&record("https://a.tld"));
        let url = "https://a.tld";

        assert_eq!(
            views.handle_message(url, ContentMessage::UnreadChanged(Some("3".into()))),
            vec![ShellIntent::SetBadge {
                url: url.into(),
                badge: Badge::Count(3)
            }]
        );
        assert_eq!(
            views.handle_message(url, ContentMessage::Focus),
            vec![ShellIntent::Activate(url.into())]
        );
        assert_eq!(
            views.handle_message(url, ContentMessage::TitleChanged("Team".into())),
            vec![ShellIntent::SetHostTitle {
                url: url.into(),
                title: "Team".into()
            }]
        );
        let colors = SidebarColors {
            color: "#fff".into(),
            background: "#123".into(),
        };
        assert_eq!(
            views.handle_message(url, ContentMessage::SidebarBackground(colors.clone())),
            vec![ShellIntent::SetSidebarColors(colors)]
        );
        assert!(views
            .handle_message("https://ghost.tld", ContentMessage::Focus)
            .is_empty());
    }

    #[test]
    fn navigation_outside_host_is_not_recorded() {
        let (mut views, _factory) = manager();
        views.add(&record("https://a.tld"));

        assert_eq!(
            views.handle_navigation("https://a.tld", "https://a.tld/channel/general"),
            Some(ShellIntent::RecordLastPath {
                url: "https://a.tld".into(),
                path: "https://a.tld/channel/general".into()
            })
        );
        assert_eq!(
            views.handle_navigation("https://a.tld", "https://elsewhere.tld/"),
            None
        );
    }

    #[test]
    fn main_frame_server_error_shows_error_page_once() {
        let (mut views, factory) = manager();
        views.add(&record("https://a.tld"));
        factory.clear_calls();

        let failure = LoadFailure {
            main_frame: true,
            kind: LoadFailureKind::HttpStatus(503),
        };
        assert!(views.handle_load_failure("https://a.tld", &failure));
        assert!(!views.handle_load_failure("https://a.tld", &failure));
        assert!(views.is_showing_error_page("https://a.tld"));
        assert_eq!(
            factory.calls(),
            vec![SurfaceCall::Load(
                "https://a.tld".into(),
                "file:///loading-error.html".into()
            )]
        );

        assert!(views.retry("https://a.tld"));
        assert!(!views.is_showing_error_page("https://a.tld"));
    }

    #[test]
    fn subframe_failures_are_ignored() {
        let (mut views, _factory) = manager();
        views.add(&record("https://a.tld"));
        let failure = LoadFailure {
            main_frame: false,
            kind: LoadFailureKind::Navigation("ERR_FAILED".into()),
        };
        assert!(!views.handle_load_failure("https://a.tld", &failure));
    }

    #[test]
    fn active_view_commands() {
        let (mut views, factory) = manager();
        views.add(&record("https://a.tld"));
        views.set_active("https://a.tld");
        factory.clear_calls();

        views.go_back();
        views.go_forward();
        views.reload_active();
        views.reload_active_host();
        views.deliver_screen_share_result("screen:1");

        assert_eq!(
            factory.calls(),
            vec![
                SurfaceCall::Back("https://a.tld".into()),
                SurfaceCall::Forward("https://a.tld".into()),
                SurfaceCall::Reload("https://a.tld".into()),
                SurfaceCall::Load("https://a.tld".into(), "https://a.tld".into()),
                SurfaceCall::Send(
                    "https://a.tld".into(),
                    SCREENSHARE_RESULT.into(),
                    json!({"sourceId": "screen:1"})
                ),
            ]
        );
    }

    #[test]
    fn sidebar_layout_applies_to_all_views() {
        let (mut views, factory) = manager();
        views.add(&record("https://a.tld"));
        views.add(&record("https://b.tld"));
        factory.clear_calls();

        views.apply_sidebar_layout(false);
        assert_eq!(
            factory.calls(),
            vec![
                SurfaceCall::Layout("https://a.tld".into(), false),
                SurfaceCall::Layout("https://b.tld".into(), false),
            ]
        );

        views.add(&record("https://c.tld"));
        assert!(!factory.created()[2].sidebar_visible);
    }
}
