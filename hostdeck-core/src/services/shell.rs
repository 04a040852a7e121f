//! Shell coordinator
//!
//! Wires the registry, view manager, sidebar and certificate store
//! together. Registry mutations queue `RegistryEvent`s on an unbounded bus;
//! every inbound operation drains the bus before returning, delivering each
//! event to the view manager and then the sidebar, one at a time and in
//! emission order.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{broadcast, mpsc, Mutex};

use super::certificate_store::CertificateStore;
use super::content_view_manager::ContentViewManager;
use super::deep_link::{self, DeepLinkOutcome};
use super::host_form::{AddHostForm, FormSubmission, FormValidation};
use super::server_registry::{LoadReport, ServerRegistry};
use super::session_sidebar::SessionSidebar;
use super::update_notice::UpdateNotifier;
use super::ServiceContext;
use crate::error::{CoreError, CoreResult};
use crate::traits::{Dialogs, ScreenSharePicker};
use crate::types::{
    CertificateError, ContentMessage, GlobalBadge, HostsMap, LoadFailure, RegistryEvent,
    ShellCommand, ShellIntent, ShellNotification, SidebarEntry, TrustOutcome,
};

const NOTIFICATION_CAPACITY: usize = 64;

/// Answer to a certificate error, plus the form re-validation it triggered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateResolution {
    pub outcome: TrustOutcome,
    pub revalidation: Option<FormValidation>,
}

pub struct Shell {
    registry: Arc<ServerRegistry>,
    views: Mutex<ContentViewManager>,
    sidebar: Mutex<SessionSidebar>,
    certificates: CertificateStore,
    form: AddHostForm,
    updates: UpdateNotifier,
    dialogs: Arc<dyn Dialogs>,
    screen_share: Arc<dyn ScreenSharePicker>,
    bus: Mutex<mpsc::UnboundedReceiver<RegistryEvent>>,
    notifications: broadcast::Sender<ShellNotification>,
    last_badge: Mutex<GlobalBadge>,
}

impl Shell {
    pub fn new(ctx: &ServiceContext) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (notifications, _) = broadcast::channel(NOTIFICATION_CAPACITY);

        let registry = Arc::new(ServerRegistry::new(
            ctx.store.clone(),
            ctx.probe.clone(),
            ctx.config.clone(),
            events_tx,
        ));

        Self {
            views: Mutex::new(ContentViewManager::new(
                ctx.surfaces.clone(),
                ctx.config.clone(),
            )),
            sidebar: Mutex::new(SessionSidebar::new(
                ctx.store.clone(),
                ctx.window_menu.clone(),
                ctx.config.clone(),
            )),
            certificates: CertificateStore::new(ctx.store.clone(), ctx.dialogs.clone()),
            form: AddHostForm::new(registry.clone(), ctx.config.clone()),
            updates: UpdateNotifier::new(ctx.store.clone(), ctx.config.clone()),
            dialogs: ctx.dialogs.clone(),
            screen_share: ctx.screen_share.clone(),
            bus: Mutex::new(events_rx),
            notifications,
            last_badge: Mutex::new(GlobalBadge::Empty),
            registry,
        }
    }

    // ===== Startup =====

    /// Load persisted state, build views and sidebar, restore the active
    /// host, then honor a deep link among the launch arguments.
    pub async fn start(
        &self,
        manifest: Option<&BTreeMap<String, String>>,
        args: &[String],
    ) -> CoreResult<LoadReport> {
        self.certificates.load().await;
        let report = self.registry.load(manifest).await;

        let hosts = self.registry.hosts().await;
        {
            let mut views = self.views.lock().await;
            for record in hosts.values() {
                views.add(record);
            }
        }
        {
            let mut sidebar = self.sidebar.lock().await;
            sidebar.load(&hosts).await;
            if report.collapse_sidebar() {
                sidebar.hide().await;
            }
        }
        let visible = !self.sidebar.lock().await.is_hidden();
        self.apply_sidebar_visibility(visible).await;

        self.registry.restore_active().await;
        self.dispatch_pending().await;

        if let Some(url) = self.registry.get_protocol_url_from_process(args) {
            log::info!("Launched with deep link to {url}");
            self.add_host_request(&url).await?;
        }

        log::info!("Shell started with {} host(s)", report.host_count);
        Ok(report)
    }

    // ===== Event bus =====

    /// Deliver queued registry events in order.
    ///
    /// The bus stays locked while draining, so concurrent callers never
    /// interleave deliveries.
    pub async fn dispatch_pending(&self) {
        let mut bus = self.bus.lock().await;
        while let Ok(event) = bus.try_recv() {
            log::debug!("[Shell] Dispatching {}", event.name());
            self.views.lock().await.handle_event(&event);
            self.sidebar.lock().await.handle_event(&event).await;

            match &event {
                RegistryEvent::ActiveSet(url) => {
                    self.publish(ShellNotification::ActiveHostChanged(Some(url.clone())));
                }
                RegistryEvent::ActiveCleared => {
                    self.publish(ShellNotification::ActiveHostChanged(None));
                }
                RegistryEvent::HostRemoved(_) => self.publish_badge_if_changed().await,
                _ => {}
            }
        }
    }

    // ===== Inbound commands =====

    pub async fn execute(&self, command: ShellCommand) -> CoreResult<()> {
        log::debug!("[Shell] Command {command:?}");
        match command {
            ShellCommand::AddHost(url) => {
                self.add_host_request(&url).await?;
            }
            ShellCommand::RemoveHost(url) => {
                if !self.registry.remove_host(&url).await {
                    return Err(CoreError::HostNotFound(url));
                }
            }
            ShellCommand::ActivateHost(url) => {
                self.registry.set_active(&url).await;
            }
            ShellCommand::ReloadActive => self.views.lock().await.reload_active(),
            ShellCommand::ToggleSidebar => {
                self.toggle_sidebar().await;
            }
            ShellCommand::ClearCertificateTrust => self.certificates.clear().await,
            ShellCommand::GoBack => self.views.lock().await.go_back(),
            ShellCommand::GoForward => self.views.lock().await.go_forward(),
            ShellCommand::ShowLanding => self.registry.clear_active().await,
        }
        self.dispatch_pending().await;
        Ok(())
    }

    /// `add-host(url)` from the OS or a launch argument.
    pub async fn add_host_request(&self, url: &str) -> CoreResult<DeepLinkOutcome> {
        let outcome =
            deep_link::handle_add_host_request(&self.registry, self.dialogs.as_ref(), url).await;
        self.dispatch_pending().await;
        outcome
    }

    // ===== Content surface hooks =====

    /// Raw bridge message from `url`'s content.
    pub async fn on_bridge_message(&self, url: &str, channel: &str, args: &[Value]) {
        match ContentMessage::from_channel(channel, args) {
            Some(message) => self.on_content_message(url, message).await,
            None => log::debug!("[Shell] Ignoring bridge channel {channel} from {url}"),
        }
    }

    pub async fn on_content_message(&self, url: &str, message: ContentMessage) {
        let intents = self.views.lock().await.handle_message(url, message);
        for intent in intents {
            self.apply_intent(intent).await;
        }
        self.dispatch_pending().await;
    }

    pub async fn on_navigation(&self, host_url: &str, nav_url: &str) {
        let intent = self.views.lock().await.handle_navigation(host_url, nav_url);
        if let Some(intent) = intent {
            self.apply_intent(intent).await;
        }
    }

    /// Returns whether the view was swapped to the error page.
    pub async fn on_load_failure(&self, url: &str, failure: &LoadFailure) -> bool {
        self.views.lock().await.handle_load_failure(url, failure)
    }

    /// Retry button on the error page.
    pub async fn retry(&self, url: &str) -> bool {
        self.views.lock().await.retry(url)
    }

    pub async fn on_certificate_error(&self, error: &CertificateError) -> CertificateResolution {
        let outcome = self.certificates.handle_certificate_error(error).await;
        let revalidation = match &outcome.retry_url {
            Some(url) => Some(self.form.revalidate_after_certificate(url).await),
            None => None,
        };
        CertificateResolution {
            outcome,
            revalidation,
        }
    }

    pub async fn on_screen_share_result(&self, source_id: &str) {
        self.views.lock().await.deliver_screen_share_result(source_id);
    }

    // ===== Landing form =====

    pub async fn validate_add_host_form(&self, input: &str) -> FormValidation {
        self.form.validate(input).await
    }

    /// The form's input was edited; in-flight validations become stale.
    pub fn add_host_form_changed(&self) {
        self.form.invalidate();
    }

    /// Submit the form. A newly added host also reveals the sidebar.
    pub async fn submit_add_host_form(&self, input: &str) -> CoreResult<FormSubmission> {
        let submission = self.form.submit(input).await?;
        if matches!(submission, FormSubmission::Added(_)) {
            self.sidebar.lock().await.show().await;
            self.apply_sidebar_visibility(true).await;
        }
        self.dispatch_pending().await;
        Ok(submission)
    }

    // ===== Sidebar =====

    /// Complete a drag-reorder and activate the dragged host.
    pub async fn reorder_sidebar(&self, dragged: &str, visible_order: &[String]) -> CoreResult<()> {
        let dragged = self
            .sidebar
            .lock()
            .await
            .reorder(dragged, visible_order)
            .await?;
        self.registry.set_active(&dragged).await;
        self.dispatch_pending().await;
        Ok(())
    }

    pub async fn move_sidebar_entry(&self, dragged: &str, to_index: usize) -> CoreResult<()> {
        let dragged = self
            .sidebar
            .lock()
            .await
            .move_entry(dragged, to_index)
            .await?;
        self.registry.set_active(&dragged).await;
        self.dispatch_pending().await;
        Ok(())
    }

    /// Returns whether the sidebar is now visible.
    pub async fn toggle_sidebar(&self) -> bool {
        let visible = self.sidebar.lock().await.toggle().await;
        self.apply_sidebar_visibility(visible).await;
        visible
    }

    // ===== Queries =====

    pub fn subscribe(&self) -> broadcast::Receiver<ShellNotification> {
        self.notifications.subscribe()
    }

    pub fn registry(&self) -> &Arc<ServerRegistry> {
        &self.registry
    }

    pub fn update_notifier(&self) -> &UpdateNotifier {
        &self.updates
    }

    pub fn certificates(&self) -> &CertificateStore {
        &self.certificates
    }

    pub async fn hosts(&self) -> HostsMap {
        self.registry.hosts().await
    }

    pub async fn active_host(&self) -> Option<String> {
        self.registry.active().await
    }

    pub async fn sidebar_entries(&self) -> Vec<SidebarEntry> {
        self.sidebar.lock().await.entries().to_vec()
    }

    pub async fn sidebar_visible(&self) -> bool {
        !self.sidebar.lock().await.is_hidden()
    }

    pub async fn global_badge(&self) -> GlobalBadge {
        self.sidebar.lock().await.global_badge()
    }

    pub async fn active_view(&self) -> Option<String> {
        self.views.lock().await.active().map(str::to_string)
    }

    pub async fn is_landing_visible(&self) -> bool {
        self.views.lock().await.is_landing_visible()
    }

    // ===== Internals =====

    async fn apply_intent(&self, intent: ShellIntent) {
        let result = match intent {
            ShellIntent::SetHostTitle { url, title } => {
                self.registry.set_host_title(&url, &title).await
            }
            ShellIntent::SetBadge { url, badge } => {
                self.sidebar.lock().await.set_badge(&url, badge);
                self.publish_badge_if_changed().await;
                Ok(())
            }
            ShellIntent::Activate(url) => {
                self.registry.set_active(&url).await;
                Ok(())
            }
            ShellIntent::RequestScreenShare(url) => {
                self.screen_share.request_sources(&url);
                Ok(())
            }
            ShellIntent::ReloadActive => {
                self.views.lock().await.reload_active_host();
                Ok(())
            }
            ShellIntent::SetSidebarColors(colors) => {
                self.sidebar.lock().await.set_colors(colors.clone());
                self.publish(ShellNotification::SidebarColorsChanged(colors));
                Ok(())
            }
            ShellIntent::RecordLastPath { url, path } => {
                self.registry.set_last_visited_path(&url, &path).await
            }
        };

        if let Err(e) = result {
            if e.is_expected() {
                log::warn!("[Shell] Intent not applied: {e}");
            } else {
                log::error!("[Shell] Intent failed: {e}");
            }
        }
    }

    async fn apply_sidebar_visibility(&self, visible: bool) {
        self.views.lock().await.apply_sidebar_layout(visible);
        self.publish(ShellNotification::SidebarVisibilityChanged(visible));
    }

    async fn publish_badge_if_changed(&self) {
        let badge = self.sidebar.lock().await.global_badge();
        let mut last = self.last_badge.lock().await;
        if *last != badge {
            *last = badge;
            drop(last);
            self.publish(ShellNotification::GlobalBadgeChanged(badge));
        }
    }

    fn publish(&self, notification: ShellNotification) {
        // No subscribers is fine.
        let _ = self.notifications.send(notification);
    }
}
