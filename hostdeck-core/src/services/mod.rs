//! 业务逻辑服务层

mod certificate_store;
mod content_view_manager;
mod deep_link;
mod host_form;
mod host_validation;
mod migration_service;
mod server_registry;
mod session_sidebar;
mod shell;
mod update_notice;

pub use certificate_store::{CertificateStore, TRUSTED_CERTIFICATES_KEY};
pub use content_view_manager::{ContentViewManager, REQUEST_SIDEBAR_COLOR, SCREENSHARE_RESULT};
pub use deep_link::{handle_add_host_request, parse_deep_link, protocol_url_from_args, DeepLinkOutcome};
pub use host_form::{AddHostForm, FormSubmission, FormValidation};
pub use host_validation::{classify, validate_host, ReqwestHostProbe};
pub use migration_service::{MigrationResult, MigrationService};
pub use server_registry::{LoadReport, ServerRegistry, ACTIVE_KEY, HOSTS_KEY};
pub use session_sidebar::{SessionSidebar, SIDEBAR_CLOSED_KEY, SORT_ORDER_KEY};
pub use shell::{CertificateResolution, Shell};
pub use update_notice::{UpdateNotifier, UPDATE_KEY};

use std::sync::Arc;

use crate::config::ShellConfig;
use crate::traits::{
    ContentSurfaceFactory, Dialogs, HostProbe, PersistentStore, ScreenSharePicker, WindowMenu,
};

/// 服务上下文 - 持有所有依赖
///
/// 平台层需要创建此上下文，并注入平台特定的适配器实现。
pub struct ServiceContext {
    /// 持久化存储
    pub store: Arc<dyn PersistentStore>,
    /// 内容视图工厂
    pub surfaces: Arc<dyn ContentSurfaceFactory>,
    /// 用户对话框
    pub dialogs: Arc<dyn Dialogs>,
    /// 窗口菜单
    pub window_menu: Arc<dyn WindowMenu>,
    /// 屏幕共享选择器
    pub screen_share: Arc<dyn ScreenSharePicker>,
    /// 服务器探测
    pub probe: Arc<dyn HostProbe>,
    pub config: Arc<ShellConfig>,
}

impl ServiceContext {
    /// 创建服务上下文
    #[must_use]
    pub fn new(
        store: Arc<dyn PersistentStore>,
        surfaces: Arc<dyn ContentSurfaceFactory>,
        dialogs: Arc<dyn Dialogs>,
        window_menu: Arc<dyn WindowMenu>,
        screen_share: Arc<dyn ScreenSharePicker>,
        probe: Arc<dyn HostProbe>,
        config: ShellConfig,
    ) -> Self {
        Self {
            store,
            surfaces,
            dialogs,
            window_menu,
            screen_share,
            probe,
            config: Arc::new(config),
        }
    }
}
