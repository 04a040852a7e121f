//! 事件、意图与命令类型
//!
//! - `RegistryEvent`: 注册表变更，按发出顺序投递给视图管理器和侧边栏
//! - `ContentMessage`: 托管内容通过桥接脚本发来的消息
//! - `ShellIntent`: 视图管理器把内容消息翻译成的动作
//! - `ShellCommand`: 来自菜单、托盘或操作系统的入站命令
//! - `ShellNotification`: 发布给托盘/Dock/菜单的聚合状态

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Badge, GlobalBadge, HostRecord, SidebarColors};

/// Registry lifecycle event. Exactly one is emitted per mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    /// Hosts loaded, or no host could be activated (landing state)
    Loaded,
    HostAdded(HostRecord),
    HostRemoved(String),
    ActiveSet(String),
    ActiveCleared,
    TitleSet { url: String, title: String },
}

impl RegistryEvent {
    /// Wire name, as used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Loaded => "loaded",
            Self::HostAdded(_) => "host-added",
            Self::HostRemoved(_) => "host-removed",
            Self::ActiveSet(_) => "active-setted",
            Self::ActiveCleared => "active-cleared",
            Self::TitleSet { .. } => "title-setted",
        }
    }
}

/// Message raised from inside a hosted session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentMessage {
    TitleChanged(String),
    /// Raw unread value; `None` when the content sent nothing
    UnreadChanged(Option<String>),
    Focus,
    GetSourceId,
    ReloadServer,
    SidebarBackground(SidebarColors),
}

impl ContentMessage {
    /// Decode a bridge message from its channel name and arguments.
    ///
    /// Returns `None` for unknown channels or a missing required argument.
    #[must_use]
    pub fn from_channel(channel: &str, args: &[Value]) -> Option<Self> {
        match channel {
            "title-changed" => args.first().and_then(value_text).map(Self::TitleChanged),
            "unread-changed" => Some(Self::UnreadChanged(args.first().and_then(value_text))),
            "focus" => Some(Self::Focus),
            "get-sourceId" => Some(Self::GetSourceId),
            "reload-server" => Some(Self::ReloadServer),
            "sidebar-background" => {
                let colors = match args.first() {
                    Some(object @ Value::Object(_)) => {
                        serde_json::from_value(object.clone()).unwrap_or_default()
                    }
                    _ => SidebarColors {
                        color: args.first().and_then(value_text).unwrap_or_default(),
                        background: args.get(1).and_then(value_text).unwrap_or_default(),
                    },
                };
                Some(Self::SidebarBackground(colors))
            }
            _ => None,
        }
    }

    /// Channel name
    #[must_use]
    pub fn channel(&self) -> &'static str {
        match self {
            Self::TitleChanged(_) => "title-changed",
            Self::UnreadChanged(_) => "unread-changed",
            Self::Focus => "focus",
            Self::GetSourceId => "get-sourceId",
            Self::ReloadServer => "reload-server",
            Self::SidebarBackground(_) => "sidebar-background",
        }
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Action derived from a content message, applied by the shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellIntent {
    SetHostTitle { url: String, title: String },
    SetBadge { url: String, badge: Badge },
    Activate(String),
    RequestScreenShare(String),
    ReloadActive,
    SetSidebarColors(SidebarColors),
    RecordLastPath { url: String, path: String },
}

/// Navigation-level failure on a content surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    pub main_frame: bool,
    pub kind: LoadFailureKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadFailureKind {
    /// Network-level failure with the runtime's error description
    Navigation(String),
    /// Response received with this HTTP status
    HttpStatus(u16),
}

impl LoadFailure {
    /// Whether the view should be swapped to the local error page.
    #[must_use]
    pub fn needs_error_page(&self) -> bool {
        if !self.main_frame {
            return false;
        }
        match self.kind {
            LoadFailureKind::Navigation(_) => true,
            LoadFailureKind::HttpStatus(status) => status >= 500,
        }
    }
}

/// Inbound command from the OS, menu or tray
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "arg", rename_all = "kebab-case")]
pub enum ShellCommand {
    AddHost(String),
    RemoveHost(String),
    ActivateHost(String),
    ReloadActive,
    ToggleSidebar,
    ClearCertificateTrust,
    GoBack,
    GoForward,
    ShowLanding,
}

/// Aggregated state published to presentation relays
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum ShellNotification {
    GlobalBadgeChanged(GlobalBadge),
    ActiveHostChanged(Option<String>),
    SidebarVisibilityChanged(bool),
    SidebarColorsChanged(SidebarColors),
}
