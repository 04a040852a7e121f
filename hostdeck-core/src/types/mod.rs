//! 类型定义模块

mod badge;
mod certificate;
mod events;
mod host;
mod sidebar;

pub use badge::{Badge, GlobalBadge, ATTENTION_MARKER};
pub use certificate::{
    Certificate, CertificateError, ContentOrigin, Fingerprint, TrustDecision, TrustOutcome,
    TrustPromptRequest, TrustRecord, TrustTable,
};
pub use events::{
    ContentMessage, LoadFailure, LoadFailureKind, RegistryEvent, ShellCommand, ShellIntent,
    ShellNotification,
};
pub use host::{AddHostOutcome, Credentials, HostRecord, HostsMap};
pub use sidebar::{initials, SidebarColors, SidebarEntry};
