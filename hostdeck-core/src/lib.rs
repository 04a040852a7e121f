//! Hostdeck Core Library
//!
//! Session and state synchronization engine for a desktop shell that hosts
//! several remote web sessions side by side:
//! - `ServerRegistry`: configured hosts and the active selection
//! - `ContentViewManager`: one embedded view per host
//! - `SessionSidebar`: ordered entries, badges, drag-reorder
//! - `CertificateStore`: per-host TLS trust overrides
//!
//! This library is platform-independent. Storage, views, dialogs and menus
//! are injected through the traits in [`traits`].

pub mod config;
pub mod error;
pub mod services;
pub mod traits;
pub mod types;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use config::ShellConfig;
pub use error::{CoreError, CoreResult, ValidationFailure};
pub use services::{ServiceContext, Shell};
pub use traits::{
    ContentSurface, ContentSurfaceFactory, Dialogs, HostProbe, InMemoryStore, PersistentStore,
    ScreenSharePicker, WindowMenu,
};
