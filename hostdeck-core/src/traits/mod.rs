//! Collaborator trait definitions

mod content_surface;
mod dialogs;
mod host_probe;
mod persistent_store;
mod screen_share;
mod window_menu;

pub use content_surface::{ContentSurface, ContentSurfaceFactory, SurfaceSpec};
pub use dialogs::Dialogs;
pub use host_probe::{HostProbe, ProbeOutcome};
pub use persistent_store::{InMemoryStore, PersistentStore};
pub use screen_share::ScreenSharePicker;
pub use window_menu::WindowMenu;
