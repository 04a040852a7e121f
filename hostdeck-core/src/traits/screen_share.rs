//! Screen-share source picker

/// Opens the capture-source picker for a host's content
///
/// The picked id comes back through `Shell::on_screen_share_result`.
pub trait ScreenSharePicker: Send + Sync {
    fn request_sources(&self, host_url: &str);
}
