//! Window menu relay

/// Accelerator-bound server items in the window menu
pub trait WindowMenu: Send + Sync {
    /// `position` is 1-based and doubles as the accelerator digit
    fn add_server_item(&self, url: &str, title: &str, position: usize);

    fn remove_server_item(&self, url: &str);
}
