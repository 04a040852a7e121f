//! Sidebar entry types

use serde::{Deserialize, Serialize};

use super::Badge;

/// Colors reported by hosted content for the sidebar chrome
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SidebarColors {
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub background: String,
}

/// One rendered sidebar row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SidebarEntry {
    pub url: String,
    pub label: String,
    pub initials: String,
    pub icon_url: String,
    /// 1-based slot in the sidebar
    pub position: usize,
    /// Keyboard shortcut label, e.g. `⌘1`
    pub hotkey: String,
    pub badge: Badge,
    pub active: bool,
}

impl SidebarEntry {
    pub(crate) fn new(url: &str, label: &str, position: usize, hotkey_prefix: &str) -> Self {
        Self {
            url: url.to_string(),
            label: label.to_string(),
            initials: initials(label),
            icon_url: format!("{url}/assets/favicon.svg"),
            position,
            hotkey: format!("{hotkey_prefix}{position}"),
            badge: Badge::None,
            active: false,
        }
    }

    pub(crate) fn set_position(&mut self, position: usize, hotkey_prefix: &str) {
        self.position = position;
        self.hotkey = format!("{hotkey_prefix}{position}");
    }

    pub(crate) fn set_label(&mut self, label: &str) {
        self.label = label.to_string();
        self.initials = initials(label);
    }

    /// Hover text: label plus unread count when there is one.
    #[must_use]
    pub fn tooltip(&self) -> String {
        match self.badge.count() {
            Some(n) if n > 0 => format!("{} ({n})", self.label),
            _ => self.label.clone(),
        }
    }
}

/// Two-letter avatar fallback.
///
/// Url labels reduce to their host first (`https://www.team.example.com/x`
/// becomes `team.example.com`), then the first letters of the first two
/// dot-separated parts are upper-cased.
#[must_use]
pub fn initials(label: &str) -> String {
    let name = label
        .strip_prefix("https://")
        .or_else(|| label.strip_prefix("http://"))
        .map_or(label, |rest| {
            let rest = rest.strip_prefix("www.").unwrap_or(rest);
            rest.split('/').next().unwrap_or(rest)
        });

    name.split('.')
        .take(2)
        .filter_map(|part| part.chars().next())
        .collect::<String>()
        .to_uppercase()
}
