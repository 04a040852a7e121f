//! Shell configuration

use serde::{Deserialize, Serialize};

/// Tunables shared by every component.
///
/// Every field has a default so a partial `settings.json` is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShellConfig {
    /// Custom deep-link scheme, without `://`
    pub url_scheme: String,
    /// Product title that gets disambiguated with the host url
    pub generic_title: String,
    /// Host exempt from title disambiguation
    pub canonical_host: String,
    /// Submitted when the add-host form is left empty
    pub default_instance: String,
    /// Bare names typed in the form are tried under this domain
    pub subdomain_suffix: String,
    pub validation_timeout_ms: u64,
    pub form_validation_timeout_ms: u64,
    /// Local page shown when a content view fails to load
    pub error_page_url: String,
    /// Script injected into every content surface
    pub bridge_script: String,
    /// Show the "new version available" prompt
    pub notify_on_update: bool,
    pub hotkey_prefix: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            url_scheme: "hostdeck".to_string(),
            generic_title: "Rocket.Chat".to_string(),
            canonical_host: "open.rocket.chat".to_string(),
            default_instance: "https://cc.nomalis.com".to_string(),
            subdomain_suffix: "cc.nomalis.com".to_string(),
            validation_timeout_ms: 5000,
            form_validation_timeout_ms: 2000,
            error_page_url: "file:///loading-error.html".to_string(),
            bridge_script: "preload.js".to_string(),
            notify_on_update: false,
            hotkey_prefix: default_hotkey_prefix().to_string(),
        }
    }
}

fn default_hotkey_prefix() -> &'static str {
    if cfg!(target_os = "macos") {
        "⌘"
    } else {
        "^"
    }
}
