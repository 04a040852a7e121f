use std::path::Path;

use hostdeck_core::ShellConfig;

pub const SETTINGS_FILE: &str = "settings.json";

/// Read `settings.json` from `dir`.
///
/// A missing file yields defaults silently; a malformed one yields defaults
/// with a warning.
pub fn load_settings(dir: &Path) -> ShellConfig {
    let path = dir.join(SETTINGS_FILE);
    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return ShellConfig::default(),
        Err(e) => {
            log::warn!("Failed to read {}: {e}", path.display());
            return ShellConfig::default();
        }
    };

    serde_json::from_str(&raw).unwrap_or_else(|e| {
        log::warn!("Ignoring malformed {}: {e}", path.display());
        ShellConfig::default()
    })
}
