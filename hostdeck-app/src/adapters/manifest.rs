//! Legacy `servers.json` lookup.

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::StartupHooks;

pub const MANIFEST_FILE: &str = "servers.json";

/// Looks for `servers.json` in each directory in order; the first readable
/// one wins. Typically the user data directory, then the install directory.
pub struct DirectoryStartupHooks {
    dirs: Vec<PathBuf>,
}

impl DirectoryStartupHooks {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }
}

#[async_trait]
impl StartupHooks for DirectoryStartupHooks {
    async fn find_legacy_manifest(&self) -> Option<BTreeMap<String, String>> {
        for dir in &self.dirs {
            let path = dir.join(MANIFEST_FILE);
            let Ok(raw) = tokio::fs::read_to_string(&path).await else {
                continue;
            };
            match serde_json::from_str::<BTreeMap<String, String>>(&raw) {
                Ok(manifest) => {
                    log::info!("Using host manifest {}", path.display());
                    return Some(manifest);
                }
                Err(e) => log::warn!("Skipping malformed {}: {e}", path.display()),
            }
        }
        None
    }
}
