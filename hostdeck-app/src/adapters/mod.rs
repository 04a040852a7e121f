//! Platform-agnostic adapters for frontends without a native store.

mod json_file_store;
mod manifest;

pub use json_file_store::JsonFileStore;
pub use manifest::{DirectoryStartupHooks, MANIFEST_FILE};
