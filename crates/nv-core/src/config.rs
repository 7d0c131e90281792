//! Store configuration: where the document lives and how it is written.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Path used when none is configured.
pub const DEFAULT_PATH: &str = "./nv.json";

/// Write discipline for a [`Store`](crate::Store).
///
/// - `sync`: flush the new content to stable storage (`fsync`) after it is
///   written and before the file is closed.
/// - `atomic_rename`: write a sibling temporary file and rename it over the
///   target, so a crash mid-write leaves either the old or the new document.
///   Off by default; the plain overwrite can leave a truncated file behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub sync: bool,
    pub atomic_rename: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_PATH),
            sync: true,
            atomic_rename: false,
        }
    }
}

impl StoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    pub fn with_atomic_rename(mut self, atomic_rename: bool) -> Self {
        self.atomic_rename = atomic_rename;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
