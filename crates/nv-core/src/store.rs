//! File-backed NV store.
//!
//! Every operation is one load → mutate → store cycle: the whole document is
//! read and parsed from disk, changed in memory, serialized and written back.
//! Nothing is cached between calls.
//!
//! # Failure policy
//!
//! - A missing file is a first run, not an error: reads see no keys and the
//!   first write creates the file.
//! - A corrupt file is logged and treated as an empty document. `get` then
//!   reports [`NvError::NotFound`] and `set` replaces it.
//! - A file that exists but cannot be read reads as [`NvError::NotFound`].
//!   `set` and `delete` return the [`NvError::Io`] and leave it untouched.
//! - Write failures are returned as [`NvError::Io`].
//!
//! # Concurrency
//!
//! The backing file is not locked. Concurrent writers, in one process or
//! several, interleave their read-modify-write cycles and can lose updates.
//! Callers that need multiple writers must serialize access themselves.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::document::Document;
use crate::error::{NvError, Result};
use crate::types::{Capacity, NvType, NvValue, StrBuf};

/// An NV store bound to one document file.
#[derive(Debug, Clone, Default)]
pub struct Store {
    config: StoreConfig,
}

impl Store {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// A store at `path` with the default write discipline.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::new(StoreConfig::new(path))
    }

    pub fn path(&self) -> &Path {
        self.config.path()
    }

    /// Load the document, falling back to an empty one.
    ///
    /// Never fails: a missing file is the first-run case and an unreadable or
    /// unparsable file is logged and replaced by an empty document.
    pub fn init(&self) -> Document {
        match self.load() {
            Ok(Some(doc)) => {
                debug!(path = %self.path().display(), keys = doc.len(), "loaded NV document");
                doc
            }
            Ok(None) => {
                debug!(path = %self.path().display(), "NV document does not exist, starting empty");
                Document::new()
            }
            Err(err) => {
                warn!(path = %self.path().display(), error = %err, "NV document unusable, starting empty");
                Document::new()
            }
        }
    }

    /// Load the document without any fallback.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    pub fn load(&self) -> Result<Option<Document>> {
        let path = self.path();
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(NvError::io(path, err)),
        };
        Document::parse(&text).map(Some)
    }

    /// Read `key` as `kind`.
    ///
    /// A missing, unreadable or corrupt file reports [`NvError::NotFound`],
    /// the same as an absent key.
    pub fn get(&self, key: &str, kind: NvType, capacity: Capacity) -> Result<NvValue> {
        self.load_for_read(key)?.decode(key, kind, capacity)
    }

    /// Read a string array under `key` into caller-owned slots, returning the
    /// number of slots written.
    pub fn get_strings_into(&self, key: &str, slots: &mut [StrBuf]) -> Result<usize> {
        self.load_for_read(key)?.decode_strings_into(key, slots)
    }

    /// Write `value` under `key` and persist the whole document.
    pub fn set(&self, key: &str, value: &NvValue) -> Result<()> {
        let mut doc = self.load_for_write()?;
        doc.set(key, value);
        self.write(&doc)
    }

    /// Remove `key` and persist. Removing an absent key is a no-op and does
    /// not touch the file.
    pub fn delete(&self, key: &str) -> Result<()> {
        let mut doc = self.load_for_write()?;
        if !doc.remove(key) {
            debug!(key, "key not present, nothing to delete");
            return Ok(());
        }
        self.write(&doc)
    }

    /// Serialize `doc` and replace the file contents with it.
    pub fn write(&self, doc: &Document) -> Result<()> {
        let text = doc.to_pretty_string()?;
        if self.config.atomic_rename {
            self.write_atomic(text.as_bytes())
        } else {
            self.write_file(self.path(), text.as_bytes())
        }
    }

    fn load_for_read(&self, key: &str) -> Result<Document> {
        match self.load() {
            Ok(Some(doc)) => Ok(doc),
            Ok(None) => {
                debug!(path = %self.path().display(), key, "NV document does not exist");
                Err(NvError::not_found(key))
            }
            Err(err) => {
                warn!(path = %self.path().display(), key, error = %err, "cannot read NV document");
                Err(NvError::not_found(key))
            }
        }
    }

    /// Like [`init`](Self::init), but an I/O failure is returned so the
    /// caller never writes over a file it could not read.
    fn load_for_write(&self) -> Result<Document> {
        match self.load() {
            Ok(Some(doc)) => Ok(doc),
            Ok(None) => {
                debug!(path = %self.path().display(), "NV document does not exist, starting empty");
                Ok(Document::new())
            }
            Err(err @ NvError::Io { .. }) => Err(err),
            Err(err) => {
                warn!(path = %self.path().display(), error = %err, "NV document unusable, starting empty");
                Ok(Document::new())
            }
        }
    }

    /// Truncate, write, then sync before close.
    fn write_file(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let mut file = File::create(path).map_err(|err| NvError::io(path, err))?;
        file.write_all(bytes).map_err(|err| NvError::io(path, err))?;
        if self.config.sync {
            file.sync_all().map_err(|err| NvError::io(path, err))?;
        }
        debug!(path = %path.display(), bytes = bytes.len(), "wrote NV document");
        Ok(())
    }

    fn write_atomic(&self, bytes: &[u8]) -> Result<()> {
        let path = self.path();
        let tmp = temp_path(path);
        self.write_file(&tmp, bytes)?;
        if let Err(err) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(NvError::io(path, err));
        }
        if self.config.sync {
            sync_parent_dir(path);
        }
        Ok(())
    }
}

/// Sibling temporary path, e.g. `nv.json` → `nv.json.tmp`.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "nv.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}

/// Best effort: persist the rename itself. Directories cannot be opened for
/// syncing on every platform.
fn sync_parent_dir(path: &Path) {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if let Err(err) = File::open(parent).and_then(|dir| dir.sync_all()) {
        debug!(dir = %parent.display(), error = %err, "directory sync skipped");
    }
}

/// Load the document at `path`, falling back to an empty one.
pub fn init(path: impl AsRef<Path>) -> Document {
    Store::open(path.as_ref()).init()
}

/// Read `key` as `kind` from the document at `path`.
pub fn get(
    path: impl AsRef<Path>,
    key: &str,
    kind: NvType,
    capacity: Capacity,
) -> Result<NvValue> {
    Store::open(path.as_ref()).get(key, kind, capacity)
}

/// Write `value` under `key` in the document at `path`.
pub fn set(path: impl AsRef<Path>, key: &str, value: &NvValue) -> Result<()> {
    Store::open(path.as_ref()).set(key, value)
}

/// Remove `key` from the document at `path`.
pub fn delete(path: impl AsRef<Path>, key: &str) -> Result<()> {
    Store::open(path.as_ref()).delete(key)
}
