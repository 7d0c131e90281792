//! Error types for NV store and codec operations.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::NvType;

/// Errors that can occur while reading or writing the NV store.
///
/// Every variant is recoverable; no store or codec operation aborts the
/// process.
#[derive(Error, Debug)]
pub enum NvError {
    /// The backing file could not be opened, read, written or synced.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document content was not a valid JSON object.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The key is absent, or the document could not be loaded at all.
    #[error("key not found: {key}")]
    NotFound { key: String },

    /// A decoded string does not fit the destination capacity.
    #[error("value of {needed} bytes exceeds destination capacity of {capacity} bytes")]
    Truncation { needed: usize, capacity: usize },

    /// An unrecognised type tag name.
    #[error("unknown type: {0}")]
    UnknownType(String),

    /// The stored JSON node cannot carry the requested type.
    #[error("type mismatch: expected {expected}, found JSON {found}")]
    TypeMismatch { expected: NvType, found: &'static str },
}

impl NvError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        NvError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn not_found(key: &str) -> Self {
        NvError::NotFound {
            key: key.to_string(),
        }
    }
}

/// Convenience alias used throughout nv-core.
pub type Result<T> = std::result::Result<T, NvError>;
