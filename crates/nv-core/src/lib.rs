//! # nv-core
//!
//! Non-volatile settings storage for embedded and firmware-style applications.
//!
//! Typed scalar and array values (integers, floats, strings, IP and MAC
//! addresses) are persisted as key-value pairs of a single JSON object on
//! disk. Every operation is a full load → mutate → store cycle against the
//! backing file; nothing is cached between calls.
//!
//! ## Quick start
//!
//! ```rust
//! use nv_core::{Capacity, NvType, NvValue};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let path = dir.path().join("nv.json");
//!
//! nv_core::set(&path, "age", &NvValue::U8(30)).unwrap();
//! nv_core::set(&path, "ip", &NvValue::Ip([192, 168, 0, 1])).unwrap();
//!
//! let age = nv_core::get(&path, "age", NvType::U8, Capacity::Unbounded).unwrap();
//! assert_eq!(age, NvValue::U8(30));
//!
//! let raw = std::fs::read_to_string(&path).unwrap();
//! assert!(raw.contains("\"192.168.0.1\""));
//! ```
//!
//! ## Modules
//!
//! - [`types`] — `NvType` tags, `NvValue` payloads, decode capacities
//! - [`codec`] — `NvValue` ⇄ JSON node mapping, IP/MAC text formats
//! - [`document`] — the in-memory, insertion-ordered JSON object
//! - [`store`] — file-backed load/modify/persist cycle
//! - [`config`] — store path and write discipline
//! - [`error`] — error taxonomy

pub mod codec;
pub mod config;
pub mod document;
pub mod error;
pub mod store;
pub mod types;

pub use config::StoreConfig;
pub use document::Document;
pub use error::NvError;
pub use store::{delete, get, init, set, Store};
pub use types::{Capacity, NvType, NvValue, StrBuf};
