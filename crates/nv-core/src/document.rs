//! The in-memory NV document: one JSON object whose fields are the stored keys.
//!
//! Keys keep their insertion order (serde_json's `preserve_order` map), so a
//! rewrite leaves existing keys where they were and appends new ones.

use serde::{de, Serialize};
use serde_json::{Map, Value};

use crate::codec;
use crate::error::{NvError, Result};
use crate::types::{Capacity, NvType, NvValue, StrBuf};

/// Indent used when printing, matching the tab-indented layout of existing
/// NV files.
const INDENT: &[u8] = b"\t";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    map: Map<String, Value>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse document text. Anything but a top-level JSON object is an error.
    pub fn parse(text: &str) -> Result<Self> {
        match serde_json::from_str::<Value>(text)? {
            Value::Object(map) => Ok(Self { map }),
            other => Err(NvError::Parse(<serde_json::Error as de::Error>::custom(
                format!(
                    "top-level value is a JSON {}, not an object",
                    codec::json_type_name(&other)
                ),
            ))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.map.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Encode `value` under `key`. See [`codec::encode_into`] for placement.
    pub fn set(&mut self, key: &str, value: &NvValue) {
        codec::encode_into(&mut self.map, key, value);
    }

    /// Decode the node under `key`, or [`NvError::NotFound`].
    pub fn decode(&self, key: &str, kind: NvType, capacity: Capacity) -> Result<NvValue> {
        let node = self.get(key).ok_or_else(|| NvError::not_found(key))?;
        codec::decode(node, kind, capacity)
    }

    /// Decode a string array under `key` into caller-owned slots.
    pub fn decode_strings_into(&self, key: &str, slots: &mut [StrBuf]) -> Result<usize> {
        let node = self.get(key).ok_or_else(|| NvError::not_found(key))?;
        codec::decode_strings_into(node, slots)
    }

    /// Remove `key`, keeping the order of the remaining keys. Returns whether
    /// the key was present.
    pub fn remove(&mut self, key: &str) -> bool {
        self.map.shift_remove(key).is_some()
    }

    /// Tab-indented JSON text, without a trailing newline.
    pub fn to_pretty_string(&self) -> Result<String> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(INDENT);
        let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.map.serialize(&mut ser)?;
        // serde_json only ever emits UTF-8.
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.map.clone())
    }
}
