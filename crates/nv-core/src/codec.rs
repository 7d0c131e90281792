//! Maps [`NvValue`]s to and from JSON nodes.
//!
//! | Type | JSON node |
//! |---|---|
//! | `u8` … `s64` | integer number |
//! | `float`, `double` | number (`null` when not finite) |
//! | `str` | string |
//! | `*-array` | array of homogeneous elements |
//! | `ip` | string `"a.b.c.d"` |
//! | `mac` | string `"a-b-c-d-e-f"` |
//!
//! # Decoding rules
//!
//! - **Narrowing**: numbers are read as `f64`, truncated to `i64` and then cast
//!   to the requested width, so `u8` read from `300` yields `44` and `u8` read
//!   from `-1` yields `255`. There is no overflow check.
//! - **64-bit integers**: read through the `f64` value of the node. Values
//!   beyond 2^53 lose precision on read. The on-disk integer is written
//!   exactly, so files stay compatible with readers that keep the full value.
//! - **Strings**: bounded by [`Capacity`]; an oversized string is a
//!   [`NvError::Truncation`].
//! - **Arrays**: only the first `min(len, capacity)` elements are read.
//! - **IP/MAC**: parsed leniently. Parsing stops at the first malformed field
//!   and the remaining fields stay `0`; this is not reported as an error.

use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::error::{NvError, Result};
use crate::types::{Capacity, NvType, NvValue, StrBuf};

const IP_SEPARATOR: char = '.';
const MAC_SEPARATOR: char = '-';

/// Build a fresh JSON node for `value`.
pub fn encode(value: &NvValue) -> Value {
    match value {
        NvValue::U8(v) => Value::from(*v),
        NvValue::S8(v) => Value::from(*v),
        NvValue::U16(v) => Value::from(*v),
        NvValue::S16(v) => Value::from(*v),
        NvValue::U32(v) => Value::from(*v),
        NvValue::S32(v) => Value::from(*v),
        NvValue::U64(v) => Value::from(*v),
        NvValue::S64(v) => Value::from(*v),
        NvValue::Float(v) => real_node(f64::from(*v)),
        NvValue::Double(v) => real_node(*v),
        NvValue::Str(s) => Value::String(s.clone()),
        NvValue::StringArray(items) => items.iter().cloned().map(Value::String).collect(),
        NvValue::IntArray(items) => items.iter().copied().map(Value::from).collect(),
        NvValue::FloatArray(items) => items.iter().map(|v| real_node(f64::from(*v))).collect(),
        NvValue::DoubleArray(items) => items.iter().copied().map(real_node).collect(),
        NvValue::Ip(fields) => Value::String(format_ip(fields)),
        NvValue::Mac(fields) => Value::String(format_mac(fields)),
    }
}

/// Write `value` under `key` in an object.
///
/// Scalar, string, IP and MAC values overwrite an existing node in place, so
/// the key keeps its position. Array values always detach the old node and
/// append a fresh array: arrays are replaced, never merged element-wise.
pub fn encode_into(map: &mut Map<String, Value>, key: &str, value: &NvValue) {
    let node = encode(value);

    if value.kind().is_array() {
        if map.shift_remove(key).is_some() {
            debug!(key, "replacing array node");
        }
        map.insert(key.to_string(), node);
        return;
    }

    match map.get_mut(key) {
        Some(existing) => *existing = node,
        None => {
            debug!(key, kind = %value.kind(), "adding new node");
            map.insert(key.to_string(), node);
        }
    }
}

/// Read a node as the requested type.
pub fn decode(node: &Value, kind: NvType, capacity: Capacity) -> Result<NvValue> {
    let value = match kind {
        NvType::U8 => NvValue::U8(integer(node, kind)? as u8),
        NvType::S8 => NvValue::S8(integer(node, kind)? as i8),
        NvType::U16 => NvValue::U16(integer(node, kind)? as u16),
        NvType::S16 => NvValue::S16(integer(node, kind)? as i16),
        NvType::U32 => NvValue::U32(integer(node, kind)? as u32),
        NvType::S32 => NvValue::S32(integer(node, kind)? as i32),
        NvType::U64 => NvValue::U64(number(node, kind)? as u64),
        NvType::S64 => NvValue::S64(number(node, kind)? as i64),
        NvType::Float => NvValue::Float(real(node, kind)? as f32),
        NvType::Double => NvValue::Double(real(node, kind)?),
        NvType::Str => {
            let s = string(node, kind)?;
            capacity.check(s.len())?;
            NvValue::Str(s.to_string())
        }
        NvType::StringArray => NvValue::StringArray(
            elements(node, kind, capacity)?
                .iter()
                .map(|item| string(item, kind).map(str::to_string))
                .collect::<Result<_>>()?,
        ),
        // Saturating `f64 as i32` clamps like a 32-bit integer field.
        NvType::IntArray => NvValue::IntArray(
            elements(node, kind, capacity)?
                .iter()
                .map(|item| number(item, kind).map(|n| n as i32))
                .collect::<Result<_>>()?,
        ),
        NvType::FloatArray => NvValue::FloatArray(
            elements(node, kind, capacity)?
                .iter()
                .map(|item| real(item, kind).map(|n| n as f32))
                .collect::<Result<_>>()?,
        ),
        NvType::DoubleArray => NvValue::DoubleArray(
            elements(node, kind, capacity)?
                .iter()
                .map(|item| real(item, kind))
                .collect::<Result<_>>()?,
        ),
        NvType::Ip => NvValue::Ip(parse_ip(string(node, kind)?)),
        NvType::Mac => NvValue::Mac(parse_mac(string(node, kind)?)),
    };
    Ok(value)
}

/// Decode a string array into caller-owned slots.
///
/// Fills at most `min(node.len, slots.len())` slots and returns how many were
/// written. Slots past that count are left as they were. Fails with
/// [`NvError::Truncation`] on the first element that does not fit its slot;
/// earlier slots keep the values already written.
pub fn decode_strings_into(node: &Value, slots: &mut [StrBuf]) -> Result<usize> {
    let kind = NvType::StringArray;
    let items = elements(node, kind, Capacity::Bounded(slots.len()))?;
    for (slot, item) in slots.iter_mut().zip(items) {
        slot.set(string(item, kind)?)?;
    }
    Ok(items.len())
}

/// Format four fields as a dotted address, e.g. `192.168.0.1`.
pub fn format_ip(fields: &[u32; 4]) -> String {
    join_fields(fields, IP_SEPARATOR)
}

/// Format six fields as a dash-separated address, e.g. `0-17-34-51-68-85`.
pub fn format_mac(fields: &[u32; 6]) -> String {
    join_fields(fields, MAC_SEPARATOR)
}

/// Parse the text written by [`format_ip`]. Lenient, see the module docs.
pub fn parse_ip(text: &str) -> [u32; 4] {
    scan_fields(text, IP_SEPARATOR)
}

/// Parse the text written by [`format_mac`]. Lenient, see the module docs.
pub fn parse_mac(text: &str) -> [u32; 6] {
    scan_fields(text, MAC_SEPARATOR)
}

/// JSON type name of a node, for error messages.
pub fn json_type_name(node: &Value) -> &'static str {
    match node {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn real_node(v: f64) -> Value {
    Number::from_f64(v).map_or(Value::Null, Value::Number)
}

fn mismatch(node: &Value, expected: NvType) -> NvError {
    NvError::TypeMismatch {
        expected,
        found: json_type_name(node),
    }
}

fn number(node: &Value, kind: NvType) -> Result<f64> {
    node.as_f64().ok_or_else(|| mismatch(node, kind))
}

fn integer(node: &Value, kind: NvType) -> Result<i64> {
    number(node, kind).map(|n| n as i64)
}

/// Like [`number`], but `null` (a non-finite float on write) reads as NaN.
fn real(node: &Value, kind: NvType) -> Result<f64> {
    match node {
        Value::Null => Ok(f64::NAN),
        other => number(other, kind),
    }
}

fn string(node: &Value, kind: NvType) -> Result<&str> {
    node.as_str().ok_or_else(|| mismatch(node, kind))
}

fn elements(node: &Value, kind: NvType, capacity: Capacity) -> Result<&[Value]> {
    let items = node.as_array().ok_or_else(|| mismatch(node, kind))?;
    Ok(&items[..capacity.limit(items.len())])
}

fn join_fields(fields: &[u32], separator: char) -> String {
    let mut out = String::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(separator);
        }
        out.push_str(&field.to_string());
    }
    out
}

/// scanf-style field scan: `%d<sep>%d<sep>...`. Stops at the first field or
/// separator that does not match; unscanned fields stay 0.
fn scan_fields<const N: usize>(text: &str, separator: char) -> [u32; N] {
    let mut fields = [0u32; N];
    let mut rest = text;
    for (i, field) in fields.iter_mut().enumerate() {
        if i > 0 {
            match rest.strip_prefix(separator) {
                Some(tail) => rest = tail,
                None => break,
            }
        }
        match scan_int(rest) {
            Some((value, tail)) => {
                // Negative input wraps, as when scanning into a signed field
                // that is later read unsigned.
                *field = value as u32;
                rest = tail;
            }
            None => break,
        }
    }
    fields
}

/// Leading whitespace, optional sign, at least one decimal digit.
fn scan_int(s: &str) -> Option<(i64, &str)> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let magnitude = digits[..end].bytes().fold(0i64, |acc, b| {
        acc.wrapping_mul(10).wrapping_add(i64::from(b - b'0'))
    });
    let value = if negative {
        magnitude.wrapping_neg()
    } else {
        magnitude
    };
    Some((value, &digits[end..]))
}
