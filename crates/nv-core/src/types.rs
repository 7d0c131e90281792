//! Value types stored in an NV document.
//!
//! [`NvType`] is the declared data type of a stored value and [`NvValue`]
//! carries the matching payload. Encoding and decoding are matched
//! exhaustively on these enums, so a value can never be written through a
//! pointer of the wrong width.

use std::fmt;
use std::str::FromStr;

use crate::codec;
use crate::error::{NvError, Result};

/// Declared data type of a stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NvType {
    U8,
    S8,
    U16,
    S16,
    U32,
    S32,
    U64,
    S64,
    Float,
    Double,
    Str,
    StringArray,
    IntArray,
    FloatArray,
    DoubleArray,
    /// IPv4 address, four 32-bit fields rendered `a.b.c.d`.
    Ip,
    /// MAC address, six 32-bit fields rendered `a-b-c-d-e-f`.
    Mac,
}

impl NvType {
    /// All tags, in declaration order.
    pub const ALL: [NvType; 17] = [
        NvType::U8,
        NvType::S8,
        NvType::U16,
        NvType::S16,
        NvType::U32,
        NvType::S32,
        NvType::U64,
        NvType::S64,
        NvType::Float,
        NvType::Double,
        NvType::Str,
        NvType::StringArray,
        NvType::IntArray,
        NvType::FloatArray,
        NvType::DoubleArray,
        NvType::Ip,
        NvType::Mac,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NvType::U8 => "u8",
            NvType::S8 => "s8",
            NvType::U16 => "u16",
            NvType::S16 => "s16",
            NvType::U32 => "u32",
            NvType::S32 => "s32",
            NvType::U64 => "u64",
            NvType::S64 => "s64",
            NvType::Float => "float",
            NvType::Double => "double",
            NvType::Str => "str",
            NvType::StringArray => "string-array",
            NvType::IntArray => "int-array",
            NvType::FloatArray => "float-array",
            NvType::DoubleArray => "double-array",
            NvType::Ip => "ip",
            NvType::Mac => "mac",
        }
    }

    /// Array variants are always replaced wholesale on write.
    pub fn is_array(self) -> bool {
        matches!(
            self,
            NvType::StringArray | NvType::IntArray | NvType::FloatArray | NvType::DoubleArray
        )
    }
}

impl fmt::Display for NvType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NvType {
    type Err = NvError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        NvType::ALL
            .into_iter()
            .find(|t| t.name() == wanted)
            .ok_or_else(|| NvError::UnknownType(s.to_string()))
    }
}

/// A typed value together with its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum NvValue {
    U8(u8),
    S8(i8),
    U16(u16),
    S16(i16),
    U32(u32),
    S32(i32),
    U64(u64),
    S64(i64),
    Float(f32),
    Double(f64),
    Str(String),
    StringArray(Vec<String>),
    IntArray(Vec<i32>),
    FloatArray(Vec<f32>),
    DoubleArray(Vec<f64>),
    Ip([u32; 4]),
    Mac([u32; 6]),
}

impl NvValue {
    pub fn kind(&self) -> NvType {
        match self {
            NvValue::U8(_) => NvType::U8,
            NvValue::S8(_) => NvType::S8,
            NvValue::U16(_) => NvType::U16,
            NvValue::S16(_) => NvType::S16,
            NvValue::U32(_) => NvType::U32,
            NvValue::S32(_) => NvType::S32,
            NvValue::U64(_) => NvType::U64,
            NvValue::S64(_) => NvType::S64,
            NvValue::Float(_) => NvType::Float,
            NvValue::Double(_) => NvType::Double,
            NvValue::Str(_) => NvType::Str,
            NvValue::StringArray(_) => NvType::StringArray,
            NvValue::IntArray(_) => NvType::IntArray,
            NvValue::FloatArray(_) => NvType::FloatArray,
            NvValue::DoubleArray(_) => NvType::DoubleArray,
            NvValue::Ip(_) => NvType::Ip,
            NvValue::Mac(_) => NvType::Mac,
        }
    }
}

/// Renders scalars bare, IP/MAC in their stored text form and arrays as
/// JSON arrays.
impl fmt::Display for NvValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NvValue::U8(v) => write!(f, "{v}"),
            NvValue::S8(v) => write!(f, "{v}"),
            NvValue::U16(v) => write!(f, "{v}"),
            NvValue::S16(v) => write!(f, "{v}"),
            NvValue::U32(v) => write!(f, "{v}"),
            NvValue::S32(v) => write!(f, "{v}"),
            NvValue::U64(v) => write!(f, "{v}"),
            NvValue::S64(v) => write!(f, "{v}"),
            NvValue::Float(v) => write!(f, "{v}"),
            NvValue::Double(v) => write!(f, "{v}"),
            NvValue::Str(s) => f.write_str(s),
            NvValue::Ip(fields) => f.write_str(&codec::format_ip(fields)),
            NvValue::Mac(fields) => f.write_str(&codec::format_mac(fields)),
            NvValue::StringArray(_)
            | NvValue::IntArray(_)
            | NvValue::FloatArray(_)
            | NvValue::DoubleArray(_) => write!(f, "{}", codec::encode(self)),
        }
    }
}

/// Destination size for a decode.
///
/// For [`NvType::Str`] the bound is a byte length and an oversized string is a
/// [`NvError::Truncation`]. For array types the bound is an element count and
/// only the first `min(len, n)` elements are read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Capacity {
    #[default]
    Unbounded,
    Bounded(usize),
}

impl Capacity {
    pub(crate) fn limit(self, len: usize) -> usize {
        match self {
            Capacity::Unbounded => len,
            Capacity::Bounded(n) => len.min(n),
        }
    }

    /// Fails when `needed` bytes do not fit.
    pub(crate) fn check(self, needed: usize) -> Result<()> {
        match self {
            Capacity::Bounded(capacity) if needed > capacity => {
                Err(NvError::Truncation { needed, capacity })
            }
            _ => Ok(()),
        }
    }
}

/// A caller-owned, fixed-capacity string slot.
///
/// A slice of these is the destination for
/// [`codec::decode_strings_into`]: each slot is sized up front and decoding
/// a longer element fails instead of overrunning it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrBuf {
    buf: String,
    capacity: usize,
}

impl StrBuf {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: String::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Replace the contents with `s`; the slot is left untouched on failure.
    pub fn set(&mut self, s: &str) -> Result<()> {
        Capacity::Bounded(self.capacity).check(s.len())?;
        self.buf.clear();
        self.buf.push_str(s);
        Ok(())
    }
}

impl fmt::Display for StrBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.buf)
    }
}
