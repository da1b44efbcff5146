//! CodeView encoded integers.
//!
//! Sizes, offsets and enumerator values inside type and symbol records are stored as a
//! `u16` leaf, optionally followed by a payload. Leaves below [`LF_NUMERIC`] are the value
//! itself; larger leaves select the width and signedness of the value that follows.

use std::fmt;

use crate::{Error, Result};

/// First leaf value that introduces a typed payload instead of being the value itself.
pub const LF_NUMERIC: u16 = 0x8000;
/// Signed 8-bit payload
pub const LF_CHAR: u16 = 0x8000;
/// Signed 16-bit payload
pub const LF_SHORT: u16 = 0x8001;
/// Unsigned 16-bit payload
pub const LF_USHORT: u16 = 0x8002;
/// Signed 32-bit payload
pub const LF_LONG: u16 = 0x8003;
/// Unsigned 32-bit payload
pub const LF_ULONG: u16 = 0x8004;
/// 32-bit float payload
pub const LF_REAL32: u16 = 0x8005;
/// 64-bit float payload
pub const LF_REAL64: u16 = 0x8006;
/// 80-bit float payload
pub const LF_REAL80: u16 = 0x8007;
/// 128-bit float payload
pub const LF_REAL128: u16 = 0x8008;
/// Signed 64-bit payload
pub const LF_QUADWORD: u16 = 0x8009;
/// Unsigned 64-bit payload
pub const LF_UQUADWORD: u16 = 0x800a;
/// 48-bit float payload
pub const LF_REAL48: u16 = 0x800b;
/// 32-bit complex payload
pub const LF_COMPLEX32: u16 = 0x800c;
/// 64-bit complex payload
pub const LF_COMPLEX64: u16 = 0x800d;
/// 80-bit complex payload
pub const LF_COMPLEX80: u16 = 0x800e;
/// 128-bit complex payload
pub const LF_COMPLEX128: u16 = 0x800f;
/// Length-prefixed string payload
pub const LF_VARSTRING: u16 = 0x8010;
/// Signed 128-bit payload
pub const LF_OCTWORD: u16 = 0x8017;
/// Unsigned 128-bit payload
pub const LF_UOCTWORD: u16 = 0x8018;
/// OLE decimal payload
pub const LF_DECIMAL: u16 = 0x8019;
/// OLE date payload
pub const LF_DATE: u16 = 0x801a;
/// UTF-8 string payload
pub const LF_UTF8STRING: u16 = 0x801b;
/// 16-bit float payload
pub const LF_REAL16: u16 = 0x801c;

/// A decoded CodeView encoded integer.
///
/// The variant preserves the width the producer chose, which matters when the value is
/// rendered (an enumerator declared as `-1` must not print as `4294967295`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Numeric {
    /// `LF_CHAR`
    Char(i8),
    /// `LF_SHORT`
    Short(i16),
    /// `LF_USHORT`, also used for immediate values below `LF_NUMERIC`
    UShort(u16),
    /// `LF_LONG`
    Long(i32),
    /// `LF_ULONG`
    ULong(u32),
    /// `LF_QUADWORD`
    Quad(i64),
    /// `LF_UQUADWORD`
    UQuad(u64),
    /// `LF_OCTWORD`
    Oct(i128),
    /// `LF_UOCTWORD`
    UOct(u128),
}

impl Numeric {
    /// Returns the value reinterpreted as an unsigned 64-bit integer.
    ///
    /// Negative values are sign-extended before the conversion, 128-bit values are truncated.
    #[must_use]
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    pub fn as_u64(&self) -> u64 {
        match *self {
            Numeric::Char(v) => i64::from(v) as u64,
            Numeric::Short(v) => i64::from(v) as u64,
            Numeric::UShort(v) => u64::from(v),
            Numeric::Long(v) => i64::from(v) as u64,
            Numeric::ULong(v) => u64::from(v),
            Numeric::Quad(v) => v as u64,
            Numeric::UQuad(v) => v,
            Numeric::Oct(v) => v as u64,
            Numeric::UOct(v) => v as u64,
        }
    }

    /// Returns the value as a signed 64-bit integer.
    #[must_use]
    #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
    pub fn as_i64(&self) -> i64 {
        match *self {
            Numeric::Char(v) => i64::from(v),
            Numeric::Short(v) => i64::from(v),
            Numeric::UShort(v) => i64::from(v),
            Numeric::Long(v) => i64::from(v),
            Numeric::ULong(v) => i64::from(v),
            Numeric::Quad(v) => v,
            Numeric::UQuad(v) => v as i64,
            Numeric::Oct(v) => v as i64,
            Numeric::UOct(v) => v as i64,
        }
    }

    /// Checks whether `leaf` introduces a payload that cannot be decoded as an integer.
    #[must_use]
    pub fn is_unsupported_leaf(leaf: u16) -> bool {
        matches!(
            leaf,
            LF_REAL32
                | LF_REAL64
                | LF_REAL80
                | LF_REAL128
                | LF_REAL48
                | LF_COMPLEX32
                | LF_COMPLEX64
                | LF_COMPLEX80
                | LF_COMPLEX128
                | LF_VARSTRING
                | LF_DECIMAL
                | LF_DATE
                | LF_UTF8STRING
                | LF_REAL16
        )
    }

    pub(crate) fn unsupported(leaf: u16) -> Error {
        Error::UnsupportedNumeric(leaf)
    }
}

impl Default for Numeric {
    fn default() -> Self {
        Numeric::UShort(0)
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Numeric::Char(v) => write!(f, "{v}"),
            Numeric::Short(v) => write!(f, "{v}"),
            Numeric::UShort(v) => write!(f, "{v}"),
            Numeric::Long(v) => write!(f, "{v}"),
            Numeric::ULong(v) => write!(f, "{v}"),
            Numeric::Quad(v) => write!(f, "{v}"),
            Numeric::UQuad(v) => write!(f, "{v}"),
            Numeric::Oct(v) => write!(f, "{v}"),
            Numeric::UOct(v) => write!(f, "{v}"),
        }
    }
}

impl From<Numeric> for u64 {
    fn from(value: Numeric) -> Self {
        value.as_u64()
    }
}

/// Converts a leaf that was already classified as "payload follows" into a decode result.
///
/// Kept separate from the reader so both cursor kinds share one table.
pub(crate) fn check_leaf(leaf: u16) -> Result<()> {
    if Numeric::is_unsupported_leaf(leaf) {
        return Err(Numeric::unsupported(leaf));
    }
    Ok(())
}
