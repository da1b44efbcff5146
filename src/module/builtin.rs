//! Layout of the built-in types.
//!
//! Simple type indexes never reference a record, their basic type and size come from a fixed
//! table keyed by [`SimpleTypeKind`].

use crate::{module::symbol::BasicType, tpi::SimpleTypeKind};

/// The basic type and size in bytes of a built-in kind
#[must_use]
pub fn builtin_layout(kind: SimpleTypeKind) -> (BasicType, u32) {
    match kind {
        SimpleTypeKind::None | SimpleTypeKind::NotTranslated => (BasicType::NoType, 0),
        SimpleTypeKind::Void => (BasicType::Void, 0),
        SimpleTypeKind::HResult => (BasicType::Hresult, 4),

        SimpleTypeKind::NarrowCharacter
        | SimpleTypeKind::UnsignedCharacter
        | SimpleTypeKind::SignedCharacter => (BasicType::Char, 1),
        SimpleTypeKind::WideCharacter => (BasicType::WChar, 2),
        SimpleTypeKind::Character16 => (BasicType::Char16, 2),
        SimpleTypeKind::Character32 => (BasicType::Char32, 4),

        SimpleTypeKind::SByte => (BasicType::Int, 1),
        SimpleTypeKind::Byte => (BasicType::UInt, 1),
        SimpleTypeKind::Int16Short | SimpleTypeKind::Int16 => (BasicType::Int, 2),
        SimpleTypeKind::UInt16Short | SimpleTypeKind::UInt16 => (BasicType::UInt, 2),
        SimpleTypeKind::Int32Long | SimpleTypeKind::Int32 => (BasicType::Int, 4),
        SimpleTypeKind::UInt32Long | SimpleTypeKind::UInt32 => (BasicType::UInt, 4),
        SimpleTypeKind::Int64Quad | SimpleTypeKind::Int64 => (BasicType::Long, 8),
        SimpleTypeKind::UInt64Quad | SimpleTypeKind::UInt64 => (BasicType::ULong, 8),
        SimpleTypeKind::Int128Oct | SimpleTypeKind::Int128 => (BasicType::Long, 16),
        SimpleTypeKind::UInt128Oct | SimpleTypeKind::UInt128 => (BasicType::ULong, 16),

        SimpleTypeKind::Float16 => (BasicType::Float, 2),
        SimpleTypeKind::Float32 | SimpleTypeKind::Float32PartialPrecision => (BasicType::Float, 4),
        SimpleTypeKind::Float48 => (BasicType::Float, 6),
        SimpleTypeKind::Float64 => (BasicType::Float, 8),
        SimpleTypeKind::Float80 => (BasicType::Float, 10),
        SimpleTypeKind::Float128 => (BasicType::Float, 12),

        SimpleTypeKind::Complex16 => (BasicType::Complex, 2),
        SimpleTypeKind::Complex32 | SimpleTypeKind::Complex32PartialPrecision => {
            (BasicType::Complex, 4)
        }
        SimpleTypeKind::Complex48 => (BasicType::Complex, 6),
        SimpleTypeKind::Complex64 => (BasicType::Complex, 8),
        SimpleTypeKind::Complex80 => (BasicType::Complex, 10),
        SimpleTypeKind::Complex128 => (BasicType::Complex, 16),

        SimpleTypeKind::Boolean8 => (BasicType::Bool, 1),
        SimpleTypeKind::Boolean16 => (BasicType::Bool, 2),
        SimpleTypeKind::Boolean32 => (BasicType::Bool, 4),
        SimpleTypeKind::Boolean64 => (BasicType::Bool, 8),
        SimpleTypeKind::Boolean128 => (BasicType::Bool, 16),
    }
}
