//! Built-in ("simple") types.
//!
//! Type indexes below [`crate::tpi::TypeIndex::FIRST_NON_SIMPLE`] do not reference a record.
//! The low byte selects a [`SimpleTypeKind`], bits 8 to 10 a [`SimpleTypeMode`] which turns
//! the built-in into a pointer to it.

use strum::{EnumCount, EnumIter, FromRepr, IntoEnumIterator};

/// Primitive type kind encoded in the low byte of a simple type index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount, FromRepr)]
#[repr(u32)]
#[allow(missing_docs)]
pub enum SimpleTypeKind {
    None = 0x0000,
    Void = 0x0003,
    NotTranslated = 0x0007,
    HResult = 0x0008,

    SignedCharacter = 0x0010,
    UnsignedCharacter = 0x0020,
    NarrowCharacter = 0x0070,
    WideCharacter = 0x0071,
    Character16 = 0x007a,
    Character32 = 0x007b,

    SByte = 0x0068,
    Byte = 0x0069,
    Int16Short = 0x0011,
    UInt16Short = 0x0021,
    Int16 = 0x0072,
    UInt16 = 0x0073,
    Int32Long = 0x0012,
    UInt32Long = 0x0022,
    Int32 = 0x0074,
    UInt32 = 0x0075,
    Int64Quad = 0x0013,
    UInt64Quad = 0x0023,
    Int64 = 0x0076,
    UInt64 = 0x0077,
    Int128Oct = 0x0014,
    UInt128Oct = 0x0024,
    Int128 = 0x0078,
    UInt128 = 0x0079,

    Float16 = 0x0046,
    Float32 = 0x0040,
    Float32PartialPrecision = 0x0045,
    Float48 = 0x0044,
    Float64 = 0x0041,
    Float80 = 0x0042,
    Float128 = 0x0043,

    Complex16 = 0x0056,
    Complex32 = 0x0050,
    Complex32PartialPrecision = 0x0055,
    Complex48 = 0x0054,
    Complex64 = 0x0051,
    Complex80 = 0x0052,
    Complex128 = 0x0053,

    Boolean8 = 0x0030,
    Boolean16 = 0x0031,
    Boolean32 = 0x0032,
    Boolean64 = 0x0033,
    Boolean128 = 0x0034,
}

impl SimpleTypeKind {
    /// The C/C++ spelling of this kind, `None` for kinds without one.
    #[must_use]
    pub fn name(self) -> Option<&'static str> {
        let name = match self {
            SimpleTypeKind::Void => "void",
            SimpleTypeKind::NotTranslated => "<not translated>",
            SimpleTypeKind::HResult => "HRESULT",
            SimpleTypeKind::SignedCharacter => "signed char",
            SimpleTypeKind::UnsignedCharacter => "unsigned char",
            SimpleTypeKind::NarrowCharacter => "char",
            SimpleTypeKind::WideCharacter => "wchar_t",
            SimpleTypeKind::Character16 => "char16_t",
            SimpleTypeKind::Character32 => "char32_t",
            SimpleTypeKind::SByte => "__int8",
            SimpleTypeKind::Byte => "unsigned __int8",
            SimpleTypeKind::Int16Short => "short",
            SimpleTypeKind::UInt16Short => "unsigned short",
            SimpleTypeKind::Int16 => "__int16",
            SimpleTypeKind::UInt16 => "unsigned __int16",
            SimpleTypeKind::Int32Long => "long",
            SimpleTypeKind::UInt32Long => "unsigned long",
            SimpleTypeKind::Int32 => "int",
            SimpleTypeKind::UInt32 => "unsigned",
            SimpleTypeKind::Int64Quad | SimpleTypeKind::Int64 => "__int64",
            SimpleTypeKind::UInt64Quad | SimpleTypeKind::UInt64 => "unsigned __int64",
            SimpleTypeKind::Int128 => "__int128",
            SimpleTypeKind::UInt128 => "unsigned __int128",
            SimpleTypeKind::Float16 => "__half",
            SimpleTypeKind::Float32 | SimpleTypeKind::Float32PartialPrecision => "float",
            SimpleTypeKind::Float48 => "__float48",
            SimpleTypeKind::Float64 => "double",
            SimpleTypeKind::Float80 => "long double",
            SimpleTypeKind::Float128 => "__float128",
            SimpleTypeKind::Complex32 => "_Complex float",
            SimpleTypeKind::Complex64 => "_Complex double",
            SimpleTypeKind::Complex80 => "_Complex long double",
            SimpleTypeKind::Complex128 => "_Complex __float128",
            SimpleTypeKind::Boolean8 => "bool",
            SimpleTypeKind::Boolean16 => "__bool16",
            SimpleTypeKind::Boolean32 => "__bool32",
            SimpleTypeKind::Boolean64 => "__bool64",
            SimpleTypeKind::None
            | SimpleTypeKind::Int128Oct
            | SimpleTypeKind::UInt128Oct
            | SimpleTypeKind::Complex16
            | SimpleTypeKind::Complex32PartialPrecision
            | SimpleTypeKind::Complex48
            | SimpleTypeKind::Boolean128 => return None,
        };
        Some(name)
    }

    /// All kinds that have a C/C++ spelling, in declaration order.
    pub fn named() -> impl Iterator<Item = SimpleTypeKind> {
        SimpleTypeKind::iter().filter(|kind| kind.name().is_some())
    }
}

/// Pointer mode encoded in bits 8 to 10 of a simple type index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, FromRepr)]
#[repr(u32)]
pub enum SimpleTypeMode {
    /// Not a pointer
    Direct = 0x0000,
    /// Near pointer
    NearPointer = 0x0100,
    /// Far pointer
    FarPointer = 0x0200,
    /// Huge pointer
    HugePointer = 0x0300,
    /// 32-bit near pointer
    NearPointer32 = 0x0400,
    /// 32-bit far pointer
    FarPointer32 = 0x0500,
    /// 64-bit near pointer
    NearPointer64 = 0x0600,
    /// 128-bit near pointer
    NearPointer128 = 0x0700,
}

impl SimpleTypeMode {
    /// Returns `true` for every mode except [`SimpleTypeMode::Direct`]
    #[must_use]
    pub fn is_pointer(self) -> bool {
        self != SimpleTypeMode::Direct
    }
}
