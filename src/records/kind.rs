//! CodeView leaf kinds.

use strum::{EnumIter, FromRepr};

/// Leaf kind of a CodeView type, id or member record
///
/// The values are the `LF_*` constants written by the Microsoft toolchain. Records stored in
/// the TPI and IPI streams use the type and id kinds, members inside an `LF_FIELDLIST` use the
/// member kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, FromRepr)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum TypeLeafKind {
    // Type records
    /// `const`/`volatile`/`__unaligned` qualified type
    LF_MODIFIER = 0x1001,
    /// Pointer or reference
    LF_POINTER = 0x1002,
    /// Free function signature
    LF_PROCEDURE = 0x1008,
    /// Member function signature
    LF_MFUNCTION = 0x1009,
    /// Code label
    LF_LABEL = 0x000e,
    /// Argument list of a signature
    LF_ARGLIST = 0x1201,
    /// Member list of a class, union or enum
    LF_FIELDLIST = 0x1203,
    /// Bitfield member type
    LF_BITFIELD = 0x1205,
    /// Overload list of a method
    LF_METHODLIST = 0x1206,
    /// Fixed size array
    LF_ARRAY = 0x1503,
    /// `class`
    LF_CLASS = 0x1504,
    /// `struct`
    LF_STRUCTURE = 0x1505,
    /// `union`
    LF_UNION = 0x1506,
    /// `enum`
    LF_ENUM = 0x1507,
    /// `__interface`
    LF_INTERFACE = 0x1519,
    /// Virtual function table shape
    LF_VTSHAPE = 0x000a,
    /// Virtual function table layout
    LF_VFTABLE = 0x151d,

    // Id records
    /// Global function id
    LF_FUNC_ID = 0x1601,
    /// Member function id
    LF_MFUNC_ID = 0x1602,
    /// Build information
    LF_BUILDINFO = 0x1603,
    /// List of string ids
    LF_SUBSTR_LIST = 0x1604,
    /// String id
    LF_STRING_ID = 0x1605,
    /// Source location of a user defined type
    LF_UDT_SRC_LINE = 0x1606,
    /// Source location of a user defined type, with module
    LF_UDT_MOD_SRC_LINE = 0x1607,

    // Member records
    /// Direct base class
    LF_BCLASS = 0x1400,
    /// Direct virtual base class
    LF_VBCLASS = 0x1401,
    /// Indirect virtual base class
    LF_IVBCLASS = 0x1402,
    /// Continuation of a field list
    LF_INDEX = 0x1404,
    /// Virtual function table pointer
    LF_VFUNCTAB = 0x1409,
    /// Enumerator
    LF_ENUMERATE = 0x1502,
    /// Non-static data member
    LF_MEMBER = 0x150d,
    /// Static data member
    LF_STMEMBER = 0x150e,
    /// Overloaded method
    LF_METHOD = 0x150f,
    /// Nested type definition
    LF_NESTTYPE = 0x1510,
    /// Non-overloaded method
    LF_ONEMETHOD = 0x1511,
    /// Base interface
    LF_BINTERFACE = 0x151a,

    // Padding
    #[allow(missing_docs)]
    LF_PAD0 = 0xf0,
    #[allow(missing_docs)]
    LF_PAD1 = 0xf1,
    #[allow(missing_docs)]
    LF_PAD2 = 0xf2,
    #[allow(missing_docs)]
    LF_PAD3 = 0xf3,
    #[allow(missing_docs)]
    LF_PAD4 = 0xf4,
    #[allow(missing_docs)]
    LF_PAD5 = 0xf5,
    #[allow(missing_docs)]
    LF_PAD6 = 0xf6,
    #[allow(missing_docs)]
    LF_PAD7 = 0xf7,
    #[allow(missing_docs)]
    LF_PAD8 = 0xf8,
    #[allow(missing_docs)]
    LF_PAD9 = 0xf9,
    #[allow(missing_docs)]
    LF_PAD10 = 0xfa,
    #[allow(missing_docs)]
    LF_PAD11 = 0xfb,
    #[allow(missing_docs)]
    LF_PAD12 = 0xfc,
    #[allow(missing_docs)]
    LF_PAD13 = 0xfd,
    #[allow(missing_docs)]
    LF_PAD14 = 0xfe,
    #[allow(missing_docs)]
    LF_PAD15 = 0xff,
}

impl TypeLeafKind {
    /// Returns `true` for the record kinds that define a user type
    #[must_use]
    pub fn is_tag(self) -> bool {
        matches!(
            self,
            TypeLeafKind::LF_CLASS
                | TypeLeafKind::LF_STRUCTURE
                | TypeLeafKind::LF_INTERFACE
                | TypeLeafKind::LF_UNION
                | TypeLeafKind::LF_ENUM
        )
    }

    /// Returns `true` for the single byte padding kinds
    #[must_use]
    pub fn is_padding(self) -> bool {
        (self as u16) >= 0xf0 && (self as u16) <= 0xff
    }
}
