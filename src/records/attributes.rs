//! Flags and small enumerations embedded in type records.
//!
//! # Key Types
//! - [`ClassOptions`], [`HfaKind`], [`WindowsRtClassKind`]: property word of tag records
//! - [`MemberAttributes`], [`MemberAccess`], [`MethodKind`], [`MethodOptions`]: member properties
//! - [`ModifierOptions`], [`FunctionOptions`], [`CallingConvention`]: qualifiers and signatures

use bitflags::bitflags;
use strum::FromRepr;

/// Bitmask for the homogeneous floating point aggregate kind in [`ClassOptions`]
pub const CLASS_HFA_MASK: u16 = 0x1800;
/// Bitmask for the WinRT class kind in [`ClassOptions`]
pub const CLASS_WINRT_MASK: u16 = 0xC000;
/// Bitmask for [`MemberAccess`] in [`MemberAttributes`]
pub const MEMBER_ACCESS_MASK: u16 = 0x0003;
/// Bitmask for [`MethodKind`] in [`MemberAttributes`]
pub const METHOD_KIND_MASK: u16 = 0x001c;

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
    /// Property word of class, structure, union, interface and enum records
    pub struct ClassOptions : u16 {
        /// Structure is packed
        const PACKED = 0x0001;
        /// Has constructors and/or destructors
        const HAS_CONSTRUCTOR_OR_DESTRUCTOR = 0x0002;
        /// Has overloaded operators
        const HAS_OVERLOADED_OPERATOR = 0x0004;
        /// Is a nested class
        const NESTED = 0x0008;
        /// Contains nested classes
        const CONTAINS_NESTED_CLASS = 0x0010;
        /// Has an overloaded assignment operator
        const HAS_OVERLOADED_ASSIGNMENT_OPERATOR = 0x0020;
        /// Has casting methods
        const HAS_CONVERSION_OPERATOR = 0x0040;
        /// Forward declaration without a member list
        const FORWARD_REFERENCE = 0x0080;
        /// Scoped definition
        const SCOPED = 0x0100;
        /// A decorated unique name follows the name
        const HAS_UNIQUE_NAME = 0x0200;
        /// Class cannot be used as a base class
        const SEALED = 0x0400;
        /// Intrinsic type such as `__m128`
        const INTRINSIC = 0x2000;
    }
}

impl ClassOptions {
    /// Homogeneous floating point aggregate kind
    #[must_use]
    pub fn hfa(raw: u16) -> HfaKind {
        HfaKind::from_repr((raw & CLASS_HFA_MASK) >> 11).unwrap_or(HfaKind::None)
    }

    /// WinRT class kind
    #[must_use]
    pub fn mocom(raw: u16) -> WindowsRtClassKind {
        WindowsRtClassKind::from_repr((raw & CLASS_WINRT_MASK) >> 14)
            .unwrap_or(WindowsRtClassKind::None)
    }
}

/// Homogeneous floating point aggregate kind of a class
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(u16)]
#[allow(missing_docs)]
pub enum HfaKind {
    None = 0,
    Float = 1,
    Double = 2,
    Other = 3,
}

/// WinRT class kind of a class
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(u16)]
#[allow(missing_docs)]
pub enum WindowsRtClassKind {
    None = 0,
    RefClass = 1,
    ValueClass = 2,
    Interface = 3,
}

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
    /// Qualifiers of an `LF_MODIFIER` record
    pub struct ModifierOptions : u16 {
        /// `const`
        const CONST = 0x0001;
        /// `volatile`
        const VOLATILE = 0x0002;
        /// `__unaligned`
        const UNALIGNED = 0x0004;
    }
}

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
    /// Attributes of a function signature
    pub struct FunctionOptions : u8 {
        /// Returns a user defined type through a hidden pointer
        const CXX_RETURN_UDT = 0x01;
        /// Is a constructor
        const CONSTRUCTOR = 0x02;
        /// Is a constructor of a class with virtual bases
        const CONSTRUCTOR_WITH_VIRTUAL_BASES = 0x04;
    }
}

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
    /// Method properties stored above the access and kind bits of [`MemberAttributes`]
    pub struct MethodOptions : u16 {
        /// Compiler generated function that does not exist
        const PSEUDO = 0x0020;
        /// Class cannot be inherited
        const NO_INHERIT = 0x0040;
        /// Class cannot be constructed
        const NO_CONSTRUCT = 0x0080;
        /// Compiler generated function that does exist
        const COMPILER_GENERATED = 0x0100;
        /// Method cannot be overridden
        const SEALED = 0x0200;
    }
}

/// Access protection of a member
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(u16)]
#[allow(missing_docs)]
pub enum MemberAccess {
    None = 0,
    Private = 1,
    Protected = 2,
    Public = 3,
}

/// Kind of a method
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(u16)]
#[allow(missing_docs)]
pub enum MethodKind {
    Vanilla = 0,
    Virtual = 1,
    Static = 2,
    Friend = 3,
    IntroducingVirtual = 4,
    PureVirtual = 5,
    PureIntroducingVirtual = 6,
    Reserved = 7,
}

/// The 16-bit attribute word of member records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemberAttributes(pub u16);

impl MemberAttributes {
    /// Access protection
    #[must_use]
    pub fn access(self) -> MemberAccess {
        MemberAccess::from_repr(self.0 & MEMBER_ACCESS_MASK).unwrap_or(MemberAccess::None)
    }

    /// Method kind
    #[must_use]
    pub fn method_kind(self) -> MethodKind {
        MethodKind::from_repr((self.0 & METHOD_KIND_MASK) >> 2).unwrap_or(MethodKind::Vanilla)
    }

    /// Remaining method properties
    #[must_use]
    pub fn options(self) -> MethodOptions {
        MethodOptions::from_bits_truncate(self.0 & !(MEMBER_ACCESS_MASK | METHOD_KIND_MASK))
    }

    /// Returns `true` if the method occupies a virtual function table slot
    #[must_use]
    pub fn is_virtual(self) -> bool {
        matches!(self.method_kind(), MethodKind::Virtual | MethodKind::PureVirtual)
            || self.is_introducing_virtual()
    }

    /// Returns `true` if the method introduces a new slot, in which case its record carries a
    /// virtual function table offset
    #[must_use]
    pub fn is_introducing_virtual(self) -> bool {
        matches!(
            self.method_kind(),
            MethodKind::IntroducingVirtual | MethodKind::PureIntroducingVirtual
        )
    }
}

/// Calling convention of a function signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum CallingConvention {
    NearC = 0x00,
    FarC = 0x01,
    NearPascal = 0x02,
    FarPascal = 0x03,
    NearFast = 0x04,
    FarFast = 0x05,
    NearStdCall = 0x07,
    FarStdCall = 0x08,
    NearSysCall = 0x09,
    FarSysCall = 0x0a,
    ThisCall = 0x0b,
    MipsCall = 0x0c,
    Generic = 0x0d,
    AlphaCall = 0x0e,
    PpcCall = 0x0f,
    SHCall = 0x10,
    ArmCall = 0x11,
    AM33Call = 0x12,
    TriCall = 0x13,
    SH5Call = 0x14,
    M32RCall = 0x15,
    ClrCall = 0x16,
    Inline = 0x17,
    NearVector = 0x18,
}
