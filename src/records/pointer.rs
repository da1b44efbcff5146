//! `LF_POINTER` and the fields packed into its attribute word.
//!
//! Bits 0-4 hold the [`PointerKind`], bits 5-7 the [`PointerMode`], bits 8-12 the options
//! and bits 13-20 the pointer size in bytes. Pointers to members carry a trailing
//! [`MemberPointerInfo`].

use bitflags::bitflags;
use strum::FromRepr;

use crate::{file::reader::BinaryReader, tpi::TypeIndex, Result};

/// Bitmask for [`PointerKind`] in the pointer attributes
pub const POINTER_KIND_MASK: u32 = 0x1F;
/// Bitmask for [`PointerMode`] after shifting
pub const POINTER_MODE_MASK: u32 = 0x07;
/// Shift of [`PointerMode`]
pub const POINTER_MODE_SHIFT: u32 = 5;
/// Bitmask for [`PointerOptions`]
pub const POINTER_OPTIONS_MASK: u32 = 0x1F00;
/// Bitmask for the pointer size after shifting
pub const POINTER_SIZE_MASK: u32 = 0xFF;
/// Shift of the pointer size
pub const POINTER_SIZE_SHIFT: u32 = 13;

/// Addressing model of a pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(u32)]
#[allow(missing_docs)]
pub enum PointerKind {
    Near16 = 0x00,
    Far16 = 0x01,
    Huge16 = 0x02,
    BasedOnSegment = 0x03,
    BasedOnValue = 0x04,
    BasedOnSegmentValue = 0x05,
    BasedOnAddress = 0x06,
    BasedOnSegmentAddress = 0x07,
    BasedOnType = 0x08,
    BasedOnSelf = 0x09,
    Near32 = 0x0a,
    Far32 = 0x0b,
    Near64 = 0x0c,
}

/// What a pointer record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(u32)]
#[allow(missing_docs)]
pub enum PointerMode {
    Pointer = 0x00,
    LValueReference = 0x01,
    PointerToDataMember = 0x02,
    PointerToMemberFunction = 0x03,
    RValueReference = 0x04,
}

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
    /// Qualifiers of a pointer
    pub struct PointerOptions : u32 {
        /// 16:32 pointer
        const FLAT32 = 0x0100;
        /// `volatile` pointer
        const VOLATILE = 0x0200;
        /// `const` pointer
        const CONST = 0x0400;
        /// `__unaligned` pointer
        const UNALIGNED = 0x0800;
        /// `__restrict` pointer
        const RESTRICT = 0x1000;
    }
}

/// Representation of a pointer to member
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(u16)]
#[allow(missing_docs)]
pub enum PointerToMemberRepresentation {
    Unknown = 0x00,
    SingleInheritanceData = 0x01,
    MultipleInheritanceData = 0x02,
    VirtualInheritanceData = 0x03,
    GeneralData = 0x04,
    SingleInheritanceFunction = 0x05,
    MultipleInheritanceFunction = 0x06,
    VirtualInheritanceFunction = 0x07,
    GeneralFunction = 0x08,
}

/// Tail of a pointer to member record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberPointerInfo {
    /// The class the member belongs to
    pub containing_type: TypeIndex,
    /// Raw [`PointerToMemberRepresentation`]
    pub representation: u16,
}

impl MemberPointerInfo {
    /// The representation, if known
    #[must_use]
    pub fn representation(&self) -> Option<PointerToMemberRepresentation> {
        PointerToMemberRepresentation::from_repr(self.representation)
    }
}

/// `LF_POINTER`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerRecord {
    /// The pointed-to type
    pub referent_type: TypeIndex,
    /// Packed kind, mode, options and size
    pub attributes: u32,
    /// Present only for pointers to members
    pub member_info: Option<MemberPointerInfo>,
}

impl PointerRecord {
    /// Decodes the record body.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on truncated input.
    pub fn read<R: BinaryReader + ?Sized>(reader: &mut R) -> Result<PointerRecord> {
        let referent_type = reader.read_le::<TypeIndex>()?;
        let attributes = reader.read_le::<u32>()?;

        let mut record = PointerRecord {
            referent_type,
            attributes,
            member_info: None,
        };

        if record.is_pointer_to_member() {
            record.member_info = Some(MemberPointerInfo {
                containing_type: reader.read_le::<TypeIndex>()?,
                representation: reader.read_le::<u16>()?,
            });
        }

        Ok(record)
    }

    /// Addressing model, `None` for unknown values
    #[must_use]
    pub fn kind(&self) -> Option<PointerKind> {
        PointerKind::from_repr(self.attributes & POINTER_KIND_MASK)
    }

    /// Pointer mode, `None` for unknown values
    #[must_use]
    pub fn mode(&self) -> Option<PointerMode> {
        PointerMode::from_repr((self.attributes >> POINTER_MODE_SHIFT) & POINTER_MODE_MASK)
    }

    /// Qualifiers
    #[must_use]
    pub fn options(&self) -> PointerOptions {
        PointerOptions::from_bits_truncate(self.attributes & POINTER_OPTIONS_MASK)
    }

    /// Size of the pointer in bytes
    #[must_use]
    pub fn size(&self) -> u8 {
        ((self.attributes >> POINTER_SIZE_SHIFT) & POINTER_SIZE_MASK) as u8
    }

    /// Returns `true` for pointers to data members and to member functions
    #[must_use]
    pub fn is_pointer_to_member(&self) -> bool {
        matches!(
            self.mode(),
            Some(PointerMode::PointerToDataMember | PointerMode::PointerToMemberFunction)
        )
    }

    /// Returns `true` for lvalue and rvalue references
    #[must_use]
    pub fn is_reference(&self) -> bool {
        matches!(
            self.mode(),
            Some(PointerMode::LValueReference | PointerMode::RValueReference)
        )
    }
}
