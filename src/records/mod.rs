//! CodeView type and id records.
//!
//! Every record of the TPI and IPI streams starts with a `(u16 length, u16 kind)` prefix.
//! [`TypeRecord::decode`] turns the body of one record into a [`TypeRecord`], choosing the
//! decoder through a single `match` on [`TypeLeafKind`]. Decoders are plain functions of a
//! [`BinaryReader`] positioned at the body; records reference each other only through
//! [`TypeIndex`] values, never by ownership.
//!
//! # Key Components
//!
//! - [`crate::records::TypeRecord`] - The decoded record, one variant per supported kind
//! - [`crate::records::kind::TypeLeafKind`] - The `LF_*` kinds
//! - [`crate::records::fieldlist`] - Field lists and member records
//! - [`crate::records::attributes`] - Option words and small enumerations
//!
//! # Examples
//!
//! ```rust
//! use pdbscope::{records::TypeRecord, Parser, UnknownRecordPolicy};
//!
//! // LF_MODIFIER: const int
//! let data = [0x74, 0x00, 0x00, 0x00, 0x01, 0x00];
//! let mut parser = Parser::new(&data);
//! let record = TypeRecord::decode(&mut parser, 0x1001, data.len(), UnknownRecordPolicy::Fail)?;
//! assert!(matches!(record, TypeRecord::Modifier(_)));
//! # Ok::<(), pdbscope::Error>(())
//! ```

pub mod attributes;
pub mod fieldlist;
pub mod ids;
pub mod kind;
pub mod misc;
pub mod pointer;
pub mod procedure;
pub mod tag;

pub use attributes::*;
pub use fieldlist::*;
pub use ids::*;
pub use kind::TypeLeafKind;
pub use misc::*;
pub use pointer::*;
pub use procedure::*;
pub use tag::*;

use crate::{config::UnknownRecordPolicy, file::reader::BinaryReader, tpi::TypeIndex, Error, Result};

/// Size of the `(length, kind)` prefix of every record
pub const RECORD_PREFIX_SIZE: usize = 4;

/// A decoded type or id record
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum TypeRecord {
    /// `LF_CLASS`, `LF_STRUCTURE` or `LF_INTERFACE`, told apart by `kind`
    Class { kind: TypeLeafKind, record: ClassRecord },
    Union(UnionRecord),
    Enum(EnumRecord),
    Array(ArrayRecord),
    Pointer(PointerRecord),
    Modifier(ModifierRecord),
    Procedure(ProcedureRecord),
    MemberFunction(MemberFunctionRecord),
    ArgumentList(ArgumentListRecord),
    StringList(ArgumentListRecord),
    FieldList(FieldListRecord),
    BitField(BitFieldRecord),
    MethodOverloadList(MethodOverloadListRecord),
    VirtualFunctionTableShape(VirtualFunctionTableShapeRecord),
    VirtualFunctionTable(VirtualFunctionTableRecord),
    Label(LabelRecord),
    NestedType(NestedTypeRecord),
    FuncId(FuncIdRecord),
    MemberFuncId(MemberFuncIdRecord),
    StringId(StringIdRecord),
    BuildInfo(BuildInfoRecord),
    UdtSourceLine(UdtSourceLineRecord),
    UdtModuleSourceLine(UdtSourceLineRecord),
    /// A kind without a decoder, kept as raw bytes under [`UnknownRecordPolicy::Preserve`]
    Unknown { kind: u16, data: Vec<u8> },
}

impl TypeRecord {
    /// Decodes a record body of `length` bytes.
    ///
    /// # Arguments
    /// * `reader` - Positioned at the first byte after the record prefix
    /// * `kind` - The raw kind from the prefix
    /// * `length` - Body length, the prefix length minus 2
    /// * `policy` - How kinds without a decoder are handled
    ///
    /// # Errors
    /// Returns [`crate::Error::UnknownTypeRecord`] for kinds without a decoder under
    /// [`UnknownRecordPolicy::Fail`], [`crate::Error::Malformed`] if the decoder stopped
    /// more than 4 bytes short of the body end or ran past it, and
    /// [`crate::Error::OutOfBounds`] on truncated input.
    pub fn decode<R: BinaryReader + ?Sized>(
        reader: &mut R,
        kind: u16,
        length: usize,
        policy: UnknownRecordPolicy,
    ) -> Result<TypeRecord> {
        let start = reader.pos();
        let end = start.saturating_add(length);

        let record = match TypeLeafKind::from_repr(kind) {
            Some(TypeLeafKind::LF_MODIFIER) => TypeRecord::Modifier(ModifierRecord::read(reader)?),
            Some(TypeLeafKind::LF_POINTER) => TypeRecord::Pointer(PointerRecord::read(reader)?),
            Some(TypeLeafKind::LF_PROCEDURE) => {
                TypeRecord::Procedure(ProcedureRecord::read(reader)?)
            }
            Some(TypeLeafKind::LF_MFUNCTION) => {
                TypeRecord::MemberFunction(MemberFunctionRecord::read(reader)?)
            }
            Some(TypeLeafKind::LF_LABEL) => TypeRecord::Label(LabelRecord::read(reader)?),
            Some(TypeLeafKind::LF_ARGLIST) => {
                TypeRecord::ArgumentList(ArgumentListRecord::read(reader)?)
            }
            Some(TypeLeafKind::LF_SUBSTR_LIST) => {
                TypeRecord::StringList(ArgumentListRecord::read(reader)?)
            }
            Some(TypeLeafKind::LF_FIELDLIST) => {
                TypeRecord::FieldList(FieldListRecord::read(reader, length)?)
            }
            Some(TypeLeafKind::LF_BITFIELD) => TypeRecord::BitField(BitFieldRecord::read(reader)?),
            Some(TypeLeafKind::LF_METHODLIST) => {
                TypeRecord::MethodOverloadList(MethodOverloadListRecord::read(reader, length)?)
            }
            Some(TypeLeafKind::LF_ARRAY) => TypeRecord::Array(ArrayRecord::read(reader)?),
            Some(
                leaf @ (TypeLeafKind::LF_CLASS
                | TypeLeafKind::LF_STRUCTURE
                | TypeLeafKind::LF_INTERFACE),
            ) => TypeRecord::Class {
                kind: leaf,
                record: ClassRecord::read(reader)?,
            },
            Some(TypeLeafKind::LF_UNION) => TypeRecord::Union(UnionRecord::read(reader)?),
            Some(TypeLeafKind::LF_ENUM) => TypeRecord::Enum(EnumRecord::read(reader)?),
            Some(TypeLeafKind::LF_VTSHAPE) => {
                TypeRecord::VirtualFunctionTableShape(VirtualFunctionTableShapeRecord::read(reader)?)
            }
            Some(TypeLeafKind::LF_VFTABLE) => {
                TypeRecord::VirtualFunctionTable(VirtualFunctionTableRecord::read(reader)?)
            }
            Some(TypeLeafKind::LF_NESTTYPE) => {
                TypeRecord::NestedType(NestedTypeRecord::read(reader)?)
            }
            Some(TypeLeafKind::LF_FUNC_ID) => TypeRecord::FuncId(FuncIdRecord::read(reader)?),
            Some(TypeLeafKind::LF_MFUNC_ID) => {
                TypeRecord::MemberFuncId(MemberFuncIdRecord::read(reader)?)
            }
            Some(TypeLeafKind::LF_STRING_ID) => TypeRecord::StringId(StringIdRecord::read(reader)?),
            Some(TypeLeafKind::LF_BUILDINFO) => {
                TypeRecord::BuildInfo(BuildInfoRecord::read(reader)?)
            }
            Some(TypeLeafKind::LF_UDT_SRC_LINE) => {
                TypeRecord::UdtSourceLine(UdtSourceLineRecord::read(reader)?)
            }
            Some(TypeLeafKind::LF_UDT_MOD_SRC_LINE) => {
                TypeRecord::UdtModuleSourceLine(UdtSourceLineRecord::read_with_module(reader)?)
            }
            _ => match policy {
                UnknownRecordPolicy::Fail => return Err(Error::UnknownTypeRecord(kind)),
                UnknownRecordPolicy::Preserve => TypeRecord::Unknown {
                    kind,
                    data: reader.read_byte_array(length)?,
                },
            },
        };

        let position = reader.pos();
        if position + RECORD_PREFIX_SIZE < end || position > end {
            return Err(malformed_error!(
                "Record 0x{:04x} decoded {} of {} bytes",
                kind,
                position - start,
                length
            ));
        }

        Ok(record)
    }

    /// The leaf kind of the record, `None` for [`TypeRecord::Unknown`]
    #[must_use]
    pub fn kind(&self) -> Option<TypeLeafKind> {
        let kind = match self {
            TypeRecord::Class { kind, .. } => *kind,
            TypeRecord::Union(_) => TypeLeafKind::LF_UNION,
            TypeRecord::Enum(_) => TypeLeafKind::LF_ENUM,
            TypeRecord::Array(_) => TypeLeafKind::LF_ARRAY,
            TypeRecord::Pointer(_) => TypeLeafKind::LF_POINTER,
            TypeRecord::Modifier(_) => TypeLeafKind::LF_MODIFIER,
            TypeRecord::Procedure(_) => TypeLeafKind::LF_PROCEDURE,
            TypeRecord::MemberFunction(_) => TypeLeafKind::LF_MFUNCTION,
            TypeRecord::ArgumentList(_) => TypeLeafKind::LF_ARGLIST,
            TypeRecord::StringList(_) => TypeLeafKind::LF_SUBSTR_LIST,
            TypeRecord::FieldList(_) => TypeLeafKind::LF_FIELDLIST,
            TypeRecord::BitField(_) => TypeLeafKind::LF_BITFIELD,
            TypeRecord::MethodOverloadList(_) => TypeLeafKind::LF_METHODLIST,
            TypeRecord::VirtualFunctionTableShape(_) => TypeLeafKind::LF_VTSHAPE,
            TypeRecord::VirtualFunctionTable(_) => TypeLeafKind::LF_VFTABLE,
            TypeRecord::Label(_) => TypeLeafKind::LF_LABEL,
            TypeRecord::NestedType(_) => TypeLeafKind::LF_NESTTYPE,
            TypeRecord::FuncId(_) => TypeLeafKind::LF_FUNC_ID,
            TypeRecord::MemberFuncId(_) => TypeLeafKind::LF_MFUNC_ID,
            TypeRecord::StringId(_) => TypeLeafKind::LF_STRING_ID,
            TypeRecord::BuildInfo(_) => TypeLeafKind::LF_BUILDINFO,
            TypeRecord::UdtSourceLine(_) => TypeLeafKind::LF_UDT_SRC_LINE,
            TypeRecord::UdtModuleSourceLine(_) => TypeLeafKind::LF_UDT_MOD_SRC_LINE,
            TypeRecord::Unknown { .. } => return None,
        };
        Some(kind)
    }

    /// The tag record accessors for classes, unions and enums
    #[must_use]
    pub fn as_tag(&self) -> Option<&dyn TagRecord> {
        match self {
            TypeRecord::Class { record, .. } => Some(record),
            TypeRecord::Union(record) => Some(record),
            TypeRecord::Enum(record) => Some(record),
            _ => None,
        }
    }

    /// The single type a modifier, pointer, array, bitfield or enum record builds on
    #[must_use]
    pub fn referenced_type(&self) -> Option<TypeIndex> {
        match self {
            TypeRecord::Modifier(record) => Some(record.modified_type),
            TypeRecord::Pointer(record) => Some(record.referent_type),
            TypeRecord::Array(record) => Some(record.element_type),
            TypeRecord::BitField(record) => Some(record.field_type),
            TypeRecord::Enum(record) => Some(record.underlying_type),
            _ => None,
        }
    }
}
