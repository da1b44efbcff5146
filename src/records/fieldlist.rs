//! `LF_FIELDLIST` and the member records it contains.
//!
//! A field list is a concatenation of member records, each introduced by its own `u16` leaf.
//! Members are padded to 4 bytes with `LF_PADn` bytes (`0xF0 | n`), where `n` counts the pad
//! byte itself. Long lists are split across several records joined by `LF_INDEX`.

use crate::{
    file::{numeric::Numeric, reader::BinaryReader},
    records::{attributes::MemberAttributes, kind::TypeLeafKind},
    tpi::TypeIndex,
    Error, Result,
};

/// `LF_MEMBER`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataMemberRecord {
    /// Member attributes
    pub attributes: MemberAttributes,
    /// Member type, possibly an `LF_BITFIELD`
    pub field_type: TypeIndex,
    /// Offset from the start of the enclosing type
    pub offset: u64,
    /// Member name
    pub name: String,
}

/// `LF_STMEMBER`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticDataMemberRecord {
    /// Member attributes
    pub attributes: MemberAttributes,
    /// Member type
    pub field_type: TypeIndex,
    /// Member name
    pub name: String,
}

/// `LF_BCLASS` and `LF_BINTERFACE`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseClassRecord {
    /// `LF_BCLASS` or `LF_BINTERFACE`
    pub kind: TypeLeafKind,
    /// Member attributes
    pub attributes: MemberAttributes,
    /// The base type
    pub base_type: TypeIndex,
    /// Offset of the base subobject
    pub offset: u64,
}

/// `LF_VBCLASS` and `LF_IVBCLASS`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualBaseClassRecord {
    /// `LF_VBCLASS` or `LF_IVBCLASS`
    pub kind: TypeLeafKind,
    /// Member attributes
    pub attributes: MemberAttributes,
    /// The base type
    pub base_type: TypeIndex,
    /// Type of the virtual base pointer
    pub vbptr_type: TypeIndex,
    /// Offset of the virtual base pointer from the address point
    pub vbptr_offset: u64,
    /// Index into the virtual base displacement table
    pub vtable_index: u64,
}

impl VirtualBaseClassRecord {
    /// Returns `true` for indirect virtual bases
    #[must_use]
    pub fn is_indirect(&self) -> bool {
        self.kind == TypeLeafKind::LF_IVBCLASS
    }
}

/// `LF_ENUMERATE`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumeratorRecord {
    /// Member attributes
    pub attributes: MemberAttributes,
    /// Value
    pub value: Numeric,
    /// Name
    pub name: String,
}

/// `LF_ONEMETHOD`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneMethodRecord {
    /// Member attributes
    pub attributes: MemberAttributes,
    /// Signature
    pub method_type: TypeIndex,
    /// Offset in the virtual function table, present for introducing virtual methods
    pub vftable_offset: Option<u32>,
    /// Name
    pub name: String,
}

/// `LF_METHOD`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverloadedMethodRecord {
    /// Number of overloads
    pub count: u16,
    /// `LF_METHODLIST` with the overloads
    pub method_list: TypeIndex,
    /// Name
    pub name: String,
}

/// `LF_VFUNCTAB`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualFunctionPointerRecord {
    /// Type of the vfptr
    pub pointer_type: TypeIndex,
}

/// `LF_INDEX`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListContinuationRecord {
    /// The next `LF_FIELDLIST` of the chain
    pub continuation: TypeIndex,
}

/// `LF_NESTTYPE`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedTypeRecord {
    /// The nested type
    pub nested_type: TypeIndex,
    /// Name inside the enclosing type
    pub name: String,
}

impl NestedTypeRecord {
    /// Decodes the record body.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on truncated input.
    pub fn read<R: BinaryReader + ?Sized>(reader: &mut R) -> Result<NestedTypeRecord> {
        reader.skip(2)?;
        Ok(NestedTypeRecord {
            nested_type: reader.read_le::<TypeIndex>()?,
            name: reader.read_cstring()?,
        })
    }
}

/// A member of a field list
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum MemberRecord {
    DataMember(DataMemberRecord),
    StaticDataMember(StaticDataMemberRecord),
    BaseClass(BaseClassRecord),
    VirtualBaseClass(VirtualBaseClassRecord),
    Enumerator(EnumeratorRecord),
    OneMethod(OneMethodRecord),
    OverloadedMethod(OverloadedMethodRecord),
    VirtualFunctionPointer(VirtualFunctionPointerRecord),
    ListContinuation(ListContinuationRecord),
    NestedType(NestedTypeRecord),
}

impl MemberRecord {
    /// Decodes one member, including its leaf.
    ///
    /// # Errors
    /// Returns [`crate::Error::UnknownTypeRecord`] for a leaf that is not a member kind, and
    /// [`crate::Error::OutOfBounds`] on truncated input.
    pub fn read<R: BinaryReader + ?Sized>(reader: &mut R) -> Result<MemberRecord> {
        let leaf = reader.read_le::<u16>()?;
        let Some(kind) = TypeLeafKind::from_repr(leaf) else {
            return Err(Error::UnknownTypeRecord(leaf));
        };

        let member = match kind {
            TypeLeafKind::LF_MEMBER => MemberRecord::DataMember(DataMemberRecord {
                attributes: MemberAttributes(reader.read_le::<u16>()?),
                field_type: reader.read_le::<TypeIndex>()?,
                offset: reader.read_numeric()?.as_u64(),
                name: reader.read_cstring()?,
            }),
            TypeLeafKind::LF_STMEMBER => MemberRecord::StaticDataMember(StaticDataMemberRecord {
                attributes: MemberAttributes(reader.read_le::<u16>()?),
                field_type: reader.read_le::<TypeIndex>()?,
                name: reader.read_cstring()?,
            }),
            TypeLeafKind::LF_BCLASS | TypeLeafKind::LF_BINTERFACE => {
                MemberRecord::BaseClass(BaseClassRecord {
                    kind,
                    attributes: MemberAttributes(reader.read_le::<u16>()?),
                    base_type: reader.read_le::<TypeIndex>()?,
                    offset: reader.read_numeric()?.as_u64(),
                })
            }
            TypeLeafKind::LF_VBCLASS | TypeLeafKind::LF_IVBCLASS => {
                MemberRecord::VirtualBaseClass(VirtualBaseClassRecord {
                    kind,
                    attributes: MemberAttributes(reader.read_le::<u16>()?),
                    base_type: reader.read_le::<TypeIndex>()?,
                    vbptr_type: reader.read_le::<TypeIndex>()?,
                    vbptr_offset: reader.read_numeric()?.as_u64(),
                    vtable_index: reader.read_numeric()?.as_u64(),
                })
            }
            TypeLeafKind::LF_ENUMERATE => MemberRecord::Enumerator(EnumeratorRecord {
                attributes: MemberAttributes(reader.read_le::<u16>()?),
                value: reader.read_numeric()?,
                name: reader.read_cstring()?,
            }),
            TypeLeafKind::LF_ONEMETHOD => {
                let attributes = MemberAttributes(reader.read_le::<u16>()?);
                let method_type = reader.read_le::<TypeIndex>()?;
                let vftable_offset = if attributes.is_introducing_virtual() {
                    Some(reader.read_le::<u32>()?)
                } else {
                    None
                };
                MemberRecord::OneMethod(OneMethodRecord {
                    attributes,
                    method_type,
                    vftable_offset,
                    name: reader.read_cstring()?,
                })
            }
            TypeLeafKind::LF_METHOD => MemberRecord::OverloadedMethod(OverloadedMethodRecord {
                count: reader.read_le::<u16>()?,
                method_list: reader.read_le::<TypeIndex>()?,
                name: reader.read_cstring()?,
            }),
            TypeLeafKind::LF_VFUNCTAB => {
                reader.skip(2)?;
                MemberRecord::VirtualFunctionPointer(VirtualFunctionPointerRecord {
                    pointer_type: reader.read_le::<TypeIndex>()?,
                })
            }
            TypeLeafKind::LF_INDEX => {
                reader.skip(2)?;
                MemberRecord::ListContinuation(ListContinuationRecord {
                    continuation: reader.read_le::<TypeIndex>()?,
                })
            }
            TypeLeafKind::LF_NESTTYPE => MemberRecord::NestedType(NestedTypeRecord::read(reader)?),
            _ => return Err(Error::UnknownTypeRecord(leaf)),
        };

        Ok(member)
    }

    /// Name of the member, empty for members without one
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            MemberRecord::DataMember(member) => &member.name,
            MemberRecord::StaticDataMember(member) => &member.name,
            MemberRecord::Enumerator(member) => &member.name,
            MemberRecord::OneMethod(member) => &member.name,
            MemberRecord::OverloadedMethod(member) => &member.name,
            MemberRecord::NestedType(member) => &member.name,
            MemberRecord::BaseClass(_)
            | MemberRecord::VirtualBaseClass(_)
            | MemberRecord::VirtualFunctionPointer(_)
            | MemberRecord::ListContinuation(_) => "",
        }
    }
}

/// `LF_FIELDLIST`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldListRecord {
    /// Members in declaration order
    pub fields: Vec<MemberRecord>,
}

impl FieldListRecord {
    /// Decodes `length` bytes of record body.
    ///
    /// # Errors
    /// Returns [`crate::Error::UnknownTypeRecord`] for members of unknown kind, and
    /// [`crate::Error::OutOfBounds`] if a member extends past the available data.
    pub fn read<R: BinaryReader + ?Sized>(reader: &mut R, length: usize) -> Result<FieldListRecord> {
        let end = reader.pos().saturating_add(length);
        let mut fields = Vec::new();

        while reader.pos() < end {
            fields.push(MemberRecord::read(reader)?);

            if reader.pos() < end {
                let padding = reader.read_le::<u8>()?;
                if padding > 0xF0 {
                    let skip = (padding & 0x0F).saturating_sub(1);
                    reader.skip(skip as usize)?;
                } else {
                    reader.seek(reader.pos() - 1)?;
                }
            }
        }

        Ok(FieldListRecord { fields })
    }

    /// The `LF_INDEX` target, if this list is continued in another record
    #[must_use]
    pub fn continuation(&self) -> Option<TypeIndex> {
        self.fields.iter().find_map(|field| match field {
            MemberRecord::ListContinuation(next) if !next.continuation.is_none() => {
                Some(next.continuation)
            }
            _ => None,
        })
    }
}
