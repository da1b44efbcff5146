//! Modifiers, arrays, bit fields, method overload lists and virtual table shapes.

use crate::{
    file::reader::BinaryReader,
    records::attributes::{MemberAttributes, ModifierOptions},
    tpi::TypeIndex,
    Result,
};

/// `LF_MODIFIER`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifierRecord {
    /// The qualified type
    pub modified_type: TypeIndex,
    /// Qualifiers
    pub modifiers: ModifierOptions,
}

impl ModifierRecord {
    /// Decodes the record body.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on truncated input.
    pub fn read<R: BinaryReader + ?Sized>(reader: &mut R) -> Result<ModifierRecord> {
        Ok(ModifierRecord {
            modified_type: reader.read_le::<TypeIndex>()?,
            modifiers: ModifierOptions::from_bits_truncate(reader.read_le::<u16>()?),
        })
    }
}

/// `LF_ARRAY`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayRecord {
    /// Element type
    pub element_type: TypeIndex,
    /// Type of the subscript
    pub index_type: TypeIndex,
    /// Total size in bytes
    pub size: u64,
    /// Name, usually empty
    pub name: String,
}

impl ArrayRecord {
    /// Decodes the record body.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on truncated input and
    /// [`crate::Error::UnsupportedNumeric`] for a non-integer size.
    pub fn read<R: BinaryReader + ?Sized>(reader: &mut R) -> Result<ArrayRecord> {
        Ok(ArrayRecord {
            element_type: reader.read_le::<TypeIndex>()?,
            index_type: reader.read_le::<TypeIndex>()?,
            size: reader.read_numeric()?.as_u64(),
            name: reader.read_cstring()?,
        })
    }
}

/// `LF_BITFIELD`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitFieldRecord {
    /// Underlying integer type
    pub field_type: TypeIndex,
    /// Width in bits
    pub bit_size: u8,
    /// Position of the lowest bit
    pub bit_offset: u8,
}

impl BitFieldRecord {
    /// Decodes the record body.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on truncated input.
    pub fn read<R: BinaryReader + ?Sized>(reader: &mut R) -> Result<BitFieldRecord> {
        Ok(BitFieldRecord {
            field_type: reader.read_le::<TypeIndex>()?,
            bit_size: reader.read_le::<u8>()?,
            bit_offset: reader.read_le::<u8>()?,
        })
    }
}

/// One overload of an `LF_METHODLIST`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneMethodEntry {
    /// Member attributes
    pub attributes: MemberAttributes,
    /// Signature
    pub method_type: TypeIndex,
    /// Offset in the virtual function table, present for introducing virtual methods
    pub vftable_offset: Option<u32>,
}

/// `LF_METHODLIST`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodOverloadListRecord {
    /// The overloads
    pub methods: Vec<OneMethodEntry>,
}

impl MethodOverloadListRecord {
    /// Decodes `length` bytes of record body.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if an entry extends past the body.
    pub fn read<R: BinaryReader + ?Sized>(
        reader: &mut R,
        length: usize,
    ) -> Result<MethodOverloadListRecord> {
        let end = reader.pos().saturating_add(length);
        let mut methods = Vec::new();

        while reader.pos() < end {
            let attributes = MemberAttributes(reader.read_le::<u16>()?);
            reader.skip(2)?;
            let method_type = reader.read_le::<TypeIndex>()?;
            let vftable_offset = if attributes.is_introducing_virtual() {
                Some(reader.read_le::<u32>()?)
            } else {
                None
            };

            methods.push(OneMethodEntry {
                attributes,
                method_type,
                vftable_offset,
            });
        }

        Ok(MethodOverloadListRecord { methods })
    }
}

/// Entry of a virtual function table shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum VirtualTableSlotKind {
    Near16,
    Far16,
    This,
    Outer,
    Meta,
    Near,
    Far,
    Unknown(u8),
}

impl From<u8> for VirtualTableSlotKind {
    fn from(value: u8) -> Self {
        match value {
            0 => VirtualTableSlotKind::Near16,
            1 => VirtualTableSlotKind::Far16,
            2 => VirtualTableSlotKind::This,
            3 => VirtualTableSlotKind::Outer,
            4 => VirtualTableSlotKind::Meta,
            5 => VirtualTableSlotKind::Near,
            6 => VirtualTableSlotKind::Far,
            other => VirtualTableSlotKind::Unknown(other),
        }
    }
}

/// `LF_VTSHAPE`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualFunctionTableShapeRecord {
    /// One descriptor per slot
    pub slots: Vec<VirtualTableSlotKind>,
}

impl VirtualFunctionTableShapeRecord {
    /// Decodes the record body. Descriptors are packed two per byte, low nibble first.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on truncated input.
    pub fn read<R: BinaryReader + ?Sized>(
        reader: &mut R,
    ) -> Result<VirtualFunctionTableShapeRecord> {
        let count = reader.read_le::<u16>()? as usize;
        let packed = reader.read_byte_array(count.div_ceil(2))?;

        let slots = (0..count)
            .map(|slot| {
                let byte = packed[slot / 2];
                let nibble = if slot % 2 == 0 { byte & 0x0F } else { byte >> 4 };
                VirtualTableSlotKind::from(nibble)
            })
            .collect();

        Ok(VirtualFunctionTableShapeRecord { slots })
    }
}

/// `LF_VFTABLE`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualFunctionTableRecord {
    /// The class owning the table
    pub complete_class: TypeIndex,
    /// The table this one overrides
    pub overridden_vftable: TypeIndex,
    /// Offset of the vfptr in the class
    pub vfptr_offset: u32,
    /// Table name followed by the method names
    pub names: Vec<String>,
}

impl VirtualFunctionTableRecord {
    /// Decodes the record body.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the name block extends past the body.
    pub fn read<R: BinaryReader + ?Sized>(reader: &mut R) -> Result<VirtualFunctionTableRecord> {
        let complete_class = reader.read_le::<TypeIndex>()?;
        let overridden_vftable = reader.read_le::<TypeIndex>()?;
        let vfptr_offset = reader.read_le::<u32>()?;
        let names_length = reader.read_le::<u32>()? as usize;

        let end = reader.pos().saturating_add(names_length);
        if end > reader.len() {
            return Err(out_of_bounds_error!());
        }

        let mut names = Vec::new();
        while reader.pos() < end {
            names.push(reader.read_cstring()?);
        }

        Ok(VirtualFunctionTableRecord {
            complete_class,
            overridden_vftable,
            vfptr_offset,
            names,
        })
    }
}

/// `LF_LABEL`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRecord {
    /// 0 for near, 4 for far
    pub mode: u16,
}

impl LabelRecord {
    /// Decodes the record body.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on truncated input.
    pub fn read<R: BinaryReader + ?Sized>(reader: &mut R) -> Result<LabelRecord> {
        Ok(LabelRecord {
            mode: reader.read_le::<u16>()?,
        })
    }
}
