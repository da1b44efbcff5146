//! Records of the IPI stream.
//!
//! Id records describe functions, build environments and source locations rather than types.
//! They reference types through [`TypeIndex`] and other id records through the same index
//! space of the IPI stream.

use crate::{file::reader::BinaryReader, tpi::TypeIndex, Result};

/// `LF_FUNC_ID`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncIdRecord {
    /// Enclosing scope, an `LF_STRING_ID` or [`TypeIndex::NONE`]
    pub parent_scope: TypeIndex,
    /// Signature
    pub function_type: TypeIndex,
    /// Function name
    pub name: String,
}

impl FuncIdRecord {
    /// Decodes the record body.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on truncated input.
    pub fn read<R: BinaryReader + ?Sized>(reader: &mut R) -> Result<FuncIdRecord> {
        Ok(FuncIdRecord {
            parent_scope: reader.read_le::<TypeIndex>()?,
            function_type: reader.read_le::<TypeIndex>()?,
            name: reader.read_cstring()?,
        })
    }
}

/// `LF_MFUNC_ID`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberFuncIdRecord {
    /// Owning class
    pub class_type: TypeIndex,
    /// Signature
    pub function_type: TypeIndex,
    /// Method name
    pub name: String,
}

impl MemberFuncIdRecord {
    /// Decodes the record body.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on truncated input.
    pub fn read<R: BinaryReader + ?Sized>(reader: &mut R) -> Result<MemberFuncIdRecord> {
        Ok(MemberFuncIdRecord {
            class_type: reader.read_le::<TypeIndex>()?,
            function_type: reader.read_le::<TypeIndex>()?,
            name: reader.read_cstring()?,
        })
    }
}

/// `LF_STRING_ID`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringIdRecord {
    /// `LF_SUBSTR_LIST` with a continuation, or [`TypeIndex::NONE`]
    pub id: TypeIndex,
    /// The string
    pub string: String,
}

impl StringIdRecord {
    /// Decodes the record body.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on truncated input.
    pub fn read<R: BinaryReader + ?Sized>(reader: &mut R) -> Result<StringIdRecord> {
        Ok(StringIdRecord {
            id: reader.read_le::<TypeIndex>()?,
            string: reader.read_cstring()?,
        })
    }
}

/// `LF_BUILDINFO`
///
/// The arguments are `LF_STRING_ID` records for, in order: current directory, build tool,
/// source file, program database and command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfoRecord {
    /// The listed ids
    pub arguments: Vec<TypeIndex>,
}

impl BuildInfoRecord {
    /// Decodes the record body.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the count exceeds the available data.
    pub fn read<R: BinaryReader + ?Sized>(reader: &mut R) -> Result<BuildInfoRecord> {
        let count = reader.read_le::<u16>()?;
        let arguments = reader
            .read_u32_array(count as usize)?
            .into_iter()
            .map(TypeIndex)
            .collect();
        Ok(BuildInfoRecord { arguments })
    }
}

/// `LF_UDT_SRC_LINE` and `LF_UDT_MOD_SRC_LINE`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UdtSourceLineRecord {
    /// The user defined type
    pub udt: TypeIndex,
    /// `LF_STRING_ID` of the file name, or a string table offset for the module variant
    pub source_file: TypeIndex,
    /// Line number
    pub line: u32,
    /// Contributing module, only present for `LF_UDT_MOD_SRC_LINE`
    pub module: Option<u16>,
}

impl UdtSourceLineRecord {
    /// Decodes an `LF_UDT_SRC_LINE` body.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on truncated input.
    pub fn read<R: BinaryReader + ?Sized>(reader: &mut R) -> Result<UdtSourceLineRecord> {
        Ok(UdtSourceLineRecord {
            udt: reader.read_le::<TypeIndex>()?,
            source_file: reader.read_le::<TypeIndex>()?,
            line: reader.read_le::<u32>()?,
            module: None,
        })
    }

    /// Decodes an `LF_UDT_MOD_SRC_LINE` body.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on truncated input.
    pub fn read_with_module<R: BinaryReader + ?Sized>(
        reader: &mut R,
    ) -> Result<UdtSourceLineRecord> {
        let mut record = Self::read(reader)?;
        record.module = Some(reader.read_le::<u16>()?);
        Ok(record)
    }
}
