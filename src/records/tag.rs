//! User defined type records: classes, structures, interfaces, unions and enums.
//!
//! All of them share a property word ([`ClassOptions`]) and a name, optionally followed by a
//! decorated unique name. Forward declarations carry [`ClassOptions::FORWARD_REFERENCE`] and
//! no usable member list; they are reconciled with their definition through the unique name.

use crate::{
    file::reader::BinaryReader,
    records::attributes::{ClassOptions, HfaKind, WindowsRtClassKind},
    tpi::TypeIndex,
    Result,
};

fn read_names<R: BinaryReader + ?Sized>(
    reader: &mut R,
    properties: u16,
) -> Result<(String, Option<String>)> {
    let name = reader.read_cstring()?;
    let unique_name = if ClassOptions::from_bits_truncate(properties)
        .contains(ClassOptions::HAS_UNIQUE_NAME)
    {
        Some(reader.read_cstring()?)
    } else {
        None
    };
    Ok((name, unique_name))
}

/// Accessors shared by every tag record
pub trait TagRecord {
    /// Raw property word
    fn properties(&self) -> u16;

    /// Plain name
    fn name(&self) -> &str;

    /// Decorated name, present when [`ClassOptions::HAS_UNIQUE_NAME`] is set
    fn unique_name(&self) -> Option<&str>;

    /// Member list
    fn field_list(&self) -> TypeIndex;

    /// Decoded property flags
    fn options(&self) -> ClassOptions {
        ClassOptions::from_bits_truncate(self.properties())
    }

    /// Returns `true` for forward declarations
    fn is_forward_reference(&self) -> bool {
        self.options().contains(ClassOptions::FORWARD_REFERENCE)
    }

    /// Returns `true` if a decorated name follows the name
    fn has_unique_name(&self) -> bool {
        self.options().contains(ClassOptions::HAS_UNIQUE_NAME)
    }

    /// Returns `true` for nested types
    fn is_nested(&self) -> bool {
        self.options().contains(ClassOptions::NESTED)
    }

    /// Homogeneous floating point aggregate kind
    fn hfa(&self) -> HfaKind {
        ClassOptions::hfa(self.properties())
    }

    /// WinRT class kind
    fn mocom(&self) -> WindowsRtClassKind {
        ClassOptions::mocom(self.properties())
    }
}

/// `LF_CLASS`, `LF_STRUCTURE` and `LF_INTERFACE`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRecord {
    /// Number of members
    pub member_count: u16,
    /// Raw [`ClassOptions`]
    pub properties: u16,
    /// Member list
    pub field_list: TypeIndex,
    /// Derivation list, unused by MSVC
    pub derivation_list: TypeIndex,
    /// Virtual function table shape
    pub vtable_shape: TypeIndex,
    /// Size in bytes
    pub size: u64,
    /// Plain name
    pub name: String,
    /// Decorated name
    pub unique_name: Option<String>,
}

impl ClassRecord {
    /// Decodes the record body.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on truncated input and
    /// [`crate::Error::UnsupportedNumeric`] for a non-integer size.
    pub fn read<R: BinaryReader + ?Sized>(reader: &mut R) -> Result<ClassRecord> {
        let member_count = reader.read_le::<u16>()?;
        let properties = reader.read_le::<u16>()?;
        let field_list = reader.read_le::<TypeIndex>()?;
        let derivation_list = reader.read_le::<TypeIndex>()?;
        let vtable_shape = reader.read_le::<TypeIndex>()?;
        let size = reader.read_numeric()?.as_u64();
        let (name, unique_name) = read_names(reader, properties)?;

        Ok(ClassRecord {
            member_count,
            properties,
            field_list,
            derivation_list,
            vtable_shape,
            size,
            name,
            unique_name,
        })
    }
}

impl TagRecord for ClassRecord {
    fn properties(&self) -> u16 {
        self.properties
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn unique_name(&self) -> Option<&str> {
        self.unique_name.as_deref()
    }

    fn field_list(&self) -> TypeIndex {
        self.field_list
    }
}

/// `LF_UNION`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionRecord {
    /// Number of members
    pub member_count: u16,
    /// Raw [`ClassOptions`]
    pub properties: u16,
    /// Member list
    pub field_list: TypeIndex,
    /// Size in bytes
    pub size: u64,
    /// Plain name
    pub name: String,
    /// Decorated name
    pub unique_name: Option<String>,
}

impl UnionRecord {
    /// Decodes the record body.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on truncated input and
    /// [`crate::Error::UnsupportedNumeric`] for a non-integer size.
    pub fn read<R: BinaryReader + ?Sized>(reader: &mut R) -> Result<UnionRecord> {
        let member_count = reader.read_le::<u16>()?;
        let properties = reader.read_le::<u16>()?;
        let field_list = reader.read_le::<TypeIndex>()?;
        let size = reader.read_numeric()?.as_u64();
        let (name, unique_name) = read_names(reader, properties)?;

        Ok(UnionRecord {
            member_count,
            properties,
            field_list,
            size,
            name,
            unique_name,
        })
    }
}

impl TagRecord for UnionRecord {
    fn properties(&self) -> u16 {
        self.properties
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn unique_name(&self) -> Option<&str> {
        self.unique_name.as_deref()
    }

    fn field_list(&self) -> TypeIndex {
        self.field_list
    }
}

/// `LF_ENUM`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumRecord {
    /// Number of enumerators
    pub member_count: u16,
    /// Raw [`ClassOptions`]
    pub properties: u16,
    /// Underlying integer type
    pub underlying_type: TypeIndex,
    /// Enumerator list
    pub field_list: TypeIndex,
    /// Plain name
    pub name: String,
    /// Decorated name
    pub unique_name: Option<String>,
}

impl EnumRecord {
    /// Decodes the record body.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on truncated input.
    pub fn read<R: BinaryReader + ?Sized>(reader: &mut R) -> Result<EnumRecord> {
        let member_count = reader.read_le::<u16>()?;
        let properties = reader.read_le::<u16>()?;
        let underlying_type = reader.read_le::<TypeIndex>()?;
        let field_list = reader.read_le::<TypeIndex>()?;
        let (name, unique_name) = read_names(reader, properties)?;

        Ok(EnumRecord {
            member_count,
            properties,
            underlying_type,
            field_list,
            name,
            unique_name,
        })
    }
}

impl TagRecord for EnumRecord {
    fn properties(&self) -> u16 {
        self.properties
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn unique_name(&self) -> Option<&str> {
        self.unique_name.as_deref()
    }

    fn field_list(&self) -> TypeIndex {
        self.field_list
    }
}
