//! Data members of classes, structures, unions and the global scope.

use crate::{
    file::numeric::Numeric,
    module::{
        symbol::{PdbSymbol, SymbolId, SymbolTag},
        PdbModule,
    },
    records::{DataMemberRecord, StaticDataMemberRecord, TypeRecord},
    symbols::{ConstantSymbol, DataSymbol},
    tpi::TypeIndex,
    Error, Result,
};

/// Where the value of a field lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationType {
    /// At an offset from the start of the enclosing object
    ThisRel,
    /// A bit range inside the storage unit at the field offset
    BitField,
    /// In static storage
    Static,
    /// A compile time constant, see [`PdbSymbolField::value`]
    Constant,
}

/// Whether a field belongs to every instance or to the type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    /// Instance member
    Member,
    /// Static member or global
    StaticMember,
}

/// A data member of a [`PdbSymbol`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdbSymbolField {
    /// The symbol declaring the field
    pub parent: SymbolId,
    /// Member name
    pub name: String,
    /// Member type, the underlying type for bit fields
    pub type_id: TypeIndex,
    /// Offset from the start of the enclosing object
    pub offset: u32,
    /// Size in bytes, 0 for bit fields
    pub size: u32,
    /// First bit of a bit field
    pub bit_position: u32,
    /// Number of bits of a bit field
    pub bit_size: u32,
    /// Storage of the value
    pub location_type: LocationType,
    /// Instance or static
    pub data_kind: DataKind,
    /// Value of constants
    pub value: Option<Numeric>,
}

impl PdbSymbolField {
    fn new(parent: &PdbSymbol, name: &str, type_id: TypeIndex, location_type: LocationType) -> Self {
        PdbSymbolField {
            parent: parent.handle(),
            name: name.to_string(),
            type_id,
            offset: 0,
            size: 0,
            bit_position: 0,
            bit_size: 0,
            location_type,
            data_kind: DataKind::StaticMember,
            value: None,
        }
    }

    pub(crate) fn data_member(
        module: &PdbModule,
        parent: &PdbSymbol,
        member: &DataMemberRecord,
    ) -> Result<PdbSymbolField> {
        let mut field = Self::new(parent, &member.name, member.field_type, LocationType::ThisRel);
        field.data_kind = DataKind::Member;
        field.offset = u32::try_from(member.offset).map_err(|_| {
            Error::InvalidArgument(format!("Offset of {} exceeds 32 bits", member.name))
        })?;

        let bit_field = if member.field_type.is_simple() {
            None
        } else {
            match module.file().tpi()?.record(member.field_type)? {
                TypeRecord::BitField(bits) => Some(bits),
                _ => None,
            }
        };

        match bit_field {
            Some(bits) => {
                field.location_type = LocationType::BitField;
                field.type_id = bits.field_type;
                field.bit_position = u32::from(bits.bit_offset);
                field.bit_size = u32::from(bits.bit_size);
            }
            None => field.size = module.get_symbol_by_index(field.type_id)?.size,
        }

        Ok(field)
    }

    pub(crate) fn static_member(
        module: &PdbModule,
        parent: &PdbSymbol,
        member: &StaticDataMemberRecord,
    ) -> Result<PdbSymbolField> {
        let mut field = Self::new(parent, &member.name, member.field_type, LocationType::Static);
        field.size = module.get_symbol_by_index(field.type_id)?.size;

        let constants = module.constants()?;
        let constant = constants
            .get(&format!("{}::{}", parent.name, member.name))
            .or_else(|| constants.get(&format!("{}.{}", parent.name, member.name)));
        if let Some(constant) = constant.filter(|constant| constant.type_index == member.field_type) {
            field.location_type = LocationType::Constant;
            field.value = Some(constant.value);
        }

        Ok(field)
    }

    pub(crate) fn global_constant(
        module: &PdbModule,
        scope: &PdbSymbol,
        constant: &ConstantSymbol,
    ) -> Result<PdbSymbolField> {
        let mut field =
            Self::new(scope, &constant.name, constant.type_index, LocationType::Constant);
        field.size = module.get_symbol_by_index(field.type_id)?.size;
        field.value = Some(constant.value);
        Ok(field)
    }

    pub(crate) fn global_data(
        module: &PdbModule,
        scope: &PdbSymbol,
        data: &DataSymbol,
    ) -> Result<PdbSymbolField> {
        let mut field = Self::new(scope, &data.name, data.type_index, LocationType::Static);
        field.size = module.get_symbol_by_index(field.type_id)?.size;
        Ok(field)
    }

    /// Returns `true` for static members, globals and constants
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.data_kind == DataKind::StaticMember
    }

    /// Returns `true` if the field has storage that can be located: a static member with a
    /// public `Parent::Name` symbol, or any member of the global scope.
    ///
    /// # Errors
    /// Returns an error if the global symbol stream cannot be read.
    pub fn is_valid_static(&self, module: &PdbModule) -> Result<bool> {
        if !self.is_static() {
            return Ok(false);
        }

        let parent = module.symbol(self.parent);
        if parent.tag == SymbolTag::ModuleGlobals {
            return Ok(true);
        }

        Ok(module
            .public_symbols()?
            .contains(&format!("{}::{}", parent.name, self.name)))
    }

    /// The symbol declaring the field
    #[must_use]
    pub fn parent<'a>(&self, module: &'a PdbModule) -> &'a PdbSymbol {
        module.symbol(self.parent)
    }

    /// The symbol of [`PdbSymbolField::type_id`]
    ///
    /// # Errors
    /// Returns an error if the type cannot be resolved.
    pub fn field_type<'a>(&self, module: &'a PdbModule) -> Result<&'a PdbSymbol> {
        module.get_symbol_by_index(self.type_id)
    }
}
