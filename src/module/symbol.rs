//! Symbols of the type graph.
//!
//! A [`PdbSymbol`] is the resolved view of one type: built-in, pointer, array, modifier,
//! procedure, class, union, enum or base class. Symbols live in the arena of their
//! [`PdbModule`] and refer to each other through [`SymbolId`]s. Fields, base classes and
//! enumerators are resolved on first access and cached in the symbol.

use std::{collections::HashSet, sync::OnceLock};

use strum::FromRepr;

use crate::{
    module::{field::PdbSymbolField, PdbModule},
    records::{MemberRecord, TypeRecord},
    tpi::TypeIndex,
    Result,
};

/// Handle of a symbol inside the arena of its [`PdbModule`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub(crate) usize);

impl SymbolId {
    /// Position in the arena
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// What kind of type a symbol describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolTag {
    /// A built-in type
    BuiltinType,
    /// Pointers and arrays
    Pointer,
    /// Procedure and member function signatures
    Function,
    /// `class` and `interface`
    Class,
    /// `struct`
    Structure,
    /// `union`
    Union,
    /// `enum`
    Enum,
    /// A base class entry of a class
    BaseClass,
    /// The pseudo type holding global constants and variables
    ModuleGlobals,
}

/// Basic type of a symbol, with the values of the debug interface access SDK
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr)]
#[repr(u32)]
#[allow(missing_docs)]
pub enum BasicType {
    NoType = 0,
    Void = 1,
    Char = 2,
    WChar = 3,
    Int = 6,
    UInt = 7,
    Float = 8,
    Bcd = 9,
    Bool = 10,
    Long = 13,
    ULong = 14,
    Currency = 25,
    Date = 26,
    Variant = 27,
    Complex = 28,
    Bit = 29,
    Bstr = 30,
    Hresult = 31,
    Char16 = 32,
    Char32 = 33,
}

/// A resolved type.
///
/// The plain properties are filled in when the symbol is created. The graph queries take the
/// owning [`PdbModule`], which holds the type records and the other symbols.
///
/// Modifier and base class symbols are views of another symbol: [`PdbSymbol::fields`],
/// [`PdbSymbol::base_classes`], [`PdbSymbol::enum_values`] and [`PdbSymbol::element_type`]
/// answer for the modified or base type.
#[derive(Debug)]
pub struct PdbSymbol {
    /// Type index the symbol was created from, `u32::MAX` if there is none
    pub id: u32,
    /// Display name
    pub name: String,
    /// Size in bytes
    pub size: u32,
    /// Offset inside the enclosing type, for base classes
    pub offset: u32,
    /// Kind of type
    pub tag: SymbolTag,
    /// Basic type, [`BasicType::NoType`] for user defined types
    pub basic_type: BasicType,
    /// Forward declaration without member list
    pub is_forward_reference: bool,
    /// Decorated name of classes, unions and enums
    pub unique_name: Option<String>,
    /// Virtual base class
    pub is_virtual_inheritance: bool,
    pub(crate) has_vtable: bool,
    pub(crate) handle: SymbolId,
    pub(crate) field_list: TypeIndex,
    pub(crate) element: Option<SymbolId>,
    pub(crate) linked: Option<SymbolId>,
    pub(crate) pointer: OnceLock<SymbolId>,
    fields: OnceLock<Vec<PdbSymbolField>>,
    base_classes: OnceLock<Vec<SymbolId>>,
    enum_values: OnceLock<Vec<(String, String)>>,
}

impl PdbSymbol {
    pub(crate) fn new(id: u32, tag: SymbolTag, basic_type: BasicType, name: String) -> PdbSymbol {
        PdbSymbol {
            id,
            name,
            size: 0,
            offset: 0,
            tag,
            basic_type,
            is_forward_reference: false,
            unique_name: None,
            is_virtual_inheritance: false,
            has_vtable: false,
            handle: SymbolId(usize::MAX),
            field_list: TypeIndex::NONE,
            element: None,
            linked: None,
            pointer: OnceLock::new(),
            fields: OnceLock::new(),
            base_classes: OnceLock::new(),
            enum_values: OnceLock::new(),
        }
    }

    /// Handle of this symbol in its module
    #[must_use]
    pub fn handle(&self) -> SymbolId {
        self.handle
    }

    /// Returns `true` if the type has a virtual function table
    #[must_use]
    pub fn has_vtable(&self) -> bool {
        self.has_vtable
    }

    fn target<'a>(&'a self, module: &'a PdbModule) -> &'a PdbSymbol {
        match self.linked {
            Some(linked) => module.symbol(linked).target(module),
            None => self,
        }
    }

    /// The pointed-to type of pointers, the element type of arrays
    #[must_use]
    pub fn element_type<'a>(&'a self, module: &'a PdbModule) -> Option<&'a PdbSymbol> {
        self.target(module).element.map(|id| module.symbol(id))
    }

    /// A pointer to this type.
    ///
    /// Returns the pointer record or built-in pointer that referenced this symbol first. If
    /// there is none, a pointer of the module's pointer size is created once.
    pub fn pointer_type<'a>(&'a self, module: &'a PdbModule) -> &'a PdbSymbol {
        if let Some(id) = self.pointer.get() {
            return module.symbol(*id);
        }

        let id = *self.pointer.get_or_init(|| {
            let mut pointer = PdbSymbol::new(
                u32::MAX,
                SymbolTag::Pointer,
                BasicType::NoType,
                format!("{}*", self.name),
            );
            pointer.size = module.pointer_size();
            pointer.element = Some(self.handle);
            module.alloc(pointer)
        });
        module.symbol(id)
    }

    /// Data members and static data members, following the whole field list chain.
    ///
    /// The global scope yields every global constant followed by every global variable.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for a broken field list chain and any error of
    /// resolving the member types.
    pub fn fields<'a>(&'a self, module: &'a PdbModule) -> Result<&'a [PdbSymbolField]> {
        let target = self.target(module);
        if let Some(fields) = target.fields.get() {
            return Ok(fields);
        }

        let fields = if target.tag == SymbolTag::ModuleGlobals {
            module.global_fields(target)?
        } else {
            let mut fields = Vec::new();
            for member in module.field_list_members(target.field_list)? {
                match member {
                    MemberRecord::DataMember(member) => {
                        fields.push(PdbSymbolField::data_member(module, target, member)?);
                    }
                    MemberRecord::StaticDataMember(member) => {
                        fields.push(PdbSymbolField::static_member(module, target, member)?);
                    }
                    _ => {}
                }
            }
            fields
        };

        Ok(target.fields.get_or_init(|| fields))
    }

    /// Direct and virtual base classes, in declaration order.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for a broken field list chain and any error of
    /// resolving the base types.
    pub fn base_classes<'a>(&'a self, module: &'a PdbModule) -> Result<Vec<&'a PdbSymbol>> {
        let target = self.target(module);
        let ids = match target.base_classes.get() {
            Some(ids) => ids,
            None => {
                let mut ids = Vec::new();
                for member in module.field_list_members(target.field_list)? {
                    if matches!(
                        member,
                        MemberRecord::BaseClass(_) | MemberRecord::VirtualBaseClass(_)
                    ) {
                        ids.push(module.member_symbol(member)?.handle);
                    }
                }
                target.base_classes.get_or_init(|| ids)
            }
        };

        Ok(ids.iter().map(|id| module.symbol(*id)).collect())
    }

    /// Enumerator names and values, values rendered in the width they were encoded with.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for a broken field list chain.
    pub fn enum_values<'a>(&'a self, module: &'a PdbModule) -> Result<&'a [(String, String)]> {
        let target = self.target(module);
        if let Some(values) = target.enum_values.get() {
            return Ok(values);
        }

        let values = module
            .field_list_members(target.field_list)?
            .into_iter()
            .filter_map(|member| match member {
                MemberRecord::Enumerator(enumerator) => {
                    Some((enumerator.name.clone(), enumerator.value.to_string()))
                }
                _ => None,
            })
            .collect();

        Ok(target.enum_values.get_or_init(|| values))
    }
}

impl PdbModule {
    /// Every member of the field list starting at `start`, following `LF_INDEX` continuations.
    pub(crate) fn field_list_members(&self, start: TypeIndex) -> Result<Vec<&MemberRecord>> {
        let tpi = self.file().tpi()?;
        let mut members = Vec::new();
        let mut visited = HashSet::new();
        let mut next = Some(start);

        while let Some(index) = next.filter(|index| !index.is_none()) {
            if !visited.insert(index) {
                return Err(malformed_error!("Field list chain loops at {}", index));
            }

            let TypeRecord::FieldList(list) = tpi.record(index)? else {
                return Err(malformed_error!("Type {} is not a field list", index));
            };

            members.extend(
                list.fields
                    .iter()
                    .filter(|field| !matches!(field, MemberRecord::ListContinuation(_))),
            );
            next = list.continuation();
        }

        Ok(members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::module_with_types;

    #[rustfmt::skip]
    fn point_types() -> Vec<Vec<u8>> {
        vec![
            // 0x1000 LF_FIELDLIST: int x @0, static int count, unsigned y : 3 @4, base 0x1004
            crate::test::record(0x1203, &[
                0x0d, 0x15, 0x03, 0x00, 0x74, 0x00, 0x00, 0x00, 0x00, 0x00, b'x', 0x00,
                0x0e, 0x15, 0x03, 0x00, 0x74, 0x00, 0x00, 0x00, b'c', b'o', b'u', b'n', b't', 0x00,
                0xf2, 0xf1,
                0x0d, 0x15, 0x03, 0x00, 0x02, 0x10, 0x00, 0x00, 0x04, 0x00, b'y', 0x00,
                0x00, 0x14, 0x03, 0x00, 0x04, 0x10, 0x00, 0x00, 0x08, 0x00, 0xf2, 0xf1,
            ]),
            // 0x1001 LF_STRUCTURE Point, field list 0x1000, size 12
            crate::test::record(0x1505, &[
                0x04, 0x00, 0x00, 0x00,
                0x00, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
                0x0c, 0x00, b'P', b'o', b'i', b'n', b't', 0x00,
            ]),
            // 0x1002 LF_BITFIELD unsigned : 3 at bit 1
            crate::test::record(0x1205, &[0x75, 0x00, 0x00, 0x00, 0x03, 0x01, 0xf2, 0xf1]),
            // 0x1003 LF_MODIFIER const Point
            crate::test::record(0x1001, &[0x01, 0x10, 0x00, 0x00, 0x01, 0x00, 0xf2, 0xf1]),
            // 0x1004 LF_STRUCTURE Base, no fields, size 4
            crate::test::record(0x1505, &[
                0x00, 0x00, 0x00, 0x00,
                0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
                0x04, 0x00, b'B', b'a', b's', b'e', 0x00, 0xf1,
            ]),
        ]
    }

    #[test]
    fn fields() {
        let module = module_with_types(&point_types());
        let point = module.get_symbol_by_index(TypeIndex(0x1001)).unwrap();
        assert_eq!(point.tag, SymbolTag::Structure);
        assert_eq!(point.size, 12);

        let fields = point.fields(&module).unwrap();
        assert_eq!(fields.len(), 3);

        assert_eq!(fields[0].name, "x");
        assert_eq!(fields[0].size, 4);
        assert_eq!(fields[0].offset, 0);
        assert!(!fields[0].is_static());

        assert_eq!(fields[1].name, "count");
        assert!(fields[1].is_static());
        assert!(!fields[1].is_valid_static(&module).unwrap());

        assert_eq!(fields[2].name, "y");
        assert_eq!(fields[2].offset, 4);
        assert_eq!(fields[2].bit_position, 1);
        assert_eq!(fields[2].bit_size, 3);
        assert_eq!(fields[2].type_id, TypeIndex(0x75));
        assert_eq!(fields[2].size, 0);
        assert_eq!(fields[2].field_type(&module).unwrap().name, "unsigned");

        assert!(std::ptr::eq(point.fields(&module).unwrap(), fields));
    }

    #[test]
    fn base_classes() {
        let module = module_with_types(&point_types());
        let point = module.get_symbol_by_index(TypeIndex(0x1001)).unwrap();

        let bases = point.base_classes(&module).unwrap();
        assert_eq!(bases.len(), 1);
        assert_eq!(bases[0].tag, SymbolTag::BaseClass);
        assert_eq!(bases[0].name, "Base");
        assert_eq!(bases[0].size, 4);
        assert_eq!(bases[0].offset, 8);
        assert!(!bases[0].is_virtual_inheritance);
        assert!(bases[0].fields(&module).unwrap().is_empty());
    }

    #[test]
    fn modifier_views_modified_type() {
        let module = module_with_types(&point_types());
        let point = module.get_symbol_by_index(TypeIndex(0x1001)).unwrap();
        let modified = module.get_symbol_by_index(TypeIndex(0x1003)).unwrap();

        assert_eq!(modified.name, "const Point");
        assert_eq!(modified.tag, SymbolTag::Structure);
        assert_eq!(modified.size, 12);
        assert!(std::ptr::eq(
            modified.fields(&module).unwrap(),
            point.fields(&module).unwrap()
        ));

        let pointer = modified.pointer_type(&module);
        assert_eq!(pointer.name, "const Point*");
        assert_eq!(pointer.size, module.pointer_size());
        assert!(std::ptr::eq(pointer.element_type(&module).unwrap(), modified));
        assert!(std::ptr::eq(modified.pointer_type(&module), pointer));
    }

    #[test]
    fn enum_values() {
        #[rustfmt::skip]
        let types = vec![
            // LF_FIELDLIST: Red = 0, Dark = -1
            crate::test::record(0x1203, &[
                0x02, 0x15, 0x03, 0x00, 0x00, 0x00, b'R', b'e', b'd', 0x00, 0xf2, 0xf1,
                0x02, 0x15, 0x03, 0x00, 0x00, 0x80, 0xff, b'D', b'a', b'r', b'k', 0x00,
            ]),
            // LF_ENUM Color : int
            crate::test::record(0x1507, &[
                0x02, 0x00, 0x00, 0x00, 0x74, 0x00, 0x00, 0x00, 0x00, 0x10, 0x00, 0x00,
                b'C', b'o', b'l', b'o', b'r', 0x00,
            ]),
        ];
        let module = module_with_types(&types);
        let color = module.get_symbol_by_index(TypeIndex(0x1001)).unwrap();

        assert_eq!(color.tag, SymbolTag::Enum);
        assert_eq!(color.basic_type, BasicType::Int);
        assert_eq!(color.size, 4);
        assert_eq!(
            color.enum_values(&module).unwrap(),
            &[
                ("Red".to_string(), "0".to_string()),
                ("Dark".to_string(), "-1".to_string())
            ]
        );
    }

    #[test]
    fn looping_field_list_chain() {
        #[rustfmt::skip]
        let types = vec![
            // LF_FIELDLIST with only an LF_INDEX back to itself
            crate::test::record(0x1203, &[0x04, 0x14, 0x00, 0x00, 0x00, 0x10, 0x00, 0x00]),
            crate::test::record(0x1505, &[
                0x00, 0x00, 0x00, 0x00,
                0x00, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
                0x00, 0x00, b'L', 0x00,
            ]),
        ];
        let module = module_with_types(&types);
        let looping = module.get_symbol_by_index(TypeIndex(0x1001)).unwrap();
        assert!(looping.fields(&module).is_err());
    }
}
