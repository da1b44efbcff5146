//! Symbol resolution over the type records of a PDB file.
//!
//! [`PdbModule`] turns the flat record array of the TPI stream into a graph of [`PdbSymbol`]s
//! that can be queried by type index or by name. Symbols are created on first use and kept in
//! an append-only arena, so every lookup of the same type returns the same instance.
//!
//! # Key Components
//!
//! - [`PdbModule`] - Owns the [`PdbFile`] and every symbol created from it
//! - [`PdbSymbol`] - One resolved type with lazily resolved fields, base classes and enumerators
//! - [`PdbSymbolField`] - A data member, static member or global
//! - [`builtin_layout`] - Basic type and size of the built-in types
//!
//! # Forward References
//!
//! Compilers emit a forward declaration for every user defined type that is only referenced
//! by pointer. The declaration and the definition share a decorated unique name. Lookups by
//! type index and by name resolve a forward declaration to its definition whenever the file
//! contains one; [`PdbModule::get_type_symbol`] still returns the symbol of the record itself.
//!
//! # Examples
//!
//! ```rust,no_run
//! use pdbscope::PdbModule;
//! use std::path::Path;
//!
//! let module = PdbModule::from_file(Path::new("ntdll.pdb"))?;
//! if let Some(peb) = module.get_symbol("_PEB *")? {
//!     let peb = peb.element_type(&module).unwrap_or(peb);
//!     for field in peb.fields(&module)? {
//!         println!("+0x{:03x} {}", field.offset, field.name);
//!     }
//! }
//! # Ok::<(), pdbscope::Error>(())
//! ```
//!
//! # Thread Safety
//!
//! [`PdbModule`] is `Send + Sync`. Every cache is a once-initialised cell; concurrent first
//! lookups of the same type may build the symbol twice but only one of them is published.

mod builtin;
pub mod field;
pub mod symbol;

pub use builtin::builtin_layout;
pub use field::{DataKind, LocationType, PdbSymbolField};
pub use symbol::{BasicType, PdbSymbol, SymbolId, SymbolTag};

use std::{
    collections::{hash_map::Entry, HashMap, HashSet},
    path::Path,
    sync::OnceLock,
};

use dashmap::DashMap;

use crate::{
    pdb::PdbFile,
    records::{ModifierOptions, MemberRecord, TagRecord, TypeLeafKind, TypeRecord},
    symbols::{ConstantSymbol, SymbolRecord, SymbolRecordKind},
    tpi::{SimpleTypeMode, TypeIndex},
    Error, Result,
};

/// Record kinds whose forward declarations are reconciled with their definitions
const RECONCILED_KINDS: [TypeLeafKind; 5] = [
    TypeLeafKind::LF_CLASS,
    TypeLeafKind::LF_STRUCTURE,
    TypeLeafKind::LF_INTERFACE,
    TypeLeafKind::LF_UNION,
    TypeLeafKind::LF_ENUM,
];

struct Reconciliation {
    by_unique_name: HashMap<String, SymbolId>,
    by_name: HashMap<String, SymbolId>,
    selected: Vec<SymbolId>,
}

/// The symbols of one PDB file.
///
/// Created with [`PdbModule::from_file`] or [`PdbModule::from_pdb`]. Lookups by type index
/// fail with an error for corrupt or unsupported records; lookups by name return `None` for
/// names that are not present.
pub struct PdbModule {
    file: PdbFile,
    pointer_size: u32,
    arena: boxcar::Vec<PdbSymbol>,
    all: Vec<OnceLock<SymbolId>>,
    defined: Vec<OnceLock<SymbolId>>,
    builtins: DashMap<TypeIndex, SymbolId>,
    reconciliation: OnceLock<Reconciliation>,
    constants: OnceLock<HashMap<String, ConstantSymbol>>,
    public_symbols: OnceLock<HashSet<String>>,
    global_scope: OnceLock<SymbolId>,
}

impl PdbModule {
    /// Opens the PDB file at `path` with the default configuration.
    ///
    /// # Errors
    /// Returns any error of [`PdbFile::from_file`] and of parsing the type stream header.
    pub fn from_file(path: &Path) -> Result<PdbModule> {
        Self::from_pdb(PdbFile::from_file(path)?)
    }

    /// Builds the symbol layer over an opened file.
    ///
    /// The type stream is scanned immediately, symbols are created on demand.
    ///
    /// # Errors
    /// Returns [`crate::Error::StreamNotFound`] if the file has no type stream and
    /// [`crate::Error::Malformed`] if it is corrupt.
    pub fn from_pdb(file: PdbFile) -> Result<PdbModule> {
        let records = file.tpi()?.record_count();
        let pointer_size = file.pointer_size();

        Ok(PdbModule {
            file,
            pointer_size,
            arena: boxcar::Vec::new(),
            all: (0..records).map(|_| OnceLock::new()).collect(),
            defined: (0..records).map(|_| OnceLock::new()).collect(),
            builtins: DashMap::new(),
            reconciliation: OnceLock::new(),
            constants: OnceLock::new(),
            public_symbols: OnceLock::new(),
            global_scope: OnceLock::new(),
        })
    }

    /// The underlying file
    #[must_use]
    pub fn file(&self) -> &PdbFile {
        &self.file
    }

    /// Size of pointers created by [`PdbSymbol::pointer_type`]
    #[must_use]
    pub fn pointer_size(&self) -> u32 {
        self.pointer_size
    }

    /// Number of type records
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.all.len()
    }

    /// The symbol behind `id`
    ///
    /// # Panics
    /// Panics if `id` was not handed out by this module.
    #[must_use]
    pub fn symbol(&self, id: SymbolId) -> &PdbSymbol {
        &self.arena[id.0]
    }

    pub(crate) fn alloc(&self, mut symbol: PdbSymbol) -> SymbolId {
        SymbolId(self.arena.push_with(|index| {
            symbol.handle = SymbolId(index);
            symbol
        }))
    }

    /// Every class, structure, interface, union and enum, with forward declarations replaced
    /// by their definitions.
    ///
    /// Types with a unique name appear once. The first call runs the reconciliation pass,
    /// later calls and the name lookups reuse its result.
    ///
    /// # Errors
    /// Returns an error if one of the records cannot be decoded.
    pub fn get_all_types(&self) -> Result<Vec<&PdbSymbol>> {
        Ok(self
            .reconciliation()?
            .selected
            .iter()
            .map(|id| self.symbol(*id))
            .collect())
    }

    /// Looks a type up by its C/C++ spelling.
    ///
    /// Surrounding `const` and `volatile` qualifiers and a leading `enum` are ignored. Every
    /// trailing `*` resolves to the pointer type of the type before it, so `"Foo **"` yields
    /// the pointer to the pointer to `Foo`. Returns `None` if there is no type of that name.
    ///
    /// # Errors
    /// Returns an error if the reconciliation pass fails.
    pub fn get_symbol(&self, name: &str) -> Result<Option<&PdbSymbol>> {
        let mut pointers = 0;
        let mut search = normalize_name(name);
        while let Some(stripped) = search.strip_suffix('*') {
            pointers += 1;
            search = normalize_name(stripped);
        }
        if search == "unsigned int" {
            search = "unsigned";
        }

        let Some(id) = self.reconciliation()?.by_name.get(search).copied() else {
            tracing::debug!(name, "symbol not found");
            return Ok(None);
        };

        let mut symbol = self.symbol(id);
        for _ in 0..pointers {
            symbol = symbol.pointer_type(self);
        }
        Ok(Some(symbol))
    }

    /// The symbol of a type index.
    ///
    /// Built-in indexes yield built-in symbols, record indexes yield the definition of the
    /// type (see [`PdbModule::get_defined_symbol`]). Repeated calls return the same instance.
    ///
    /// # Errors
    /// Returns [`crate::Error::NotImplemented`] for records that do not describe a type,
    /// [`crate::Error::InvalidArgument`] for sizes above `i32::MAX` and
    /// [`crate::Error::Malformed`] for indexes outside the stream or corrupt records.
    pub fn get_symbol_by_index(&self, index: TypeIndex) -> Result<&PdbSymbol> {
        match index.array_index() {
            None => Ok(self.symbol(self.builtin(index)?)),
            Some(array_index) => self.get_defined_symbol(array_index as usize),
        }
    }

    /// The definition of the type at `array_index` of the type stream.
    ///
    /// For forward declarations this is the symbol of the defining record with the same
    /// unique name, if there is one.
    ///
    /// # Errors
    /// See [`PdbModule::get_symbol_by_index`].
    pub fn get_defined_symbol(&self, array_index: usize) -> Result<&PdbSymbol> {
        let slot = self
            .defined
            .get(array_index)
            .ok_or_else(|| malformed_error!("Type array index {} is out of range", array_index))?;
        if let Some(id) = slot.get() {
            return Ok(self.symbol(*id));
        }

        let symbol = self.get_type_symbol(array_index)?;
        let reconciled = self
            .file
            .tpi()?
            .kind_at(array_index)
            .and_then(TypeLeafKind::from_repr)
            .is_some_and(|kind| RECONCILED_KINDS.contains(&kind));

        let id = match &symbol.unique_name {
            Some(unique_name) if reconciled => self
                .reconciliation()?
                .by_unique_name
                .get(unique_name)
                .copied()
                .unwrap_or(symbol.handle),
            _ => symbol.handle,
        };

        Ok(self.symbol(*slot.get_or_init(|| id)))
    }

    /// The symbol of the record at `array_index`, without forward reference reconciliation.
    ///
    /// # Errors
    /// See [`PdbModule::get_symbol_by_index`].
    pub fn get_type_symbol(&self, array_index: usize) -> Result<&PdbSymbol> {
        let slot = self
            .all
            .get(array_index)
            .ok_or_else(|| malformed_error!("Type array index {} is out of range", array_index))?;
        if let Some(id) = slot.get() {
            return Ok(self.symbol(*id));
        }

        let index = TypeIndex::from_array_index(array_index as u32);
        let record = self.file.tpi()?.record(index)?;
        let symbol = self.build_symbol(Some(index), record)?;
        let id = *slot.get_or_init(|| self.alloc(symbol));
        if matches!(record, TypeRecord::Pointer(_)) {
            self.link_pointer(id);
        }

        Ok(self.symbol(id))
    }

    /// Creates a new, uncached symbol for `record`.
    ///
    /// # Errors
    /// See [`PdbModule::get_symbol_by_index`].
    pub fn symbol_for_record(&self, record: &TypeRecord) -> Result<&PdbSymbol> {
        let symbol = self.build_symbol(None, record)?;
        let id = self.alloc(symbol);
        if matches!(record, TypeRecord::Pointer(_)) {
            self.link_pointer(id);
        }

        Ok(self.symbol(id))
    }

    /// The pseudo type holding every global constant and variable as fields
    #[must_use]
    pub fn global_scope(&self) -> &PdbSymbol {
        let id = *self.global_scope.get_or_init(|| {
            self.alloc(PdbSymbol::new(
                u32::MAX,
                SymbolTag::ModuleGlobals,
                BasicType::Void,
                String::new(),
            ))
        });
        self.symbol(id)
    }

    /// Global constants by name, the first record wins for duplicate names.
    ///
    /// # Errors
    /// Returns an error if the global symbol stream cannot be read.
    pub fn constants(&self) -> Result<&HashMap<String, ConstantSymbol>> {
        if let Some(constants) = self.constants.get() {
            return Ok(constants);
        }

        let symbols = self.file.symbols()?;
        let mut constants = HashMap::new();
        for kind in SymbolRecordKind::CONSTANTS {
            for record in symbols.symbols(kind)?.iter() {
                if let SymbolRecord::Constant(constant) = record {
                    constants
                        .entry(constant.name.clone())
                        .or_insert_with(|| constant.clone());
                }
            }
        }

        Ok(self.constants.get_or_init(|| constants))
    }

    /// Names of the global and module-local variables.
    ///
    /// # Errors
    /// Returns an error if the global symbol stream cannot be read.
    pub fn public_symbols(&self) -> Result<&HashSet<String>> {
        if let Some(names) = self.public_symbols.get() {
            return Ok(names);
        }

        let symbols = self.file.symbols()?;
        let mut names = HashSet::new();
        for kind in SymbolRecordKind::DATA {
            for record in symbols.symbols(kind)?.iter() {
                names.insert(record.name().to_string());
            }
        }

        Ok(self.public_symbols.get_or_init(|| names))
    }

    pub(crate) fn global_fields(&self, scope: &PdbSymbol) -> Result<Vec<PdbSymbolField>> {
        let symbols = self.file.symbols()?;
        let mut fields = Vec::new();

        for kind in SymbolRecordKind::CONSTANTS {
            for record in symbols.symbols(kind)?.iter() {
                if let SymbolRecord::Constant(constant) = record {
                    fields.push(PdbSymbolField::global_constant(self, scope, constant)?);
                }
            }
        }

        for kind in SymbolRecordKind::DATA {
            for record in symbols.symbols(kind)?.iter() {
                if let SymbolRecord::Data(data) = record {
                    fields.push(PdbSymbolField::global_data(self, scope, data)?);
                }
            }
        }

        Ok(fields)
    }

    /// Creates the base class symbol of an `LF_BCLASS` or `LF_VBCLASS` member
    pub(crate) fn member_symbol(&self, member: &MemberRecord) -> Result<&PdbSymbol> {
        let (base_type, offset, is_virtual) = match member {
            MemberRecord::BaseClass(base) => (base.base_type, base.offset, false),
            MemberRecord::VirtualBaseClass(base) => (base.base_type, 0, true),
            other => {
                return Err(Error::NotImplemented(format!(
                    "No base class symbol for {other:?}"
                )))
            }
        };

        let base = self.get_symbol_by_index(base_type)?;
        let mut symbol =
            PdbSymbol::new(base.id, SymbolTag::BaseClass, base.basic_type, base.name.clone());
        symbol.size = base.size;
        symbol.offset = u32::try_from(offset).map_err(|_| {
            Error::InvalidArgument(format!("Offset of base class {} exceeds 32 bits", base.name))
        })?;
        symbol.is_virtual_inheritance = is_virtual;
        symbol.is_forward_reference = base.is_forward_reference;
        symbol.unique_name.clone_from(&base.unique_name);
        symbol.has_vtable = base.has_vtable;
        symbol.linked = Some(base.handle);

        Ok(self.symbol(self.alloc(symbol)))
    }

    fn builtin(&self, index: TypeIndex) -> Result<SymbolId> {
        if let Some(id) = self.builtins.get(&index) {
            return Ok(*id);
        }

        let kind = index
            .simple_kind()
            .ok_or_else(|| Error::NotImplemented(format!("Unexpected simple type {index}")))?;
        let mode = index.simple_mode();
        let (basic_type, size) = builtin_layout(kind);

        let id = if mode.is_pointer() {
            let element = self.builtin(index.direct())?;
            let mut symbol = PdbSymbol::new(
                index.index(),
                SymbolTag::Pointer,
                basic_type,
                index.simple_type_name(),
            );
            symbol.size = match mode {
                SimpleTypeMode::NearPointer32 | SimpleTypeMode::FarPointer32 => 4,
                SimpleTypeMode::NearPointer64 => 8,
                SimpleTypeMode::NearPointer128 => 16,
                _ => self.pointer_size,
            };
            symbol.element = Some(element);
            *self.builtins.entry(index).or_insert_with(|| self.alloc(symbol))
        } else {
            let mut symbol = PdbSymbol::new(
                index.index(),
                SymbolTag::BuiltinType,
                basic_type,
                index.simple_type_name(),
            );
            symbol.size = size;
            *self.builtins.entry(index).or_insert_with(|| self.alloc(symbol))
        };

        if mode.is_pointer() {
            self.link_pointer(id);
        }
        Ok(id)
    }

    fn link_pointer(&self, pointer: SymbolId) {
        if let Some(element) = self.symbol(pointer).element {
            let _ = self.symbol(element).pointer.set(pointer);
        }
    }

    /// Resolves a type referenced by the record at `own`, which has to precede it
    fn referenced(&self, own: Option<TypeIndex>, target: TypeIndex) -> Result<&PdbSymbol> {
        if let Some(own) = own {
            if !target.is_simple() && target >= own {
                return Err(malformed_error!(
                    "Type {} references type {} which does not precede it",
                    own,
                    target
                ));
            }
        }
        self.get_symbol_by_index(target)
    }

    fn build_symbol(&self, own: Option<TypeIndex>, record: &TypeRecord) -> Result<PdbSymbol> {
        let id = own.map_or(u32::MAX, TypeIndex::index);

        let symbol = match record {
            TypeRecord::Modifier(modifier) => {
                let modified = self.referenced(own, modifier.modified_type)?;
                let mut name = modified.name.clone();
                if modifier.modifiers.contains(ModifierOptions::UNALIGNED) {
                    name = format!("unaligned {name}");
                }
                if modifier.modifiers.contains(ModifierOptions::VOLATILE) {
                    name = format!("volatile {name}");
                }
                if modifier.modifiers.contains(ModifierOptions::CONST) {
                    name = format!("const {name}");
                }

                let mut symbol = PdbSymbol::new(id, modified.tag, modified.basic_type, name);
                symbol.size = modified.size;
                symbol.offset = modified.offset;
                symbol.is_forward_reference = modified.is_forward_reference;
                symbol.unique_name.clone_from(&modified.unique_name);
                symbol.is_virtual_inheritance = modified.is_virtual_inheritance;
                symbol.has_vtable = modified.has_vtable;
                symbol.linked = Some(modified.handle);
                symbol
            }
            TypeRecord::Procedure(_) | TypeRecord::MemberFunction(_) => {
                PdbSymbol::new(id, SymbolTag::Function, BasicType::NoType, String::new())
            }
            TypeRecord::Array(array) => {
                let element = self.referenced(own, array.element_type)?;
                let name = format!("{}[]", element.name);
                let mut symbol = PdbSymbol::new(id, SymbolTag::Pointer, BasicType::NoType, name);
                symbol.size = checked_size(array.size, &symbol.name)?;
                symbol.element = Some(element.handle);
                symbol
            }
            TypeRecord::Pointer(pointer) => {
                let element = self.referenced(own, pointer.referent_type)?;
                let name = format!("{}*", element.name);
                let mut symbol = PdbSymbol::new(id, SymbolTag::Pointer, BasicType::NoType, name);
                symbol.size = u32::from(pointer.size());
                symbol.element = Some(element.handle);
                symbol
            }
            TypeRecord::Class { kind, record } => {
                let tag = if *kind == TypeLeafKind::LF_STRUCTURE {
                    SymbolTag::Structure
                } else {
                    SymbolTag::Class
                };
                let mut symbol = tag_symbol(id, tag, BasicType::NoType, record);
                symbol.size = checked_size(record.size, &record.name)?;
                symbol.has_vtable = !record.vtable_shape.is_none();
                symbol
            }
            TypeRecord::Union(record) => {
                let mut symbol = tag_symbol(id, SymbolTag::Union, BasicType::NoType, record);
                symbol.size = checked_size(record.size, &record.name)?;
                symbol
            }
            TypeRecord::Enum(record) => {
                if !record.underlying_type.is_simple() {
                    return Err(malformed_error!(
                        "Enum {} has non built-in underlying type {}",
                        record.name,
                        record.underlying_type
                    ));
                }
                let underlying = self.symbol(self.builtin(record.underlying_type)?);
                let mut symbol = tag_symbol(id, SymbolTag::Enum, underlying.basic_type, record);
                symbol.size = underlying.size;
                symbol
            }
            other => {
                return Err(Error::NotImplemented(format!(
                    "No symbol for {:?} records",
                    other.kind()
                )))
            }
        };

        Ok(symbol)
    }

    fn reconciliation(&self) -> Result<&Reconciliation> {
        if let Some(reconciliation) = self.reconciliation.get() {
            return Ok(reconciliation);
        }

        let reconciliation = self.reconcile()?;
        Ok(self.reconciliation.get_or_init(|| reconciliation))
    }

    #[tracing::instrument(level = "trace", skip_all, fields(types = self.all.len()))]
    fn reconcile(&self) -> Result<Reconciliation> {
        let tpi = self.file.tpi()?;
        let mut indexes = Vec::new();
        for kind in RECONCILED_KINDS {
            indexes.extend(tpi.indexes(kind).filter_map(TypeIndex::array_index));
        }

        let mut selected = Vec::new();
        let mut slots: HashMap<String, usize> = HashMap::new();
        for array_index in &indexes {
            let symbol = self.get_type_symbol(*array_index as usize)?;
            let Some(unique_name) = &symbol.unique_name else {
                selected.push(symbol.handle);
                continue;
            };

            match slots.entry(unique_name.clone()) {
                Entry::Vacant(entry) => {
                    entry.insert(selected.len());
                    selected.push(symbol.handle);
                }
                Entry::Occupied(entry) => {
                    let slot = *entry.get();
                    if self.symbol(selected[slot]).is_forward_reference
                        && !symbol.is_forward_reference
                    {
                        selected[slot] = symbol.handle;
                    }
                }
            }
        }

        let by_unique_name: HashMap<String, SymbolId> = slots
            .into_iter()
            .map(|(unique_name, slot)| (unique_name, selected[slot]))
            .collect();

        let mut by_name = HashMap::new();
        for array_index in &indexes {
            let symbol = self.get_type_symbol(*array_index as usize)?;
            let defined = symbol
                .unique_name
                .as_ref()
                .and_then(|unique_name| by_unique_name.get(unique_name))
                .copied()
                .unwrap_or(symbol.handle);
            let name = &self.symbol(defined).name;
            if !name.is_empty() {
                by_name.entry(name.clone()).or_insert(defined);
            }
        }

        for mode in [SimpleTypeMode::Direct, SimpleTypeMode::NearPointer] {
            for builtin in TypeIndex::builtin_types() {
                let id = self.builtin(TypeIndex(builtin.index() | mode as u32))?;
                let name = &self.symbol(id).name;
                if !name.is_empty() {
                    by_name.entry(name.clone()).or_insert(id);
                }
            }
        }

        tracing::debug!(
            types = selected.len(),
            names = by_name.len(),
            "reconciled forward references"
        );

        Ok(Reconciliation {
            by_unique_name,
            by_name,
            selected,
        })
    }
}

impl std::fmt::Debug for PdbModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdbModule")
            .field("file", &self.file)
            .field("pointer_size", &self.pointer_size)
            .field("types", &self.all.len())
            .field("symbols", &self.arena.count())
            .finish_non_exhaustive()
    }
}

fn tag_symbol(id: u32, tag: SymbolTag, basic_type: BasicType, record: &dyn TagRecord) -> PdbSymbol {
    let mut symbol = PdbSymbol::new(id, tag, basic_type, record.name().to_string());
    symbol.is_forward_reference = record.is_forward_reference();
    symbol.unique_name = record.unique_name().map(str::to_string);
    symbol.field_list = record.field_list();
    symbol
}

fn checked_size(size: u64, name: &str) -> Result<u32> {
    match i32::try_from(size) {
        Ok(size) => Ok(size.unsigned_abs()),
        Err(_) => Err(Error::InvalidArgument(format!(
            "Size {size} of {name} exceeds i32::MAX"
        ))),
    }
}

/// Strips qualifiers and whitespace that do not take part in name lookups
fn normalize_name(name: &str) -> &str {
    let mut name = name.trim();
    loop {
        let before = name;
        name = name.strip_suffix(" const").unwrap_or(name).trim_end();
        name = name.strip_suffix(" volatile").unwrap_or(name).trim_end();
        name = name.strip_prefix("const ").unwrap_or(name).trim_start();
        name = name.strip_prefix("volatile ").unwrap_or(name).trim_start();
        name = name.strip_prefix("enum ").unwrap_or(name).trim_start();
        if name == before {
            return name;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{module_with_types, record};

    #[rustfmt::skip]
    fn foo_types() -> Vec<Vec<u8>> {
        vec![
            // 0x1000 forward LF_STRUCTURE Foo
            record(0x1505, &[
                0x00, 0x00, 0x80, 0x02,
                0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
                0x00, 0x00, b'F', b'o', b'o', 0x00,
                b'.', b'?', b'A', b'U', b'F', b'o', b'o', b'@', b'@', 0x00,
            ]),
            // 0x1001 LF_POINTER to 0x1000, 64-bit near pointer of size 8
            record(0x1002, &[0x00, 0x10, 0x00, 0x00, 0x0c, 0x00, 0x01, 0x00]),
            // 0x1002 LF_FIELDLIST: int a @0, unsigned __int64 b @8
            record(0x1203, &[
                0x0d, 0x15, 0x03, 0x00, 0x74, 0x00, 0x00, 0x00, 0x00, 0x00, b'a', 0x00,
                0x0d, 0x15, 0x03, 0x00, 0x23, 0x00, 0x00, 0x00, 0x08, 0x00, b'b', 0x00,
            ]),
            // 0x1003 LF_STRUCTURE Foo, size 16
            record(0x1505, &[
                0x02, 0x00, 0x00, 0x02,
                0x02, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
                0x10, 0x00, b'F', b'o', b'o', 0x00,
                b'.', b'?', b'A', b'U', b'F', b'o', b'o', b'@', b'@', 0x00,
            ]),
            // 0x1004 LF_ARRAY int[10]
            record(0x1503, &[
                0x74, 0x00, 0x00, 0x00, 0x23, 0x00, 0x00, 0x00, 0x28, 0x00, 0x00, 0xf1,
            ]),
            // 0x1005 LF_MODIFIER const volatile Foo
            record(0x1001, &[0x00, 0x10, 0x00, 0x00, 0x03, 0x00, 0xf2, 0xf1]),
            // 0x1006 LF_PROCEDURE void (void)
            record(0x1008, &[
                0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10, 0x00, 0x00,
            ]),
        ]
    }

    #[test]
    fn builtins() {
        let module = module_with_types(&[]);

        let int_pointer = module.get_symbol_by_index(TypeIndex(0x0474)).unwrap();
        assert_eq!(int_pointer.tag, SymbolTag::Pointer);
        assert_eq!(int_pointer.name, "int*");
        assert_eq!(int_pointer.size, 4);
        assert_eq!(int_pointer.basic_type, BasicType::Int);

        let int = module.get_symbol_by_index(TypeIndex(0x0074)).unwrap();
        assert_eq!(int.tag, SymbolTag::BuiltinType);
        assert_eq!(int.name, "int");
        assert_eq!(int.size, 4);
        assert!(std::ptr::eq(int_pointer.element_type(&module).unwrap(), int));
        assert!(std::ptr::eq(int.pointer_type(&module), int_pointer));
        assert!(std::ptr::eq(module.get_symbol_by_index(TypeIndex(0x0074)).unwrap(), int));

        let near = module.get_symbol_by_index(TypeIndex(0x0174)).unwrap();
        assert_eq!(near.size, module.pointer_size());

        assert!(matches!(
            module.get_symbol_by_index(TypeIndex(0x00ff)),
            Err(Error::NotImplemented(_))
        ));
    }

    #[test]
    fn forward_references() {
        let module = module_with_types(&foo_types());

        let forward = module.get_type_symbol(0).unwrap();
        assert!(forward.is_forward_reference);

        let foo = module.get_symbol_by_index(TypeIndex(0x1000)).unwrap();
        assert!(!foo.is_forward_reference);
        assert_eq!(foo.size, 16);
        assert!(std::ptr::eq(foo, module.get_symbol_by_index(TypeIndex(0x1003)).unwrap()));
        assert!(std::ptr::eq(foo, module.get_defined_symbol(0).unwrap()));
        assert_eq!(foo.fields(&module).unwrap().len(), 2);
        assert_eq!(foo.fields(&module).unwrap()[1].size, 8);

        let all = module.get_all_types().unwrap();
        assert_eq!(all.len(), 1);
        assert!(std::ptr::eq(all[0], foo));
    }

    #[test]
    fn definition_before_forward_reference() {
        #[rustfmt::skip]
        let types = vec![
            // 0x1000 LF_FIELDLIST: int a @0, unsigned __int64 b @8
            record(0x1203, &[
                0x0d, 0x15, 0x03, 0x00, 0x74, 0x00, 0x00, 0x00, 0x00, 0x00, b'a', 0x00,
                0x0d, 0x15, 0x03, 0x00, 0x23, 0x00, 0x00, 0x00, 0x08, 0x00, b'b', 0x00,
            ]),
            // 0x1001 LF_STRUCTURE Foo, size 16
            record(0x1505, &[
                0x02, 0x00, 0x00, 0x02,
                0x00, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
                0x10, 0x00, b'F', b'o', b'o', 0x00,
                b'.', b'?', b'A', b'U', b'F', b'o', b'o', b'@', b'@', 0x00,
            ]),
            // 0x1002 forward LF_STRUCTURE Foo
            record(0x1505, &[
                0x00, 0x00, 0x80, 0x02,
                0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
                0x00, 0x00, b'F', b'o', b'o', 0x00,
                b'.', b'?', b'A', b'U', b'F', b'o', b'o', b'@', b'@', 0x00,
            ]),
        ];
        let module = module_with_types(&types);

        assert!(module.get_type_symbol(2).unwrap().is_forward_reference);

        let foo = module.get_symbol_by_index(TypeIndex(0x1001)).unwrap();
        assert!(!foo.is_forward_reference);
        assert_eq!(foo.size, 16);
        assert!(std::ptr::eq(foo, module.get_symbol_by_index(TypeIndex(0x1002)).unwrap()));
        assert!(std::ptr::eq(foo, module.get_symbol("Foo").unwrap().unwrap()));

        let all = module.get_all_types().unwrap();
        assert_eq!(all.len(), 1);
        assert!(std::ptr::eq(all[0], foo));
    }

    #[test]
    fn unnamed_types_are_not_looked_up() {
        #[rustfmt::skip]
        let types = vec![record(0x1505, &[
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x04, 0x00, 0x00, 0xf1,
        ])];
        let module = module_with_types(&types);

        assert_eq!(module.get_symbol_by_index(TypeIndex(0x1000)).unwrap().name, "");
        assert_eq!(module.get_all_types().unwrap().len(), 1);
        assert!(module.get_symbol("").unwrap().is_none());
        assert!(module.get_symbol("*").unwrap().is_none());
        assert!(module.get_symbol("int").unwrap().is_some());
    }

    #[test]
    fn pointers_and_lookup() {
        let module = module_with_types(&foo_types());

        let pointer = module.get_symbol_by_index(TypeIndex(0x1001)).unwrap();
        assert_eq!(pointer.tag, SymbolTag::Pointer);
        assert_eq!(pointer.name, "Foo*");
        assert_eq!(pointer.size, 8);

        let foo = module.get_symbol("Foo").unwrap().unwrap();
        assert!(std::ptr::eq(pointer.element_type(&module).unwrap(), foo));

        let found = module.get_symbol("const Foo * const").unwrap().unwrap();
        assert!(std::ptr::eq(found, pointer));

        let twice = module.get_symbol("Foo**").unwrap().unwrap();
        assert_eq!(twice.name, "Foo**");
        assert_eq!(twice.size, module.pointer_size());
        assert!(std::ptr::eq(twice.element_type(&module).unwrap(), pointer));

        assert_eq!(module.get_symbol(" unsigned int ").unwrap().unwrap().name, "unsigned");
        assert_eq!(module.get_symbol("int*").unwrap().unwrap().name, "int*");
        assert!(module.get_symbol("Bar").unwrap().is_none());
    }

    #[test]
    fn arrays_modifiers_procedures() {
        let module = module_with_types(&foo_types());

        let array = module.get_symbol_by_index(TypeIndex(0x1004)).unwrap();
        assert_eq!(array.tag, SymbolTag::Pointer);
        assert_eq!(array.name, "int[]");
        assert_eq!(array.size, 40);
        assert_eq!(array.element_type(&module).unwrap().name, "int");

        let modified = module.get_symbol_by_index(TypeIndex(0x1005)).unwrap();
        assert_eq!(modified.name, "const volatile Foo");
        assert_eq!(modified.tag, SymbolTag::Structure);
        assert_eq!(modified.size, 16);
        assert_eq!(modified.unique_name.as_deref(), Some(".?AUFoo@@"));

        let procedure = module.get_symbol_by_index(TypeIndex(0x1006)).unwrap();
        assert_eq!(procedure.tag, SymbolTag::Function);
        assert_eq!(procedure.basic_type, BasicType::NoType);

        assert!(matches!(
            module.get_symbol_by_index(TypeIndex(0x1002)),
            Err(Error::NotImplemented(_))
        ));
        assert!(module.get_symbol_by_index(TypeIndex(0x1007)).is_err());
    }

    #[test]
    fn symbol_for_record_is_uncached() {
        let module = module_with_types(&foo_types());
        let record = module.file().tpi().unwrap().record(TypeIndex(0x1003)).unwrap();

        let first = module.symbol_for_record(record).unwrap();
        let second = module.symbol_for_record(record).unwrap();
        assert_eq!(first.name, "Foo");
        assert_eq!(first.id, u32::MAX);
        assert!(!std::ptr::eq(first, second));
    }

    #[test]
    fn oversized_class() {
        #[rustfmt::skip]
        let types = vec![record(0x1504, &[
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x04, 0x80, 0x00, 0x00, 0x00, 0x80, b'B', b'i', b'g', 0x00,
        ])];
        let module = module_with_types(&types);
        assert!(matches!(
            module.get_symbol_by_index(TypeIndex(0x1000)),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn self_referencing_pointer() {
        let types = vec![record(0x1002, &[0x00, 0x10, 0x00, 0x00, 0x0c, 0x00, 0x01, 0x00])];
        let module = module_with_types(&types);
        assert!(matches!(
            module.get_symbol_by_index(TypeIndex(0x1000)),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn names() {
        assert_eq!(normalize_name("  enum Color "), "Color");
        assert_eq!(normalize_name("const volatile Foo"), "Foo");
        assert_eq!(normalize_name("Foo const volatile"), "Foo");
        assert_eq!(normalize_name("Foo *"), "Foo *");
    }
}
