//! # pdbscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the pdbscope library. Import this module to get quick access to the essential
//! types for reading PDB files.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all pdbscope operations
pub use crate::Error;

/// The result type used throughout pdbscope
pub use crate::Result;

/// Loader configuration
pub use crate::{PdbConfig, UnknownRecordPolicy};

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// The opened PDB file
pub use crate::PdbFile;

/// The resolved type graph
pub use crate::PdbModule;

/// Low-level parsing utilities
pub use crate::{BinaryReader, MappedBlockReader, Numeric, Parser};

// ================================================================================================
// Container
// ================================================================================================

/// Streams and the container header
pub use crate::msf::{stream::PdbStream, superblock::Superblock, FreePageMap};

/// PDB info stream and string table
pub use crate::info::{PdbInfoStream, PdbStringTable};

// ================================================================================================
// Types and Symbols
// ================================================================================================

/// Type streams and type indexes
pub use crate::tpi::{SimpleTypeKind, SimpleTypeMode, TpiStream, TypeIndex};

/// Type records
pub use crate::records::{
    ClassRecord, EnumRecord, FieldListRecord, MemberRecord, PointerRecord, TagRecord,
    TypeLeafKind, TypeRecord, UnionRecord,
};

/// Global symbol records
pub use crate::symbols::{SymbolRecord, SymbolRecordKind, SymbolStream};

/// Debug information stream
pub use crate::dbi::{DbiModuleDescriptor, DbiStream, MachineType};

/// Resolved symbols
pub use crate::module::{
    BasicType, DataKind, LocationType, PdbSymbol, PdbSymbolField, SymbolId, SymbolTag,
};
