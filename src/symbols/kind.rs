//! CodeView symbol record kinds.

use strum::{EnumIter, FromRepr};

/// Kind of a CodeView symbol record
///
/// Only the kinds found in the global symbol record stream are listed. Module streams carry
/// many more, they are not read by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, FromRepr)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SymbolRecordKind {
    /// Thunk
    S_THUNK32 = 0x1102,
    /// Managed constant
    S_MANCONSTANT = 0x112d,
    /// Constant
    S_CONSTANT = 0x1107,
    /// User defined type
    S_UDT = 0x1108,
    /// COBOL user defined type
    S_COBOLUDT = 0x1109,
    /// Module-local data
    S_LDATA32 = 0x110c,
    /// Global data
    S_GDATA32 = 0x110d,
    /// Public symbol
    S_PUB32 = 0x110e,
    /// Module-local procedure
    S_LPROC32 = 0x110f,
    /// Global procedure
    S_GPROC32 = 0x1110,
    /// Module-local thread storage
    S_LTHREAD32 = 0x1112,
    /// Global thread storage
    S_GTHREAD32 = 0x1113,
    /// Module-local managed data
    S_LMANDATA = 0x111c,
    /// Global managed data
    S_GMANDATA = 0x111d,
    /// Reference to a procedure in a module stream
    S_PROCREF = 0x1125,
    /// Reference to data in a module stream
    S_DATAREF = 0x1126,
    /// Reference to a module-local procedure in a module stream
    S_LPROCREF = 0x1127,
    /// Reference to an annotation
    S_ANNOTATIONREF = 0x1128,
    /// Reference to a managed token
    S_TOKENREF = 0x1129,
    /// Module-local procedure with an id signature
    S_LPROC32_ID = 0x1146,
    /// Global procedure with an id signature
    S_GPROC32_ID = 0x1147,
    /// Module-local data parallel procedure
    S_LPROC32_DPC = 0x1155,
    /// Module-local data parallel procedure with an id signature
    S_LPROC32_DPC_ID = 0x1156,
}

impl SymbolRecordKind {
    /// Kinds decoded to [`crate::symbols::ProcedureSymbol`]
    pub const PROCEDURES: [SymbolRecordKind; 6] = [
        SymbolRecordKind::S_GPROC32,
        SymbolRecordKind::S_LPROC32,
        SymbolRecordKind::S_GPROC32_ID,
        SymbolRecordKind::S_LPROC32_ID,
        SymbolRecordKind::S_LPROC32_DPC,
        SymbolRecordKind::S_LPROC32_DPC_ID,
    ];

    /// Kinds decoded to [`crate::symbols::ConstantSymbol`]
    pub const CONSTANTS: [SymbolRecordKind; 2] =
        [SymbolRecordKind::S_CONSTANT, SymbolRecordKind::S_MANCONSTANT];

    /// Kinds decoded to [`crate::symbols::DataSymbol`]
    pub const DATA: [SymbolRecordKind; 4] = [
        SymbolRecordKind::S_LDATA32,
        SymbolRecordKind::S_GDATA32,
        SymbolRecordKind::S_LMANDATA,
        SymbolRecordKind::S_GMANDATA,
    ];
}
