//! Decoded symbol records.

use bitflags::bitflags;
use strum::FromRepr;

use crate::{
    file::{numeric::Numeric, reader::BinaryReader},
    symbols::kind::SymbolRecordKind,
    tpi::TypeIndex,
    Error, Result,
};

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
    /// Flags of procedure symbols
    pub struct ProcedureFlags : u8 {
        /// Frame pointer present
        const HAS_FP = 0x01;
        /// Interrupt return
        const HAS_IRET = 0x02;
        /// Far return
        const HAS_FRET = 0x04;
        /// Function does not return
        const IS_NO_RETURN = 0x08;
        /// Label is not fallen into
        const IS_UNREACHABLE = 0x10;
        /// Custom calling convention
        const HAS_CUSTOM_CALLING_CONV = 0x20;
        /// Marked `noinline`
        const IS_NO_INLINE = 0x40;
        /// Debug information for optimized code
        const HAS_OPTIMIZED_DEBUG_INFO = 0x80;
    }
}

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
    /// Flags of public symbols
    pub struct PublicSymbolFlags : u32 {
        /// Refers to code
        const CODE = 0x01;
        /// Refers to a function
        const FUNCTION = 0x02;
        /// Managed code or data
        const MANAGED = 0x04;
        /// MSIL code
        const MSIL = 0x08;
    }
}

/// Kind of thunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(u8)]
pub enum ThunkOrdinal {
    /// Standard thunk
    Standard = 0,
    /// `this` adjustor thunk
    ThisAdjustor = 1,
    /// Virtual call thunk
    Vcall = 2,
    /// P-code thunk
    Pcode = 3,
    /// Delay load thunk
    UnknownLoad = 4,
    /// Incremental linking trampoline
    TrampIncremental = 5,
    /// Branch island
    BranchIsland = 6,
}

/// `S_GPROC32`, `S_LPROC32` and their id and data parallel variants
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct ProcedureSymbol {
    pub kind: SymbolRecordKind,
    pub parent: u32,
    pub end: u32,
    pub next: u32,
    pub code_size: u32,
    pub debug_start: u32,
    pub debug_end: u32,
    pub function_type: TypeIndex,
    pub code_offset: u32,
    pub segment: u16,
    pub flags: ProcedureFlags,
    pub name: String,
}

impl ProcedureSymbol {
    fn read<R: BinaryReader + ?Sized>(
        reader: &mut R,
        kind: SymbolRecordKind,
    ) -> Result<ProcedureSymbol> {
        Ok(ProcedureSymbol {
            kind,
            parent: reader.read_le::<u32>()?,
            end: reader.read_le::<u32>()?,
            next: reader.read_le::<u32>()?,
            code_size: reader.read_le::<u32>()?,
            debug_start: reader.read_le::<u32>()?,
            debug_end: reader.read_le::<u32>()?,
            function_type: reader.read_le::<TypeIndex>()?,
            code_offset: reader.read_le::<u32>()?,
            segment: reader.read_le::<u16>()?,
            flags: ProcedureFlags::from_bits_truncate(reader.read_le::<u8>()?),
            name: reader.read_cstring()?,
        })
    }
}

/// `S_PUB32`
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct PublicSymbol {
    pub kind: SymbolRecordKind,
    pub flags: PublicSymbolFlags,
    pub offset: u32,
    pub segment: u16,
    pub name: String,
}

impl PublicSymbol {
    fn read<R: BinaryReader + ?Sized>(reader: &mut R, kind: SymbolRecordKind) -> Result<Self> {
        Ok(PublicSymbol {
            kind,
            flags: PublicSymbolFlags::from_bits_truncate(reader.read_le::<u32>()?),
            offset: reader.read_le::<u32>()?,
            segment: reader.read_le::<u16>()?,
            name: reader.read_cstring()?,
        })
    }
}

/// `S_CONSTANT` and `S_MANCONSTANT`
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct ConstantSymbol {
    pub kind: SymbolRecordKind,
    pub type_index: TypeIndex,
    pub value: Numeric,
    pub name: String,
}

impl ConstantSymbol {
    fn read<R: BinaryReader + ?Sized>(reader: &mut R, kind: SymbolRecordKind) -> Result<Self> {
        Ok(ConstantSymbol {
            kind,
            type_index: reader.read_le::<TypeIndex>()?,
            value: reader.read_numeric()?,
            name: reader.read_cstring()?,
        })
    }
}

/// `S_LDATA32`, `S_GDATA32`, `S_LMANDATA` and `S_GMANDATA`
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct DataSymbol {
    pub kind: SymbolRecordKind,
    pub type_index: TypeIndex,
    pub offset: u32,
    pub segment: u16,
    pub name: String,
}

impl DataSymbol {
    fn read<R: BinaryReader + ?Sized>(reader: &mut R, kind: SymbolRecordKind) -> Result<Self> {
        Ok(DataSymbol {
            kind,
            type_index: reader.read_le::<TypeIndex>()?,
            offset: reader.read_le::<u32>()?,
            segment: reader.read_le::<u16>()?,
            name: reader.read_cstring()?,
        })
    }
}

/// `S_PROCREF` and `S_LPROCREF`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureReferenceSymbol {
    /// Record kind
    pub kind: SymbolRecordKind,
    /// Checksum of the name
    pub sum_name: u32,
    /// Offset of the procedure symbol in the module stream
    pub symbol_offset: u32,
    /// One-based module index
    pub module: u16,
    /// Procedure name
    pub name: String,
}

impl ProcedureReferenceSymbol {
    fn read<R: BinaryReader + ?Sized>(reader: &mut R, kind: SymbolRecordKind) -> Result<Self> {
        Ok(ProcedureReferenceSymbol {
            kind,
            sum_name: reader.read_le::<u32>()?,
            symbol_offset: reader.read_le::<u32>()?,
            module: reader.read_le::<u16>()?,
            name: reader.read_cstring()?,
        })
    }
}

/// `S_UDT` and `S_COBOLUDT`
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct UdtSymbol {
    pub kind: SymbolRecordKind,
    pub type_index: TypeIndex,
    pub name: String,
}

impl UdtSymbol {
    fn read<R: BinaryReader + ?Sized>(reader: &mut R, kind: SymbolRecordKind) -> Result<Self> {
        Ok(UdtSymbol {
            kind,
            type_index: reader.read_le::<TypeIndex>()?,
            name: reader.read_cstring()?,
        })
    }
}

/// `S_LTHREAD32` and `S_GTHREAD32`
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct ThreadLocalDataSymbol {
    pub kind: SymbolRecordKind,
    pub type_index: TypeIndex,
    pub offset: u32,
    pub segment: u16,
    pub name: String,
}

impl ThreadLocalDataSymbol {
    fn read<R: BinaryReader + ?Sized>(reader: &mut R, kind: SymbolRecordKind) -> Result<Self> {
        Ok(ThreadLocalDataSymbol {
            kind,
            type_index: reader.read_le::<TypeIndex>()?,
            offset: reader.read_le::<u32>()?,
            segment: reader.read_le::<u16>()?,
            name: reader.read_cstring()?,
        })
    }
}

/// `S_THUNK32`
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct ThunkSymbol {
    pub kind: SymbolRecordKind,
    pub parent: u32,
    pub end: u32,
    pub next: u32,
    pub offset: u32,
    pub segment: u16,
    pub length: u16,
    /// Raw ordinal, see [`ThunkSymbol::ordinal`]
    pub ordinal: u8,
    pub name: String,
    /// Ordinal specific trailing bytes
    pub variant: Vec<u8>,
}

impl ThunkSymbol {
    fn read<R: BinaryReader + ?Sized>(
        reader: &mut R,
        kind: SymbolRecordKind,
        length: usize,
    ) -> Result<Self> {
        let start = reader.pos();
        let mut thunk = ThunkSymbol {
            kind,
            parent: reader.read_le::<u32>()?,
            end: reader.read_le::<u32>()?,
            next: reader.read_le::<u32>()?,
            offset: reader.read_le::<u32>()?,
            segment: reader.read_le::<u16>()?,
            length: reader.read_le::<u16>()?,
            ordinal: reader.read_le::<u8>()?,
            name: reader.read_cstring()?,
            variant: Vec::new(),
        };

        let consumed = reader.pos() - start;
        if consumed > length {
            return Err(malformed_error!(
                "Thunk symbol decoded {} of {} bytes",
                consumed,
                length
            ));
        }
        thunk.variant = reader.read_byte_array(length - consumed)?;
        Ok(thunk)
    }

    /// The thunk kind, `None` for unknown values
    #[must_use]
    pub fn ordinal(&self) -> Option<ThunkOrdinal> {
        ThunkOrdinal::from_repr(self.ordinal)
    }
}

/// A decoded symbol record
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum SymbolRecord {
    Procedure(ProcedureSymbol),
    Public(PublicSymbol),
    Constant(ConstantSymbol),
    Data(DataSymbol),
    ProcedureReference(ProcedureReferenceSymbol),
    Udt(UdtSymbol),
    ThreadLocalData(ThreadLocalDataSymbol),
    Thunk(ThunkSymbol),
}

impl SymbolRecord {
    /// Decodes a symbol record body of `length` bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::UnknownSymbolRecord`] for kinds without a decoder,
    /// [`crate::Error::Malformed`] if the body decodes past `length` bytes and
    /// [`crate::Error::OutOfBounds`] on truncated input.
    pub fn decode<R: BinaryReader + ?Sized>(
        reader: &mut R,
        kind: u16,
        length: usize,
    ) -> Result<SymbolRecord> {
        let Some(known) = SymbolRecordKind::from_repr(kind) else {
            return Err(Error::UnknownSymbolRecord(kind));
        };

        let start = reader.pos();
        let record = match known {
            SymbolRecordKind::S_GPROC32
            | SymbolRecordKind::S_LPROC32
            | SymbolRecordKind::S_GPROC32_ID
            | SymbolRecordKind::S_LPROC32_ID
            | SymbolRecordKind::S_LPROC32_DPC
            | SymbolRecordKind::S_LPROC32_DPC_ID => {
                SymbolRecord::Procedure(ProcedureSymbol::read(reader, known)?)
            }
            SymbolRecordKind::S_PUB32 => SymbolRecord::Public(PublicSymbol::read(reader, known)?),
            SymbolRecordKind::S_CONSTANT | SymbolRecordKind::S_MANCONSTANT => {
                SymbolRecord::Constant(ConstantSymbol::read(reader, known)?)
            }
            SymbolRecordKind::S_LDATA32
            | SymbolRecordKind::S_GDATA32
            | SymbolRecordKind::S_LMANDATA
            | SymbolRecordKind::S_GMANDATA => SymbolRecord::Data(DataSymbol::read(reader, known)?),
            SymbolRecordKind::S_PROCREF | SymbolRecordKind::S_LPROCREF => {
                SymbolRecord::ProcedureReference(ProcedureReferenceSymbol::read(reader, known)?)
            }
            SymbolRecordKind::S_UDT | SymbolRecordKind::S_COBOLUDT => {
                SymbolRecord::Udt(UdtSymbol::read(reader, known)?)
            }
            SymbolRecordKind::S_LTHREAD32 | SymbolRecordKind::S_GTHREAD32 => {
                SymbolRecord::ThreadLocalData(ThreadLocalDataSymbol::read(reader, known)?)
            }
            SymbolRecordKind::S_THUNK32 => {
                SymbolRecord::Thunk(ThunkSymbol::read(reader, known, length)?)
            }
            SymbolRecordKind::S_DATAREF
            | SymbolRecordKind::S_ANNOTATIONREF
            | SymbolRecordKind::S_TOKENREF => return Err(Error::UnknownSymbolRecord(kind)),
        };

        let consumed = reader.pos() - start;
        if consumed > length {
            return Err(malformed_error!(
                "Symbol 0x{:04x} decoded {} of {} bytes",
                kind,
                consumed,
                length
            ));
        }
        Ok(record)
    }

    /// Record kind
    #[must_use]
    pub fn kind(&self) -> SymbolRecordKind {
        match self {
            SymbolRecord::Procedure(symbol) => symbol.kind,
            SymbolRecord::Public(symbol) => symbol.kind,
            SymbolRecord::Constant(symbol) => symbol.kind,
            SymbolRecord::Data(symbol) => symbol.kind,
            SymbolRecord::ProcedureReference(symbol) => symbol.kind,
            SymbolRecord::Udt(symbol) => symbol.kind,
            SymbolRecord::ThreadLocalData(symbol) => symbol.kind,
            SymbolRecord::Thunk(symbol) => symbol.kind,
        }
    }

    /// Symbol name
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            SymbolRecord::Procedure(symbol) => &symbol.name,
            SymbolRecord::Public(symbol) => &symbol.name,
            SymbolRecord::Constant(symbol) => &symbol.name,
            SymbolRecord::Data(symbol) => &symbol.name,
            SymbolRecord::ProcedureReference(symbol) => &symbol.name,
            SymbolRecord::Udt(symbol) => &symbol.name,
            SymbolRecord::ThreadLocalData(symbol) => &symbol.name,
            SymbolRecord::Thunk(symbol) => &symbol.name,
        }
    }
}
