//! The debug information stream, stream 3.
//!
//! The DBI stream is a header followed by seven substreams, each sized by the header:
//!
//! | Substream              | Contents                                          |
//! |------------------------|---------------------------------------------------|
//! | Module info            | One [`DbiModuleDescriptor`] per compiland         |
//! | Section contributions  | [`SectionContribution`] ranges per module         |
//! | Section map            | [`SectionMapEntry`] logical segments              |
//! | File info              | Source files of every module                      |
//! | Type server map        | Unused by modern toolchains                       |
//! | Edit and continue      | A [`crate::info::PdbStringTable`] of file names   |
//! | Optional debug header  | Stream indexes of the [`DebugStream`]s            |
//!
//! The header also names the symbol record stream every global symbol lives in, see
//! [`DbiStream::symbol_record_stream_index`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use pdbscope::PdbFile;
//! use std::path::Path;
//!
//! let pdb = PdbFile::from_file(Path::new("ntdll.pdb"))?;
//! let dbi = pdb.dbi()?;
//! for module in dbi.modules()? {
//!     println!("{} ({} files)", module.module_name, module.source_files.len());
//! }
//! # Ok::<(), pdbscope::Error>(())
//! ```

pub mod fpo;
pub mod header;
pub mod modules;
pub mod sections;

pub use fpo::{FpoData, FpoFrameType};
pub use header::{DbiFlags, DbiStreamHeader, MachineType, DBI_VERSION_V70};
pub use modules::{DbiModuleDescriptor, ModuleInfoHeader};
pub use sections::{
    CoffSectionHeader, ImageSectionCharacteristics, SectionContribution, SectionContribution2,
    SectionMapEntry, SectionMapEntryFlags, SECTION_CONTRIBUTION_V2, SECTION_CONTRIBUTION_V60,
};

use std::{ops::Range, sync::OnceLock};

use strum::{EnumIter, FromRepr};

use crate::{
    file::{mapped::MappedBlockReader, reader::BinaryReader},
    info::PdbStringTable,
    msf::{stream::PdbStream, INVALID_STREAM_INDEX},
    Result,
};

/// Slots of the optional debug header, each holding a stream index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, EnumIter)]
#[repr(u8)]
pub enum DebugStream {
    /// `FPO_DATA` records
    Fpo = 0,
    /// Exception data
    Exception = 1,
    /// Fixup data
    Fixup = 2,
    /// OMAP to the original source addresses
    OmapToSrc = 3,
    /// OMAP from the original source addresses
    OmapFromSrc = 4,
    /// Section headers of the image
    SectionHdr = 5,
    /// Token to record id map
    TokenRidMap = 6,
    /// Copy of `.xdata`
    Xdata = 7,
    /// Copy of `.pdata`
    Pdata = 8,
    /// New style frame data
    NewFpo = 9,
    /// Section headers before OMAP reordering
    SectionHdrOrig = 10,
}

/// Byte ranges of the substreams inside the DBI stream
#[derive(Debug, Clone, Default)]
struct Substreams {
    module_info: Range<usize>,
    section_contributions: Range<usize>,
    section_map: Range<usize>,
    file_info: Range<usize>,
    type_server_map: Range<usize>,
    ec: Range<usize>,
}

/// Contribution entries in whichever layout the file uses
#[derive(Debug, Clone)]
enum Contributions {
    V60(Vec<SectionContribution>),
    V2(Vec<SectionContribution2>),
}

/// The parsed DBI stream.
///
/// Construction validates the header and the substream layout and reads the debug stream
/// indexes. Every substream is decoded on first use and kept afterwards.
pub struct DbiStream {
    stream: PdbStream,
    header: DbiStreamHeader,
    substreams: Substreams,
    debug_streams: Vec<u16>,
    streams: Vec<PdbStream>,
    modules: OnceLock<Vec<DbiModuleDescriptor>>,
    contributions: OnceLock<Contributions>,
    section_map: OnceLock<Vec<SectionMapEntry>>,
    section_headers: OnceLock<Option<Vec<CoffSectionHeader>>>,
    original_section_headers: OnceLock<Option<Vec<CoffSectionHeader>>>,
    fpo_records: OnceLock<Option<Vec<FpoData>>>,
    ec_names: OnceLock<Option<PdbStringTable>>,
}

impl DbiStream {
    /// Parses the header of `stream` and validates the substream layout.
    ///
    /// # Arguments
    /// * `stream` - The DBI stream
    /// * `streams` - Every stream of the file, used to resolve the debug streams
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the header is invalid, the substream sizes do
    /// not add up to the stream length or a 4-byte aligned substream is not aligned.
    #[tracing::instrument(level = "trace", skip_all, fields(stream = stream.index()))]
    pub fn new(stream: PdbStream, streams: &[PdbStream]) -> Result<DbiStream> {
        let mut reader = stream.reader();
        let header = DbiStreamHeader::read(&mut reader)?;

        let sizes = header.substream_sizes().map(|size| size as usize);
        let expected = DbiStreamHeader::SIZE + sizes.iter().sum::<usize>();
        if expected != stream.len() {
            return Err(malformed_error!(
                "DBI stream length {} does not match its substreams ({})",
                stream.len(),
                expected
            ));
        }

        let aligned = [
            ("module info", header.module_info_size),
            ("section contribution", header.section_contribution_size),
            ("section map", header.section_map_size),
            ("file info", header.file_info_size),
            ("type server map", header.type_server_map_size),
        ];
        for (name, size) in aligned {
            if size % 4 != 0 {
                return Err(malformed_error!(
                    "DBI {} substream size {} is not 4-byte aligned",
                    name,
                    size
                ));
            }
        }

        let mut offset = DbiStreamHeader::SIZE;
        let mut next = |size: usize| {
            let range = offset..offset + size;
            offset += size;
            range
        };
        let substreams = Substreams {
            module_info: next(sizes[0]),
            section_contributions: next(sizes[1]),
            section_map: next(sizes[2]),
            file_info: next(sizes[3]),
            type_server_map: next(sizes[4]),
            ec: next(sizes[5]),
        };

        reader.seek(substreams.ec.end)?;
        let debug_streams = reader.read_u16_array(sizes[6] / 2)?;
        if reader.has_more_data() {
            return Err(malformed_error!(
                "DBI stream has {} unexpected trailing bytes",
                reader.remaining()
            ));
        }

        tracing::trace!(
            version = header.version,
            machine = header.machine,
            debug_streams = debug_streams.len(),
            "parsed DBI header"
        );

        Ok(DbiStream {
            stream,
            header,
            substreams,
            debug_streams,
            streams: streams.to_vec(),
            modules: OnceLock::new(),
            contributions: OnceLock::new(),
            section_map: OnceLock::new(),
            section_headers: OnceLock::new(),
            original_section_headers: OnceLock::new(),
            fpo_records: OnceLock::new(),
            ec_names: OnceLock::new(),
        })
    }

    /// The validated stream header
    #[must_use]
    pub fn header(&self) -> &DbiStreamHeader {
        &self.header
    }

    /// Stream holding the global symbol records
    #[must_use]
    pub fn symbol_record_stream_index(&self) -> u16 {
        self.header.symbol_record_stream_index
    }

    /// Target machine of the image, `None` for unknown values
    #[must_use]
    pub fn machine(&self) -> Option<MachineType> {
        self.header.machine()
    }

    /// Raw stream indexes of the optional debug header, in slot order
    #[must_use]
    pub fn debug_stream_indexes(&self) -> &[u16] {
        &self.debug_streams
    }

    fn substream(&self, range: &Range<usize>) -> Result<MappedBlockReader<'_>> {
        self.stream.reader().substream(range.start, range.len())
    }

    /// Raw bytes of the type server map substream
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the stream blocks are truncated.
    pub fn type_server_map(&self) -> Result<Vec<u8>> {
        let range = &self.substreams.type_server_map;
        self.substream(range)?.read_byte_array(range.len())
    }

    /// Every module descriptor with its source files.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the module and file info substreams disagree
    /// on the number of modules.
    pub fn modules(&self) -> Result<&[DbiModuleDescriptor]> {
        if let Some(modules) = self.modules.get() {
            return Ok(modules);
        }

        let mut module_info = self.substream(&self.substreams.module_info)?;
        let mut file_info = self.substream(&self.substreams.file_info)?;
        let modules = modules::read_modules(&mut module_info, &mut file_info)?;
        tracing::debug!(modules = modules.len(), "read DBI modules");

        Ok(self.modules.get_or_init(|| modules))
    }

    fn contributions(&self) -> Result<&Contributions> {
        if let Some(contributions) = self.contributions.get() {
            return Ok(contributions);
        }

        let range = &self.substreams.section_contributions;
        let mut reader = self.substream(range)?;
        let contributions = if range.is_empty() {
            Contributions::V60(Vec::new())
        } else {
            match reader.read_le::<u32>()? {
                SECTION_CONTRIBUTION_V60 => {
                    let count = reader.remaining() / SectionContribution::SIZE;
                    Contributions::V60(
                        (0..count)
                            .map(|_| SectionContribution::read(&mut reader))
                            .collect::<Result<_>>()?,
                    )
                }
                SECTION_CONTRIBUTION_V2 => {
                    let count = reader.remaining() / SectionContribution2::SIZE;
                    Contributions::V2(
                        (0..count)
                            .map(|_| SectionContribution2::read(&mut reader))
                            .collect::<Result<_>>()?,
                    )
                }
                version => {
                    return Err(malformed_error!(
                        "Unsupported section contribution version 0x{:08x}",
                        version
                    ))
                }
            }
        };

        Ok(self.contributions.get_or_init(|| contributions))
    }

    /// Section contributions in the common layout, V2 entries are reduced to their base.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for an unknown substream version.
    pub fn section_contributions(&self) -> Result<Vec<SectionContribution>> {
        Ok(match self.contributions()? {
            Contributions::V60(entries) => entries.clone(),
            Contributions::V2(entries) => entries.iter().map(|entry| entry.base).collect(),
        })
    }

    /// Section contributions with COFF section indexes, `None` if the file uses the V60
    /// layout.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for an unknown substream version.
    pub fn section_contributions2(&self) -> Result<Option<&[SectionContribution2]>> {
        Ok(match self.contributions()? {
            Contributions::V60(_) => None,
            Contributions::V2(entries) => Some(entries.as_slice()),
        })
    }

    /// Logical segments of the section map.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the segment count exceeds the substream.
    pub fn section_map(&self) -> Result<&[SectionMapEntry]> {
        if let Some(entries) = self.section_map.get() {
            return Ok(entries);
        }

        let range = &self.substreams.section_map;
        let mut reader = self.substream(range)?;
        let entries = if range.is_empty() {
            Vec::new()
        } else {
            let count = reader.read_le::<u16>()?;
            let _logical_count = reader.read_le::<u16>()?;
            (0..count)
                .map(|_| SectionMapEntry::read(&mut reader))
                .collect::<Result<Vec<_>>>()?
        };

        Ok(self.section_map.get_or_init(|| entries))
    }

    /// File name table of the edit and continue substream, `None` if it is empty.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for an invalid string table header.
    pub fn ec_names(&self) -> Result<Option<&PdbStringTable>> {
        if let Some(names) = self.ec_names.get() {
            return Ok(names.as_ref());
        }

        let range = &self.substreams.ec;
        let names = if range.is_empty() {
            None
        } else {
            Some(PdbStringTable::read(&mut self.substream(range)?)?)
        };

        Ok(self.ec_names.get_or_init(|| names).as_ref())
    }

    /// The stream referenced by debug header slot `slot`.
    ///
    /// `None` if the header has no such slot, the slot is empty, or it points past the end
    /// of the stream directory.
    #[must_use]
    pub fn debug_stream(&self, slot: DebugStream) -> Option<&PdbStream> {
        let index = *self.debug_streams.get(slot as usize)?;
        if index == INVALID_STREAM_INDEX {
            return None;
        }

        let stream = self.streams.get(index as usize);
        if stream.is_none() {
            tracing::warn!(?slot, index, "debug stream index is out of range");
        }
        stream
    }

    fn read_debug_records<T>(
        &self,
        slot: DebugStream,
        size: usize,
        read: fn(&mut MappedBlockReader<'_>) -> Result<T>,
    ) -> Result<Option<Vec<T>>> {
        let Some(stream) = self.debug_stream(slot) else {
            return Ok(None);
        };
        if stream.len() % size != 0 {
            return Err(malformed_error!(
                "Debug stream {:?} length {} is not a multiple of {}",
                slot,
                stream.len(),
                size
            ));
        }

        let mut reader = stream.reader();
        let records = (0..stream.len() / size)
            .map(|_| read(&mut reader))
            .collect::<Result<Vec<_>>>()?;
        Ok(Some(records))
    }

    /// Section headers of the image, `None` if the file does not carry them.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the stream length is not a multiple of
    /// [`CoffSectionHeader::SIZE`].
    pub fn section_headers(&self) -> Result<Option<&[CoffSectionHeader]>> {
        if let Some(headers) = self.section_headers.get() {
            return Ok(headers.as_deref());
        }

        let headers = self.read_debug_records(
            DebugStream::SectionHdr,
            CoffSectionHeader::SIZE,
            |reader| CoffSectionHeader::read(reader),
        )?;
        Ok(self.section_headers.get_or_init(|| headers).as_deref())
    }

    /// Section headers before OMAP reordering, `None` if the image was not reordered.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the stream length is not a multiple of
    /// [`CoffSectionHeader::SIZE`].
    pub fn original_section_headers(&self) -> Result<Option<&[CoffSectionHeader]>> {
        if let Some(headers) = self.original_section_headers.get() {
            return Ok(headers.as_deref());
        }

        let headers = self.read_debug_records(
            DebugStream::SectionHdrOrig,
            CoffSectionHeader::SIZE,
            |reader| CoffSectionHeader::read(reader),
        )?;
        Ok(self.original_section_headers.get_or_init(|| headers).as_deref())
    }

    /// Frame pointer omission records, `None` if the file does not carry them.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the stream length is not a multiple of
    /// [`FpoData::SIZE`].
    pub fn fpo_records(&self) -> Result<Option<&[FpoData]>> {
        if let Some(records) = self.fpo_records.get() {
            return Ok(records.as_deref());
        }

        let records =
            self.read_debug_records(DebugStream::Fpo, FpoData::SIZE, |reader| FpoData::read(reader))?;
        Ok(self.fpo_records.get_or_init(|| records).as_deref())
    }
}

impl std::fmt::Debug for DbiStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbiStream")
            .field("stream", &self.stream.index())
            .field("header", &self.header)
            .field("substreams", &self.substreams)
            .field("debug_streams", &self.debug_streams)
            .finish_non_exhaustive()
    }
}
