//! Scanning and lazily decoding the records of a TPI or IPI stream.

use std::sync::OnceLock;

use crate::{
    config::UnknownRecordPolicy,
    file::{mapped::MappedBlockReader, reader::BinaryReader},
    msf::{stream::PdbStream, INVALID_STREAM_INDEX},
    records::{TypeLeafKind, TypeRecord},
    tpi::{
        header::TpiStreamHeader,
        typeindex::{TypeIndex, TypeIndexOffset},
    },
    utils::hashtable::HashTable,
    Result,
};

/// Location of one record inside the record area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RecordReference {
    data_offset: usize,
    data_length: usize,
    kind: u16,
}

/// A TPI or IPI stream.
///
/// Construction validates the header and scans the record area once, remembering where each
/// record starts, its kind and its body length. Bodies are decoded on first access and kept
/// for the lifetime of the stream, so repeated lookups of the same index return the same
/// [`TypeRecord`] instance.
///
/// # Examples
///
/// ```rust,no_run
/// use pdbscope::{records::TypeLeafKind, PdbFile};
/// use std::path::Path;
///
/// let pdb = PdbFile::from_file(Path::new("ntdll.pdb"))?;
/// let tpi = pdb.tpi()?;
/// for index in tpi.indexes(TypeLeafKind::LF_STRUCTURE) {
///     println!("{index} {:?}", tpi.record(index)?);
/// }
/// # Ok::<(), pdbscope::Error>(())
/// ```
pub struct TpiStream {
    stream: PdbStream,
    header: TpiStreamHeader,
    hash_stream: Option<PdbStream>,
    policy: UnknownRecordPolicy,
    references: Vec<RecordReference>,
    records: Vec<OnceLock<TypeRecord>>,
    hash_values: OnceLock<Vec<u32>>,
    type_index_offsets: OnceLock<Vec<TypeIndexOffset>>,
    hash_adjusters: OnceLock<Option<HashTable>>,
}

impl TpiStream {
    /// Parses the header and scans the record area of `stream`.
    ///
    /// # Arguments
    /// * `stream` - The TPI or IPI stream
    /// * `streams` - Every stream of the file, used to locate the hash stream
    /// * `policy` - How record kinds without a decoder are handled
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for an invalid header, a record shorter than its
    /// kind field, or a hash stream index past the end of the directory.
    #[tracing::instrument(level = "trace", skip_all, fields(stream = stream.index()))]
    pub fn new(
        stream: PdbStream,
        streams: &[PdbStream],
        policy: UnknownRecordPolicy,
    ) -> Result<TpiStream> {
        let mut reader = stream.reader();
        let header = TpiStreamHeader::read(&mut reader)?;

        let mut area = reader.read_substream(header.type_record_bytes as usize)?;
        let mut references = Vec::new();
        while area.has_more_data() {
            let record_length = area.read_le::<u16>()? as usize;
            if record_length < 2 {
                return Err(malformed_error!(
                    "CV corrupt record at offset {}",
                    area.pos() - 2
                ));
            }
            let kind = area.read_le::<u16>()?;
            let data_length = record_length - 2;

            references.push(RecordReference {
                data_offset: area.pos(),
                data_length,
                kind,
            });
            area.skip(data_length)?;
        }

        let hash_stream = if header.hash_stream_index == INVALID_STREAM_INDEX {
            None
        } else {
            let Some(hash_stream) = streams.get(header.hash_stream_index as usize) else {
                return Err(malformed_error!(
                    "Invalid TPI hash stream index {}",
                    header.hash_stream_index
                ));
            };
            Some(hash_stream.clone())
        };

        tracing::trace!(records = references.len(), "scanned type records");

        let records = (0..references.len()).map(|_| OnceLock::new()).collect();
        Ok(TpiStream {
            stream,
            header,
            hash_stream,
            policy,
            references,
            records,
            hash_values: OnceLock::new(),
            type_index_offsets: OnceLock::new(),
            hash_adjusters: OnceLock::new(),
        })
    }

    /// The validated stream header
    #[must_use]
    pub fn header(&self) -> &TpiStreamHeader {
        &self.header
    }

    /// The underlying MSF stream
    #[must_use]
    pub fn stream(&self) -> &PdbStream {
        &self.stream
    }

    /// Number of records found by the scan
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.references.len()
    }

    /// A reader over the record area, positioned at its first record
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the stream is shorter than the header claims.
    pub fn records_reader(&self) -> Result<MappedBlockReader<'_>> {
        self.stream.reader().substream(
            self.header.header_size as usize,
            self.header.type_record_bytes as usize,
        )
    }

    /// Raw kind of the record at `array_index`
    #[must_use]
    pub fn kind_at(&self, array_index: usize) -> Option<u16> {
        self.references.get(array_index).map(|reference| reference.kind)
    }

    /// Returns the record referenced by `index`, decoding it on first access.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for simple indexes and indexes past the last
    /// record, plus any decoding error of [`TypeRecord::decode`].
    pub fn record(&self, index: TypeIndex) -> Result<&TypeRecord> {
        let Some(array_index) = index.array_index() else {
            return Err(malformed_error!(
                "Type index {} does not reference a record",
                index
            ));
        };
        self.record_at(array_index as usize)
    }

    /// Returns the record at position `array_index`, decoding it on first access.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `array_index` is past the last record, plus any
    /// decoding error of [`TypeRecord::decode`].
    pub fn record_at(&self, array_index: usize) -> Result<&TypeRecord> {
        let (Some(reference), Some(slot)) = (
            self.references.get(array_index),
            self.records.get(array_index),
        ) else {
            return Err(malformed_error!(
                "Type index {} is out of range",
                TypeIndex::from_array_index(array_index as u32)
            ));
        };

        if let Some(record) = slot.get() {
            return Ok(record);
        }

        let mut reader = self.records_reader()?;
        reader.seek(reference.data_offset)?;
        let record =
            TypeRecord::decode(&mut reader, reference.kind, reference.data_length, self.policy)?;

        Ok(slot.get_or_init(|| record))
    }

    /// Type indexes of all records of `kind`, in stream order.
    pub fn indexes(&self, kind: TypeLeafKind) -> impl Iterator<Item = TypeIndex> + '_ {
        self.references
            .iter()
            .enumerate()
            .filter(move |(_, reference)| reference.kind == kind as u16)
            .map(|(array_index, _)| TypeIndex::from_array_index(array_index as u32))
    }

    /// All records of `kind`, decoded, in stream order.
    ///
    /// # Errors
    /// Returns the first decoding error encountered.
    pub fn records_of_kind(&self, kind: TypeLeafKind) -> Result<Vec<&TypeRecord>> {
        self.indexes(kind).map(|index| self.record(index)).collect()
    }

    fn hash_reader(&self) -> Option<MappedBlockReader<'_>> {
        self.hash_stream.as_ref().map(PdbStream::reader)
    }

    /// Hash value of every record, empty if the file has none.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the number of hash values is neither zero nor
    /// the number of records.
    pub fn hash_values(&self) -> Result<&[u32]> {
        if let Some(values) = self.hash_values.get() {
            return Ok(values);
        }

        let values = match self.hash_reader() {
            Some(mut reader) => {
                let buffer = self.header.hash_value_buffer;
                let count = (buffer.length / 4) as usize;
                if count != self.references.len() && count != 0 {
                    return Err(malformed_error!(
                        "TPI hash count {} does not match the {} type records",
                        count,
                        self.references.len()
                    ));
                }
                reader.seek(buffer.position()?)?;
                reader.read_u32_array(count)?
            }
            None => Vec::new(),
        };

        Ok(self.hash_values.get_or_init(|| values))
    }

    /// Offsets of every n-th record, used to seek close to a record without a full scan.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the buffer exceeds the hash stream.
    pub fn type_index_offsets(&self) -> Result<&[TypeIndexOffset]> {
        if let Some(offsets) = self.type_index_offsets.get() {
            return Ok(offsets);
        }

        let offsets = match self.hash_reader() {
            Some(mut reader) => {
                let buffer = self.header.index_offset_buffer;
                reader.seek(buffer.position()?)?;
                (0..buffer.length as usize / TypeIndexOffset::SIZE)
                    .map(|_| TypeIndexOffset::read(&mut reader))
                    .collect::<Result<Vec<_>>>()?
            }
            None => Vec::new(),
        };

        Ok(self.type_index_offsets.get_or_init(|| offsets))
    }

    /// The hash adjuster table, `None` if the file has none.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the table violates its invariants.
    pub fn hash_adjusters(&self) -> Result<Option<&HashTable>> {
        if let Some(table) = self.hash_adjusters.get() {
            return Ok(table.as_ref());
        }

        let buffer = self.header.hash_adjusters_buffer;
        let table = match self.hash_reader() {
            Some(mut reader) if buffer.length > 0 => {
                reader.seek(buffer.position()?)?;
                Some(HashTable::read(&mut reader)?)
            }
            _ => None,
        };

        Ok(self.hash_adjusters.get_or_init(|| table).as_ref())
    }
}

impl std::fmt::Debug for TpiStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TpiStream")
            .field("stream", &self.stream.index())
            .field("header", &self.header)
            .field("records", &self.references.len())
            .finish_non_exhaustive()
    }
}
