//! The global symbol record stream named by the DBI header.

use std::sync::Arc;

use dashmap::DashMap;

use crate::{
    file::reader::BinaryReader,
    msf::stream::PdbStream,
    symbols::{kind::SymbolRecordKind, records::SymbolRecord},
    Result,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SymbolReference {
    data_offset: usize,
    data_length: usize,
    kind: u16,
}

/// The global symbol record stream.
///
/// Construction only walks the record prefixes. Bodies are decoded per kind on the first
/// request for that kind and kept, later requests for the same kind share the decoded slice.
///
/// # Examples
///
/// ```rust,no_run
/// use pdbscope::{symbols::{SymbolRecord, SymbolRecordKind}, PdbFile};
/// use std::path::Path;
///
/// let pdb = PdbFile::from_file(Path::new("ntdll.pdb"))?;
/// for symbol in pdb.symbols()?.symbols(SymbolRecordKind::S_GDATA32)?.iter() {
///     println!("{}", symbol.name());
/// }
/// # Ok::<(), pdbscope::Error>(())
/// ```
pub struct SymbolStream {
    stream: PdbStream,
    references: Vec<SymbolReference>,
    by_kind: DashMap<SymbolRecordKind, Arc<[SymbolRecord]>>,
}

impl SymbolStream {
    /// Scans the record prefixes of `stream`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for a record shorter than its kind field and
    /// [`crate::Error::OutOfBounds`] for a record running past the end of the stream.
    #[tracing::instrument(level = "trace", skip_all, fields(stream = stream.index()))]
    pub fn new(stream: PdbStream) -> Result<SymbolStream> {
        let mut reader = stream.reader();
        let mut references = Vec::new();

        while reader.has_more_data() {
            let record_length = reader.read_le::<u16>()? as usize;
            if record_length < 2 {
                return Err(malformed_error!(
                    "CV corrupt record at offset {}",
                    reader.pos() - 2
                ));
            }
            let kind = reader.read_le::<u16>()?;
            let data_length = record_length - 2;

            references.push(SymbolReference {
                data_offset: reader.pos(),
                data_length,
                kind,
            });
            reader.skip(data_length)?;
        }

        tracing::trace!(records = references.len(), "scanned symbol records");

        Ok(SymbolStream {
            stream,
            references,
            by_kind: DashMap::new(),
        })
    }

    /// Number of records in the stream
    #[must_use]
    pub fn len(&self) -> usize {
        self.references.len()
    }

    /// Returns `true` if the stream holds no records
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    /// Raw kind of every record, in stream order
    pub fn kinds(&self) -> impl Iterator<Item = u16> + '_ {
        self.references.iter().map(|reference| reference.kind)
    }

    /// All records of `kind`, in stream order.
    ///
    /// # Errors
    /// Returns [`crate::Error::UnknownSymbolRecord`] if the stream contains records of a kind
    /// without a decoder, plus any decoding error of [`SymbolRecord::decode`].
    pub fn symbols(&self, kind: SymbolRecordKind) -> Result<Arc<[SymbolRecord]>> {
        if let Some(symbols) = self.by_kind.get(&kind) {
            return Ok(symbols.clone());
        }

        let reader = self.stream.reader();
        let mut symbols = Vec::new();
        for reference in self
            .references
            .iter()
            .filter(|reference| reference.kind == kind as u16)
        {
            let mut body = reader.substream(reference.data_offset, reference.data_length)?;
            symbols.push(SymbolRecord::decode(
                &mut body,
                reference.kind,
                reference.data_length,
            )?);
        }

        Ok(self
            .by_kind
            .entry(kind)
            .or_insert_with(|| symbols.into())
            .clone())
    }
}

impl std::fmt::Debug for SymbolStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymbolStream")
            .field("stream", &self.stream.index())
            .field("records", &self.references.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        symbols::records::UdtSymbol,
        test::{record, scattered_streams},
        tpi::TypeIndex,
        Error,
    };

    fn stream(contents: &[u8]) -> PdbStream {
        scattered_streams(&[contents.to_vec()]).remove(0)
    }

    fn udt(type_index: u32, name: &str) -> Vec<u8> {
        let mut body = type_index.to_le_bytes().to_vec();
        body.extend_from_slice(name.as_bytes());
        body.push(0);
        record(SymbolRecordKind::S_UDT as u16, &body)
    }

    #[test]
    fn scan_and_decode_by_kind() {
        let mut data = udt(0x1000, "Foo");
        // Unknown kind, skipped by the scan
        data.extend(record(0x1139, &[1, 2, 3, 4]));
        data.extend(udt(0x1002, "Bar"));
        let symbols = SymbolStream::new(stream(&data)).unwrap();

        assert_eq!(symbols.len(), 3);
        assert_eq!(symbols.kinds().collect::<Vec<_>>(), vec![0x1108, 0x1139, 0x1108]);

        let udts = symbols.symbols(SymbolRecordKind::S_UDT).unwrap();
        assert_eq!(
            udts[1],
            SymbolRecord::Udt(UdtSymbol {
                kind: SymbolRecordKind::S_UDT,
                type_index: TypeIndex(0x1002),
                name: "Bar".to_string(),
            })
        );
        assert!(Arc::ptr_eq(
            &udts,
            &symbols.symbols(SymbolRecordKind::S_UDT).unwrap()
        ));
        assert!(symbols.symbols(SymbolRecordKind::S_PUB32).unwrap().is_empty());
    }

    #[test]
    fn unknown_kind_on_request() {
        let mut data = udt(0x1000, "Foo");
        data.extend(record(SymbolRecordKind::S_TOKENREF as u16, &[0; 8]));
        let symbols = SymbolStream::new(stream(&data)).unwrap();

        assert!(symbols.symbols(SymbolRecordKind::S_UDT).is_ok());
        assert!(matches!(
            symbols.symbols(SymbolRecordKind::S_TOKENREF),
            Err(Error::UnknownSymbolRecord(0x1129))
        ));
    }

    #[test]
    fn unterminated_name() {
        let data_symbol = |name: &[u8]| {
            let mut body = 0x74_u32.to_le_bytes().to_vec();
            body.extend_from_slice(&0x40_u32.to_le_bytes());
            body.extend_from_slice(&2_u16.to_le_bytes());
            body.extend_from_slice(name);
            record(SymbolRecordKind::S_GDATA32 as u16, &body)
        };
        let mut data = data_symbol(b"abc");
        data.extend(data_symbol(b"zz\0"));
        let symbols = SymbolStream::new(stream(&data)).unwrap();

        assert_eq!(symbols.len(), 2);
        assert!(matches!(
            symbols.symbols(SymbolRecordKind::S_GDATA32),
            Err(Error::OutOfBounds { .. })
        ));
    }

    #[test]
    fn corrupt_prefix() {
        let mut data = udt(0x1000, "Foo");
        data.extend_from_slice(&[0x00, 0x00, 0x08, 0x11]);
        assert!(matches!(
            SymbolStream::new(stream(&data)),
            Err(Error::Malformed { .. })
        ));

        let mut data = udt(0x1000, "Foo");
        data.extend_from_slice(&[0x10, 0x00, 0x08, 0x11]);
        assert!(matches!(
            SymbolStream::new(stream(&data)),
            Err(Error::OutOfBounds { .. })
        ));
    }
}
