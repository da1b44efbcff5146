//! The PDB info stream: version, identity, named stream map and feature codes.

use strum::FromRepr;

use crate::{
    file::{parser::Parser, reader::BinaryReader},
    utils::hashtable::HashTable,
    Result,
};

/// Oldest info stream version accepted, Visual C++ 7.0
pub const PDB_IMPL_VC70: u32 = 20_000_404;

/// Optional capabilities listed after the named stream map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr)]
#[repr(u32)]
pub enum PdbFeature {
    /// Written by Visual C++ 11.0 or newer
    Vc110 = 20_091_201,
    /// Written by Visual C++ 14.0 or newer, the IPI stream is present
    Vc140 = 20_140_508,
    /// Types were not merged into the TPI stream
    NoTypeMerge = 0x4D54_4F4E,
    /// Linked with `/DEBUG:FASTLINK`
    MinimalDebugInfo = 0x494E_494D,
}

/// The PDB info stream, stream 1.
///
/// Identifies the file through its signature, age and GUID, and maps names such as
/// `"/names"` to stream indexes.
#[derive(Debug)]
pub struct PdbInfoStream {
    /// Format version
    pub version: u32,
    /// Time stamp of the last write
    pub signature: u32,
    /// Incremented on every write
    pub age: u32,
    /// Matches the GUID in the debug directory of the image
    pub guid: uguid::Guid,
    names: Vec<u8>,
    named_streams: HashTable,
    features: Vec<u32>,
}

impl PdbInfoStream {
    /// Parses the info stream.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for versions older than [`PDB_IMPL_VC70`] or a
    /// corrupt named stream map, and [`crate::Error::OutOfBounds`] on truncated input.
    pub fn read<R: BinaryReader + ?Sized>(reader: &mut R) -> Result<PdbInfoStream> {
        let version = reader.read_le::<u32>()?;
        if version < PDB_IMPL_VC70 {
            return Err(malformed_error!("Unsupported PDB stream version {}", version));
        }
        let signature = reader.read_le::<u32>()?;
        let age = reader.read_le::<u32>()?;

        let mut guid = [0_u8; 16];
        reader.read_into(&mut guid)?;

        let names_size = reader.read_le::<u32>()? as usize;
        let names = reader.read_byte_array(names_size)?;
        let named_streams = HashTable::read(reader)?;

        let mut features = Vec::new();
        while reader.remaining() >= 4 {
            features.push(reader.read_le::<u32>()?);
        }

        Ok(PdbInfoStream {
            version,
            signature,
            age,
            guid: uguid::Guid::from_bytes(guid),
            names,
            named_streams,
            features,
        })
    }

    /// Stream index registered under `name`, e.g. `"/names"`
    #[must_use]
    pub fn named_stream(&self, name: &str) -> Option<u32> {
        self.named_streams.entries().find_map(|(offset, stream)| {
            (self.name_at(offset).as_deref() == Some(name)).then_some(stream)
        })
    }

    /// All `(name, stream index)` pairs of the named stream map
    #[must_use]
    pub fn named_streams(&self) -> Vec<(String, u32)> {
        self.named_streams
            .entries()
            .filter_map(|(offset, stream)| Some((self.name_at(offset)?, stream)))
            .collect()
    }

    fn name_at(&self, offset: u32) -> Option<String> {
        let mut parser = Parser::new(&self.names);
        parser.seek(offset as usize).ok()?;
        parser.read_cstring().ok()
    }

    /// Raw feature codes in file order
    #[must_use]
    pub fn feature_codes(&self) -> &[u32] {
        &self.features
    }

    /// Returns `true` if the file lists `feature`
    #[must_use]
    pub fn has_feature(&self, feature: PdbFeature) -> bool {
        self.features.contains(&(feature as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn info(version: u32) -> Vec<u8> {
        let mut data = Vec::new();
        for value in [version, 0x5F00_0000, 3] {
            data.extend_from_slice(&value.to_le_bytes());
        }
        data.extend_from_slice(&[
            0x8e, 0x90, 0x37, 0xd4, 0xe6, 0x65, 0x7c, 0x48, 0x97, 0x35, 0x7b, 0xdf, 0xf6, 0x99,
            0xbe, 0xa5,
        ]);

        let names = b"/names\0/LinkInfo\0";
        data.extend_from_slice(&(names.len() as u32).to_le_bytes());
        data.extend_from_slice(names);
        // size 2, capacity 4, present {0, 2}, no deleted words
        for value in [2_u32, 4, 1, 0b101, 0, 0, 6, 7, 5] {
            data.extend_from_slice(&value.to_le_bytes());
        }
        data.extend_from_slice(&(PdbFeature::Vc140 as u32).to_le_bytes());
        data
    }

    #[test]
    fn crafted() {
        let data = info(20_000_404);
        let stream = PdbInfoStream::read(&mut Parser::new(&data)).unwrap();

        assert_eq!(stream.version, PDB_IMPL_VC70);
        assert_eq!(stream.age, 3);
        assert_eq!(
            stream.guid,
            uguid::guid!("d437908e-65e6-487c-9735-7bdff699bea5")
        );
        assert_eq!(stream.named_stream("/names"), Some(6));
        assert_eq!(stream.named_stream("/LinkInfo"), Some(5));
        assert_eq!(stream.named_stream("/src/headerblock"), None);
        assert_eq!(stream.named_streams().len(), 2);
        assert!(stream.has_feature(PdbFeature::Vc140));
        assert!(!stream.has_feature(PdbFeature::NoTypeMerge));
    }

    #[test]
    fn crafted_invalid() {
        let data = info(19_990_604);
        assert!(matches!(
            PdbInfoStream::read(&mut Parser::new(&data)),
            Err(Error::Malformed { .. })
        ));

        let data = info(20_000_404);
        assert!(PdbInfoStream::read(&mut Parser::new(&data[..40])).is_err());
    }
}
