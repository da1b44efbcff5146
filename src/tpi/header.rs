//! TPI and IPI stream header.
//!
//! The header is 56 bytes: version, header size, the index range `[type_index_begin,
//! type_index_end)`, the byte length of the record area, and the location of the optional
//! hash stream with its hash value, index offset and adjuster buffers.

use crate::{file::reader::BinaryReader, Result};

/// TPI/IPI format version written by every toolchain since Visual C++ 8.0
pub const TPI_VERSION_V80: u32 = 20_040_203;
/// Lowest accepted number of hash buckets
pub const MIN_TPI_HASH_BUCKETS: u32 = 0x1000;
/// Highest accepted number of hash buckets
pub const MAX_TPI_HASH_BUCKETS: u32 = 0x40000;

/// A `(offset, length)` range inside the hash stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EmbeddedBuffer {
    /// Offset into the hash stream
    pub offset: i32,
    /// Length in bytes
    pub length: u32,
}

impl EmbeddedBuffer {
    fn read<R: BinaryReader + ?Sized>(reader: &mut R) -> Result<EmbeddedBuffer> {
        Ok(EmbeddedBuffer {
            offset: reader.read_le::<i32>()?,
            length: reader.read_le::<u32>()?,
        })
    }

    /// The offset as an unsigned position.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for negative offsets.
    pub fn position(&self) -> Result<usize> {
        usize::try_from(self.offset)
            .map_err(|_| malformed_error!("Negative hash buffer offset {}", self.offset))
    }
}

/// The 56-byte header of the TPI and IPI streams
///
/// ## Layout
///
/// | Offset | Size | Field                    |
/// |--------|------|--------------------------|
/// | 0x00   | 4    | `version`                |
/// | 0x04   | 4    | `header_size`            |
/// | 0x08   | 4    | `type_index_begin`       |
/// | 0x0C   | 4    | `type_index_end`         |
/// | 0x10   | 4    | `type_record_bytes`      |
/// | 0x14   | 2    | `hash_stream_index`      |
/// | 0x16   | 2    | `hash_aux_stream_index`  |
/// | 0x18   | 4    | `hash_key_size`          |
/// | 0x1C   | 4    | `hash_buckets_count`     |
/// | 0x20   | 8    | `hash_value_buffer`      |
/// | 0x28   | 8    | `index_offset_buffer`    |
/// | 0x30   | 8    | `hash_adjusters_buffer`  |
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct TpiStreamHeader {
    pub version: u32,
    pub header_size: u32,
    pub type_index_begin: u32,
    pub type_index_end: u32,
    pub type_record_bytes: u32,
    pub hash_stream_index: u16,
    pub hash_aux_stream_index: u16,
    pub hash_key_size: u32,
    pub hash_buckets_count: u32,
    pub hash_value_buffer: EmbeddedBuffer,
    pub index_offset_buffer: EmbeddedBuffer,
    pub hash_adjusters_buffer: EmbeddedBuffer,
}

impl TpiStreamHeader {
    /// Encoded size
    pub const SIZE: usize = 56;

    /// Reads and validates the header.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for an unsupported version, an unexpected header
    /// size, a hash key size other than 4 or a bucket count outside
    /// [`MIN_TPI_HASH_BUCKETS`]..=[`MAX_TPI_HASH_BUCKETS`].
    pub fn read<R: BinaryReader + ?Sized>(reader: &mut R) -> Result<TpiStreamHeader> {
        if reader.remaining() < Self::SIZE {
            return Err(malformed_error!("TPI stream does not contain a header"));
        }

        let header = TpiStreamHeader {
            version: reader.read_le::<u32>()?,
            header_size: reader.read_le::<u32>()?,
            type_index_begin: reader.read_le::<u32>()?,
            type_index_end: reader.read_le::<u32>()?,
            type_record_bytes: reader.read_le::<u32>()?,
            hash_stream_index: reader.read_le::<u16>()?,
            hash_aux_stream_index: reader.read_le::<u16>()?,
            hash_key_size: reader.read_le::<u32>()?,
            hash_buckets_count: reader.read_le::<u32>()?,
            hash_value_buffer: EmbeddedBuffer::read(reader)?,
            index_offset_buffer: EmbeddedBuffer::read(reader)?,
            hash_adjusters_buffer: EmbeddedBuffer::read(reader)?,
        };

        if header.version != TPI_VERSION_V80 {
            return Err(malformed_error!(
                "Unsupported TPI version {}",
                header.version
            ));
        }
        if header.header_size as usize != Self::SIZE {
            return Err(malformed_error!(
                "Corrupt TPI header size {}",
                header.header_size
            ));
        }
        if header.hash_key_size != 4 {
            return Err(malformed_error!(
                "TPI stream expected 4 byte hash key size, found {}",
                header.hash_key_size
            ));
        }
        if !(MIN_TPI_HASH_BUCKETS..=MAX_TPI_HASH_BUCKETS).contains(&header.hash_buckets_count) {
            return Err(malformed_error!(
                "TPI stream has an invalid number of hash buckets {}",
                header.hash_buckets_count
            ));
        }

        Ok(header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{file::parser::Parser, Error};

    fn header(version: u32, size: u32, key_size: u32, buckets: u32) -> Vec<u8> {
        let mut data = Vec::new();
        for value in [version, size, 0x1000, 0x1002, 0x20] {
            data.extend_from_slice(&value.to_le_bytes());
        }
        data.extend_from_slice(&5_u16.to_le_bytes());
        data.extend_from_slice(&0xFFFF_u16.to_le_bytes());
        for value in [key_size, buckets, 0, 8, 8, 8, 16, 0] {
            data.extend_from_slice(&value.to_le_bytes());
        }
        data
    }

    #[test]
    fn crafted() {
        let data = header(TPI_VERSION_V80, 56, 4, 0x3FFFF);
        assert_eq!(data.len(), TpiStreamHeader::SIZE);
        let header = TpiStreamHeader::read(&mut Parser::new(&data)).unwrap();

        assert_eq!(header.type_index_begin, 0x1000);
        assert_eq!(header.type_index_end, 0x1002);
        assert_eq!(header.type_record_bytes, 0x20);
        assert_eq!(header.hash_stream_index, 5);
        assert_eq!(header.hash_aux_stream_index, 0xFFFF);
        assert_eq!(header.hash_value_buffer, EmbeddedBuffer { offset: 0, length: 8 });
        assert_eq!(header.index_offset_buffer.position().unwrap(), 8);
        assert_eq!(header.hash_adjusters_buffer.length, 0);
    }

    #[test]
    fn crafted_invalid() {
        for data in [
            header(19_990_903, 56, 4, 0x1000),
            header(TPI_VERSION_V80, 60, 4, 0x1000),
            header(TPI_VERSION_V80, 56, 2, 0x1000),
            header(TPI_VERSION_V80, 56, 4, 0xFFF),
            header(TPI_VERSION_V80, 56, 4, 0x40001),
        ] {
            assert!(matches!(
                TpiStreamHeader::read(&mut Parser::new(&data)),
                Err(Error::Malformed { .. })
            ));
        }

        let data = header(TPI_VERSION_V80, 56, 4, 0x1000);
        assert!(TpiStreamHeader::read(&mut Parser::new(&data[..40])).is_err());

        let negative = EmbeddedBuffer {
            offset: -1,
            length: 4,
        };
        assert!(negative.position().is_err());
    }
}
