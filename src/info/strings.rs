//! The `/names` string table.
//!
//! Other streams refer to file and source names by byte offset into this table. Strings are
//! decoded on first lookup and cached per offset.

use std::sync::Arc;

use dashmap::DashMap;

use crate::{
    file::{parser::Parser, reader::BinaryReader},
    Result,
};

/// Signature of a string table header
pub const STRING_TABLE_SIGNATURE: u32 = 0xEFFE_EFFE;

/// An offset-addressed string table, as stored in the `/names` stream and the DBI edit and
/// continue substream.
///
/// ## Layout
///
/// | Size | Field                          |
/// |------|--------------------------------|
/// | 4    | signature, `0xEFFEEFFE`        |
/// | 4    | hash version, 1 or 2           |
/// | 4    | `byte_size` of the buffer      |
/// | n    | null-terminated strings        |
/// | 4    | bucket count                   |
/// | 4*n  | buckets, offsets into buffer   |
/// | 4    | number of names                |
pub struct PdbStringTable {
    hash_version: u32,
    buffer: Vec<u8>,
    buckets: Vec<u32>,
    name_count: u32,
    cache: DashMap<u32, Arc<str>>,
}

impl PdbStringTable {
    /// Reads a string table.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for a wrong signature or hash version, and
    /// [`crate::Error::OutOfBounds`] on truncated input.
    pub fn read<R: BinaryReader + ?Sized>(reader: &mut R) -> Result<PdbStringTable> {
        let signature = reader.read_le::<u32>()?;
        if signature != STRING_TABLE_SIGNATURE {
            return Err(malformed_error!(
                "Invalid string table signature 0x{:08x}",
                signature
            ));
        }

        let hash_version = reader.read_le::<u32>()?;
        if hash_version != 1 && hash_version != 2 {
            return Err(malformed_error!(
                "Unsupported string table hash version {}",
                hash_version
            ));
        }

        let byte_size = reader.read_le::<u32>()? as usize;
        let buffer = reader.read_byte_array(byte_size)?;
        let bucket_count = reader.read_le::<u32>()? as usize;
        let buckets = reader.read_u32_array(bucket_count)?;
        let name_count = reader.read_le::<u32>()?;

        Ok(PdbStringTable {
            hash_version,
            buffer,
            buckets,
            name_count,
            cache: DashMap::new(),
        })
    }

    /// Returns the string starting at `offset` in the buffer.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `offset` is not inside the buffer.
    pub fn get(&self, offset: u32) -> Result<Arc<str>> {
        if let Some(string) = self.cache.get(&offset) {
            return Ok(string.clone());
        }

        let mut parser = Parser::new(&self.buffer);
        parser.seek(offset as usize)?;
        let string: Arc<str> = parser.read_cstring()?.into();

        Ok(self.cache.entry(offset).or_insert(string).clone())
    }

    /// Hash version of the bucket array
    #[must_use]
    pub fn hash_version(&self) -> u32 {
        self.hash_version
    }

    /// Size of the string buffer in bytes
    #[must_use]
    pub fn byte_size(&self) -> usize {
        self.buffer.len()
    }

    /// Buffer offset of every hashed name, zero for empty buckets
    #[must_use]
    pub fn buckets(&self) -> &[u32] {
        &self.buckets
    }

    /// Number of names stored in the table
    #[must_use]
    pub fn name_count(&self) -> u32 {
        self.name_count
    }

    /// Every name reachable through the bucket array
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for a bucket pointing outside the buffer.
    pub fn names(&self) -> Result<Vec<Arc<str>>> {
        self.buckets
            .iter()
            .filter(|offset| **offset != 0)
            .map(|offset| self.get(*offset))
            .collect()
    }
}

impl std::fmt::Debug for PdbStringTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdbStringTable")
            .field("hash_version", &self.hash_version)
            .field("byte_size", &self.buffer.len())
            .field("buckets", &self.buckets.len())
            .field("name_count", &self.name_count)
            .finish()
    }
}
