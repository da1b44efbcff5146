//! The Multi-Stream File container.
//!
//! A PDB file is an MSF container: a sequence of fixed-size blocks, a superblock describing
//! them, a free page map recording which blocks are unused, and a stream directory mapping
//! every stream index to the blocks holding its contents.
//!
//! # Key Components
//!
//! - [`crate::msf::superblock::Superblock`] - The validated file header
//! - [`crate::msf::FreePageMap`] - Per-block allocation bits
//! - [`crate::msf::stream::PdbStream`] - One logical stream with its block list
//! - [`crate::msf::directory`] - Decoding of the stream directory
//!
//! # Well-known streams
//!
//! | Index | Contents                              |
//! |-------|---------------------------------------|
//! | 1     | PDB info stream, see [`crate::info`]  |
//! | 2     | TPI type records, see [`crate::tpi`]  |
//! | 3     | DBI debug info, see [`crate::dbi`]    |
//! | 4     | IPI id records, see [`crate::tpi`]    |

pub mod directory;
pub mod stream;
pub mod superblock;

use crate::{
    file::{mapped::MappedBlockReader, reader::BinaryReader},
    Result,
};
use superblock::Superblock;

/// Stream index of the PDB info stream
pub const STREAM_PDB_INFO: u32 = 1;
/// Stream index of the type record stream
pub const STREAM_TPI: u32 = 2;
/// Stream index of the debug info stream
pub const STREAM_DBI: u32 = 3;
/// Stream index of the id record stream
pub const STREAM_IPI: u32 = 4;

/// Stream index value meaning "no stream" in 16-bit stream references
pub const INVALID_STREAM_INDEX: u16 = 0xFFFF;

/// The free page map of an MSF container.
///
/// One bit per block, a set bit marks the block as free. The map is split into intervals
/// that repeat every `block_size` blocks, they are stitched together when the map is read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FreePageMap {
    bytes: Vec<u8>,
    bit_length: u32,
}

impl FreePageMap {
    /// Reads the free page map described by `superblock` out of `data`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if an interval block lies past the end of the file.
    pub fn read(data: &[u8], superblock: &Superblock) -> Result<FreePageMap> {
        let blocks = superblock.free_page_map_blocks();
        let length = superblock.num_blocks.div_ceil(8) as usize;

        let mut reader =
            MappedBlockReader::new(data, &blocks, superblock.block_size as usize, length);
        let bytes = reader.read_byte_array(length)?;

        Ok(FreePageMap {
            bytes,
            bit_length: superblock.num_blocks,
        })
    }

    /// Number of meaningful bits, equal to the block count of the file
    #[must_use]
    pub fn bit_length(&self) -> u32 {
        self.bit_length
    }

    /// The raw map bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns `true` if `block` is marked free. Blocks past the end of the map are not free.
    #[must_use]
    pub fn is_block_free(&self, block: u32) -> bool {
        if block >= self.bit_length {
            return false;
        }
        self.bytes
            .get((block / 8) as usize)
            .is_some_and(|byte| byte & (1 << (block % 8)) != 0)
    }

    /// Number of blocks marked free
    #[must_use]
    pub fn free_blocks(&self) -> usize {
        (0..self.bit_length)
            .filter(|block| self.is_block_free(*block))
            .count()
    }
}
