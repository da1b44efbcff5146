//! The MSF superblock.
//!
//! The first 0x38 bytes of every PDB file describe the container: its block size, how many
//! blocks exist, where the free page map starts and where the list of stream directory blocks
//! lives. Nothing else in the file can be located without it.
//!
//! # Layout
//!
//! | Offset | Size | Field                  |
//! |--------|------|------------------------|
//! | 0x00   | 32   | Magic                  |
//! | 0x20   | 4    | `block_size`           |
//! | 0x24   | 4    | `free_block_map_block` |
//! | 0x28   | 4    | `num_blocks`           |
//! | 0x2C   | 4    | `num_directory_bytes`  |
//! | 0x30   | 4    | `unknown`              |
//! | 0x34   | 4    | `block_map_addr`       |

use crate::{
    file::{parser::Parser, reader::BinaryReader},
    Result,
};

/// Signature at the very start of every MSF 7.00 container
pub const MAGIC: &[u8; 32] = b"Microsoft C/C++ MSF 7.00\r\n\x1aDS\0\0\0";

/// The fixed header of an MSF container
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Superblock {
    /// Size of every block in bytes
    pub block_size: u32,
    /// Block of the first free page map interval, either 1 or 2
    pub free_block_map_block: u32,
    /// Total number of blocks in the file
    pub num_blocks: u32,
    /// Size of the stream directory in bytes
    pub num_directory_bytes: u32,
    /// Reserved
    pub unknown: u32,
    /// Block holding the list of directory blocks
    pub block_map_addr: u32,
}

impl Superblock {
    /// Size of the superblock on disk
    pub const SIZE: usize = 0x38;

    /// Reads and validates the superblock at the start of `data`.
    ///
    /// # Arguments
    /// * `data` - The file contents, at least [`Superblock::SIZE`] bytes long
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the magic or any of the header invariants is
    /// violated, or [`crate::Error::OutOfBounds`] if `data` is too short.
    pub fn read(data: &[u8]) -> Result<Superblock> {
        let mut parser = Parser::new(data);

        let magic = parser.read_bytes(MAGIC.len())?;
        if magic != MAGIC {
            return Err(malformed_error!("Corrupt MSF - magic header doesn't match"));
        }

        let superblock = Superblock {
            block_size: parser.read_le::<u32>()?,
            free_block_map_block: parser.read_le::<u32>()?,
            num_blocks: parser.read_le::<u32>()?,
            num_directory_bytes: parser.read_le::<u32>()?,
            unknown: parser.read_le::<u32>()?,
            block_map_addr: parser.read_le::<u32>()?,
        };

        superblock.validate()?;
        Ok(superblock)
    }

    /// Checks the header invariants of the container.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] describing the first violated invariant.
    pub fn validate(&self) -> Result<()> {
        if !Self::is_valid_block_size(self.block_size) {
            return Err(malformed_error!(
                "Corrupt MSF - unsupported block size {}",
                self.block_size
            ));
        }

        if self.num_directory_bytes % 4 != 0 {
            return Err(malformed_error!(
                "Corrupt MSF - directory size is not a multiple of 4"
            ));
        }

        // The list of directory blocks has to fit into a single block
        if self.num_directory_blocks() > self.block_size / 4 {
            return Err(malformed_error!("Corrupt MSF - too many directory blocks"));
        }

        if self.block_map_addr == 0 {
            return Err(malformed_error!("Corrupt MSF - block 0 is reserved"));
        }

        if self.block_map_addr >= self.num_blocks {
            return Err(malformed_error!(
                "Corrupt MSF - block map address {} is invalid",
                self.block_map_addr
            ));
        }

        if self.free_block_map_block != 1 && self.free_block_map_block != 2 {
            return Err(malformed_error!(
                "Corrupt MSF - the free block map isn't at block 1 or block 2"
            ));
        }

        Ok(())
    }

    /// Returns `true` for the block sizes produced by the Microsoft toolchain.
    #[must_use]
    pub fn is_valid_block_size(block_size: u32) -> bool {
        matches!(block_size, 512 | 1024 | 2048 | 4096)
    }

    /// Number of blocks needed to hold `bytes` bytes.
    #[must_use]
    pub fn bytes_to_blocks(&self, bytes: u32) -> u32 {
        bytes.div_ceil(self.block_size)
    }

    /// Number of bytes covered by `blocks` blocks.
    #[must_use]
    pub fn blocks_to_bytes(&self, blocks: u32) -> u64 {
        u64::from(blocks) * u64::from(self.block_size)
    }

    /// File offset of the block holding the directory block list.
    #[must_use]
    pub fn block_map_offset(&self) -> u64 {
        self.blocks_to_bytes(self.block_map_addr)
    }

    /// Number of blocks the stream directory occupies.
    #[must_use]
    pub fn num_directory_blocks(&self) -> u32 {
        self.bytes_to_blocks(self.num_directory_bytes)
    }

    /// Number of free page map intervals.
    ///
    /// One interval holds `8 * block_size` bits, files with more blocks repeat the map
    /// every `block_size` blocks.
    #[must_use]
    pub fn free_page_map_intervals(&self) -> u32 {
        let bits_per_interval = 8 * u64::from(self.block_size);
        let intervals = (u64::from(self.num_blocks) + bits_per_interval - 1) / bits_per_interval;
        u32::try_from(intervals).unwrap_or(u32::MAX)
    }

    /// Block numbers of every free page map interval, in order.
    #[must_use]
    pub fn free_page_map_blocks(&self) -> Vec<u32> {
        (0..self.free_page_map_intervals())
            .map(|interval| {
                self.free_block_map_block
                    .saturating_add(interval.saturating_mul(self.block_size))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn superblock_bytes(
        block_size: u32,
        fpm: u32,
        num_blocks: u32,
        dir_bytes: u32,
        map_addr: u32,
    ) -> Vec<u8> {
        let mut data = MAGIC.to_vec();
        for value in [block_size, fpm, num_blocks, dir_bytes, 0, map_addr] {
            data.extend_from_slice(&value.to_le_bytes());
        }
        data
    }

    #[test]
    fn crafted() {
        let data = superblock_bytes(4096, 1, 16, 64, 3);
        let superblock = Superblock::read(&data).unwrap();

        assert_eq!(superblock.block_size, 4096);
        assert_eq!(superblock.free_block_map_block, 1);
        assert_eq!(superblock.num_blocks, 16);
        assert_eq!(superblock.num_directory_bytes, 64);
        assert_eq!(superblock.block_map_addr, 3);
        assert_eq!(superblock.num_directory_blocks(), 1);
        assert_eq!(superblock.block_map_offset(), 3 * 4096);
        assert_eq!(superblock.free_page_map_intervals(), 1);
        assert_eq!(superblock.free_page_map_blocks(), vec![1]);
    }

    #[test]
    fn helpers() {
        let data = superblock_bytes(512, 2, 10_000, 1024, 9);
        let superblock = Superblock::read(&data).unwrap();

        assert_eq!(superblock.bytes_to_blocks(0), 0);
        assert_eq!(superblock.bytes_to_blocks(1), 1);
        assert_eq!(superblock.bytes_to_blocks(512), 1);
        assert_eq!(superblock.bytes_to_blocks(513), 2);
        assert_eq!(superblock.blocks_to_bytes(3), 1536);
        // 8 * 512 = 4096 bits per interval
        assert_eq!(superblock.free_page_map_intervals(), 3);
        assert_eq!(superblock.free_page_map_blocks(), vec![2, 514, 1026]);
    }

    #[test]
    fn crafted_invalid() {
        let mut bad_magic = superblock_bytes(4096, 1, 16, 64, 3);
        bad_magic[0] = b'm';
        assert!(matches!(
            Superblock::read(&bad_magic),
            Err(Error::Malformed { .. })
        ));

        for data in [
            superblock_bytes(4000, 1, 16, 64, 3),
            superblock_bytes(4096, 1, 16, 62, 3),
            superblock_bytes(4096, 1, 16, 64, 0),
            superblock_bytes(4096, 1, 16, 64, 16),
            superblock_bytes(4096, 3, 16, 64, 3),
            // 129 directory blocks do not fit into one 512 byte block
            superblock_bytes(512, 1, 1000, 129 * 512, 3),
        ] {
            assert!(matches!(
                Superblock::read(&data),
                Err(Error::Malformed { .. })
            ));
        }

        assert!(matches!(
            Superblock::read(&MAGIC[..]),
            Err(Error::OutOfBounds { .. })
        ));
    }
}
