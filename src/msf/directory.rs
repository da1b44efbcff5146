//! Decoding of the stream directory.
//!
//! The directory is itself stored like a stream: the superblock points at one block that
//! lists the directory blocks, and the directory bytes are read through those. Its contents
//! are `num_streams`, one size per stream, then the block list of every stream in order.

use std::sync::Arc;

use crate::{
    file::{io::read_le_at, mapped::MappedBlockReader, reader::BinaryReader, Backend},
    msf::{stream::PdbStream, superblock::Superblock},
    Result,
};

/// Reads the list of directory blocks stored at the block map address.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the list extends past the end of the file.
pub fn read_directory_blocks(data: &[u8], superblock: &Superblock) -> Result<Vec<u32>> {
    let Ok(mut offset) = usize::try_from(superblock.block_map_offset()) else {
        return Err(out_of_bounds_error!());
    };

    (0..superblock.num_directory_blocks())
        .map(|_| read_le_at::<u32>(data, &mut offset))
        .collect()
}

/// Decodes the stream directory and creates one [`PdbStream`] per entry.
///
/// # Arguments
/// * `backend` - The file contents, shared with every created stream
/// * `superblock` - The validated superblock of the file
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if a stream references a block past the end of the file
/// or the directory contents do not add up to `num_directory_bytes`, and
/// [`crate::Error::OutOfBounds`] if the directory itself is truncated.
pub fn read_streams(backend: &Arc<dyn Backend>, superblock: &Superblock) -> Result<Vec<PdbStream>> {
    let data = backend.data();
    let file_length = data.len() as u64;

    let directory_blocks = read_directory_blocks(data, superblock)?;
    for block in &directory_blocks {
        if superblock.blocks_to_bytes(block.saturating_add(1)) > file_length {
            return Err(malformed_error!("Directory block map is corrupt"));
        }
    }

    let mut reader = MappedBlockReader::new(
        data,
        &directory_blocks,
        superblock.block_size as usize,
        superblock.num_directory_bytes as usize,
    );

    let num_streams = reader.read_le::<u32>()?;
    let sizes = reader.read_u32_array(num_streams as usize)?;

    let mut streams = Vec::with_capacity(sizes.len());
    for (index, size) in (0_u32..).zip(sizes) {
        let block_count = if size == PdbStream::UNUSED_SIZE {
            0
        } else {
            superblock.bytes_to_blocks(size)
        };

        let blocks = reader.read_u32_array(block_count as usize)?;
        for block in &blocks {
            if superblock.blocks_to_bytes(block.saturating_add(1)) > file_length {
                return Err(malformed_error!("Stream block map is corrupt"));
            }
        }

        streams.push(PdbStream::new(
            index,
            size,
            blocks,
            superblock.block_size,
            backend.clone(),
        ));
    }

    if reader.pos() != superblock.num_directory_bytes as usize {
        return Err(malformed_error!(
            "Stream directory has {} trailing bytes",
            reader.remaining()
        ));
    }

    Ok(streams)
}
