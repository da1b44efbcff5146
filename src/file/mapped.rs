//! Scatter-gather cursor over MSF blocks.
//!
//! An MSF stream is a list of block numbers plus a byte length. The logical byte at stream
//! position `p` lives at file offset `blocks[p / block_size] * block_size + p % block_size`.
//! [`MappedBlockReader`] performs that translation on every read and stitches together reads
//! that cross block boundaries, so decoders can treat a stream as one contiguous range.
//!
//! A reader can hand out sub-views ([`MappedBlockReader::substream`]) covering a window of the
//! stream, which is how DBI substreams and the TPI record area are exposed. Every view carries
//! its own position.

use crate::{file::reader::BinaryReader, Result};

/// A [`BinaryReader`] over a block-mapped stream, or a window of one.
#[derive(Clone, Debug)]
pub struct MappedBlockReader<'a> {
    /// Complete file contents
    data: &'a [u8],
    /// Block numbers of the stream, in stream order
    blocks: &'a [u32],
    /// MSF block size in bytes
    block_size: usize,
    /// Stream offset at which this view starts
    origin: usize,
    /// Length of this view
    length: usize,
    /// Cursor, relative to `origin`
    position: usize,
}

impl<'a> MappedBlockReader<'a> {
    /// Creates a reader over `length` bytes of the stream described by `blocks`.
    ///
    /// Block numbers are not validated here, a block pointing outside of `data` is reported as
    /// [`crate::Error::OutOfBounds`] when it is actually read.
    ///
    /// # Arguments
    /// * `data` - The complete file contents
    /// * `blocks` - The block list of the stream
    /// * `block_size` - The MSF block size
    /// * `length` - The logical stream length in bytes
    #[must_use]
    pub fn new(data: &'a [u8], blocks: &'a [u32], block_size: usize, length: usize) -> Self {
        MappedBlockReader {
            data,
            blocks,
            block_size,
            origin: 0,
            length,
            position: 0,
        }
    }

    /// Returns a new view over `length` bytes starting at `offset` within this view.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the window does not fit into this view.
    pub fn substream(&self, offset: usize, length: usize) -> Result<MappedBlockReader<'a>> {
        let Some(end) = offset.checked_add(length) else {
            return Err(out_of_bounds_error!());
        };
        if end > self.length {
            return Err(out_of_bounds_error!());
        }

        Ok(MappedBlockReader {
            data: self.data,
            blocks: self.blocks,
            block_size: self.block_size,
            origin: self.origin + offset,
            length,
            position: 0,
        })
    }

    /// Returns a view over the next `length` bytes and advances past them.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `length` bytes remain.
    pub fn read_substream(&mut self, length: usize) -> Result<MappedBlockReader<'a>> {
        let substream = self.substream(self.position, length)?;
        self.position += length;
        Ok(substream)
    }

    /// Returns a view over everything from the cursor to the end and moves the cursor there.
    ///
    /// # Errors
    /// Never fails in practice, the signature matches [`MappedBlockReader::read_substream`].
    pub fn read_rest(&mut self) -> Result<MappedBlockReader<'a>> {
        self.read_substream(self.remaining())
    }

    /// The block size this reader translates with.
    #[must_use]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Translates a position within this view into an absolute file offset.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the position maps to a missing block.
    pub fn file_offset(&self, position: usize) -> Result<usize> {
        if self.block_size == 0 {
            return Err(out_of_bounds_error!());
        }
        let stream_offset = self.origin + position;
        let Some(block) = self.blocks.get(stream_offset / self.block_size) else {
            return Err(out_of_bounds_error!());
        };

        (*block as usize)
            .checked_mul(self.block_size)
            .and_then(|offset| offset.checked_add(stream_offset % self.block_size))
            .ok_or(out_of_bounds_error!())
    }

    fn copy_out(&self, mut position: usize, buffer: &mut [u8]) -> Result<()> {
        if self.block_size == 0 {
            return Err(out_of_bounds_error!());
        }
        let mut done = 0;
        while done < buffer.len() {
            let in_block = (self.origin + position) % self.block_size;
            let chunk = (self.block_size - in_block).min(buffer.len() - done);
            let start = self.file_offset(position)?;

            let Some(source) = self.data.get(start..start + chunk) else {
                return Err(out_of_bounds_error!());
            };
            buffer[done..done + chunk].copy_from_slice(source);

            done += chunk;
            position += chunk;
        }
        Ok(())
    }
}

impl BinaryReader for MappedBlockReader<'_> {
    fn len(&self) -> usize {
        self.length
    }

    fn pos(&self) -> usize {
        self.position
    }

    fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.length {
            return Err(out_of_bounds_error!());
        }

        self.position = pos;
        Ok(())
    }

    fn read_into(&mut self, buffer: &mut [u8]) -> Result<()> {
        if buffer.len() > self.remaining() {
            return Err(out_of_bounds_error!());
        }

        self.copy_out(self.position, buffer)?;
        self.position += buffer.len();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Four 4-byte blocks, block `n` filled with `n * 0x10 + i`
    fn blocks() -> Vec<u8> {
        (0..4_u8)
            .flat_map(|block| (0..4_u8).map(move |i| block * 0x10 + i))
            .collect()
    }

    #[test]
    fn stitches_across_blocks() {
        let data = blocks();
        let map = [2, 0, 3];
        let mut reader = MappedBlockReader::new(&data, &map, 4, 12);

        assert_eq!(reader.read_le::<u16>().unwrap(), 0x2120);
        // Crosses from block 2 into block 0
        assert_eq!(reader.read_le::<u32>().unwrap(), 0x0100_2322);
        assert_eq!(reader.pos(), 6);
        assert_eq!(
            reader.read_byte_array(6).unwrap(),
            vec![0x02, 0x03, 0x30, 0x31, 0x32, 0x33]
        );
        assert!(!reader.has_more_data());
        assert!(reader.read_le::<u8>().is_err());
    }

    #[test]
    fn length_shorter_than_blocks() {
        let data = blocks();
        let map = [1, 3];
        let mut reader = MappedBlockReader::new(&data, &map, 4, 5);
        reader.seek(4).unwrap();
        assert_eq!(reader.read_le::<u8>().unwrap(), 0x30);
        assert!(reader.read_le::<u8>().is_err());
        assert!(reader.seek(6).is_err());
    }

    #[test]
    fn substreams_have_own_cursor() {
        let data = blocks();
        let map = [3, 2, 1, 0];
        let mut reader = MappedBlockReader::new(&data, &map, 4, 16);

        reader.skip(2).unwrap();
        let mut sub = reader.read_substream(4).unwrap();
        assert_eq!(reader.pos(), 6);
        assert_eq!(sub.len(), 4);
        assert_eq!(sub.read_u16_array(2).unwrap(), vec![0x3332, 0x2120]);
        assert!(sub.read_le::<u8>().is_err());

        let mut nested = sub.substream(1, 2).unwrap();
        assert_eq!(nested.read_le::<u16>().unwrap(), 0x2033);
        assert!(sub.substream(3, 2).is_err());

        let rest = reader.read_rest().unwrap();
        assert_eq!(rest.len(), 10);
        assert!(!reader.has_more_data());
    }

    #[test]
    fn corrupt_block_number() {
        let data = blocks();
        let map = [0, 99];
        let mut reader = MappedBlockReader::new(&data, &map, 4, 8);
        reader.skip(2).unwrap();
        assert!(matches!(
            reader.read_le::<u32>(),
            Err(crate::Error::OutOfBounds { .. })
        ));
        assert_eq!(reader.pos(), 2);
    }

    #[test]
    fn file_offsets() {
        let data = blocks();
        let map = [3, 1];
        let reader = MappedBlockReader::new(&data, &map, 4, 8);
        assert_eq!(reader.file_offset(0).unwrap(), 12);
        assert_eq!(reader.file_offset(5).unwrap(), 5);
        assert!(reader.file_offset(8).is_err());
    }

    #[test]
    fn zero_block_size() {
        let data = blocks();
        let map = [0, 1];
        let mut reader = MappedBlockReader::new(&data, &map, 0, 4);
        assert!(matches!(
            reader.read_le::<u32>(),
            Err(crate::Error::OutOfBounds { .. })
        ));
        assert!(reader.file_offset(0).is_err());
        assert_eq!(reader.pos(), 0);
    }
}
