//! Slice-backed cursor for contiguous byte ranges.
//!
//! This module provides the [`crate::file::parser::Parser`] type, the [`BinaryReader`]
//! implementation used whenever the bytes to decode are already contiguous in memory: the
//! superblock at the start of the file, hand-crafted record buffers in tests and benchmarks,
//! and any buffer copied out of a block-mapped stream.
//!
//! # Architecture
//!
//! The parser maintains a position within a borrowed byte slice. All typed reads come from the
//! [`BinaryReader`] trait; the parser adds the operations that only make sense for contiguous
//! memory, such as borrowing a sub-slice without copying.
//!
//! # Usage Examples
//!
//! ```rust
//! use pdbscope::{BinaryReader, Parser};
//!
//! let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
//! let mut parser = Parser::new(&data);
//!
//! let first = parser.read_le::<u32>()?;
//! assert_eq!(first, 0x04030201);
//!
//! parser.seek(6)?;
//! assert_eq!(parser.read_bytes(2)?, &[0x07, 0x08]);
//! # Ok::<(), pdbscope::Error>(())
//! ```

use crate::{file::reader::BinaryReader, Result};

/// A cursor over a borrowed byte slice.
///
/// # Examples
///
/// ```rust
/// use pdbscope::{BinaryReader, Parser};
///
/// let data = [0x0E, 0x15, 0x00, 0x00];
/// let mut parser = Parser::new(&data);
/// assert_eq!(parser.read_le::<u16>()?, 0x150E);
/// assert_eq!(parser.remaining(), 2);
/// # Ok::<(), pdbscope::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct Parser<'a> {
    /// The binary data being parsed
    data: &'a [u8],
    /// Current position within the data buffer
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new [`crate::file::parser::Parser`] from a byte slice.
    ///
    /// # Arguments
    /// * `data` - The byte slice to read from
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Calculates an end position safely with overflow checking.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the calculation would overflow
    /// or if the resulting position exceeds the data length.
    pub fn calc_end_position(&self, length: usize) -> Result<usize> {
        let end = self
            .position
            .checked_add(length)
            .ok_or(out_of_bounds_error!())?;

        if end > self.data.len() {
            return Err(out_of_bounds_error!());
        }

        Ok(end)
    }

    /// Borrows `length` bytes from the current position and advances past them.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading `length` bytes would exceed the data.
    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8]> {
        let end = self.calc_end_position(length)?;
        let bytes = &self.data[self.position..end];
        self.position = end;
        Ok(bytes)
    }
}

impl BinaryReader for Parser<'_> {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn pos(&self) -> usize {
        self.position
    }

    fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(out_of_bounds_error!());
        }

        self.position = pos;
        Ok(())
    }

    fn read_into(&mut self, buffer: &mut [u8]) -> Result<()> {
        let bytes = self.read_bytes(buffer.len())?;
        buffer.copy_from_slice(bytes);
        Ok(())
    }
}
