//! The cursor abstraction shared by every decoder in this crate.
//!
//! Decoders never see where their bytes come from. A record body may live in one contiguous
//! slice ([`crate::file::parser::Parser`]) or be scattered across MSF blocks
//! ([`crate::file::mapped::MappedBlockReader`]); both implement [`BinaryReader`], which only
//! requires positioning and a raw copy primitive. All typed reads are provided on top of those.
//!
//! # Examples
//!
//! ```rust
//! use pdbscope::{BinaryReader, Numeric, Parser};
//!
//! // 0x8004 (LF_ULONG) followed by a 32-bit payload, then "Foo\0"
//! let data = [0x04, 0x80, 0x00, 0x00, 0x01, 0x00, b'F', b'o', b'o', 0x00];
//! let mut reader = Parser::new(&data);
//!
//! assert_eq!(reader.read_numeric()?, Numeric::ULong(0x10000));
//! assert_eq!(reader.read_cstring()?, "Foo");
//! assert!(!reader.has_more_data());
//! # Ok::<(), pdbscope::Error>(())
//! ```

use crate::{
    file::{
        io::{read_le as decode_le, PdbIO},
        numeric::{self, Numeric, LF_NUMERIC},
    },
    Result,
};

/// Positioned reader over a logical byte range.
///
/// Implementors provide the four primitives; everything else is derived. Each reader owns its
/// position, two readers over the same bytes never influence each other.
pub trait BinaryReader {
    /// Total length of the logical byte range.
    fn len(&self) -> usize;

    /// Current cursor position, relative to the start of the range.
    fn pos(&self) -> usize;

    /// Moves the cursor to `pos`. Seeking to exactly [`BinaryReader::len`] is allowed.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `pos` is beyond the end of the range.
    fn seek(&mut self, pos: usize) -> Result<()>;

    /// Fills `buffer` from the current position and advances past it.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `buffer.len()` bytes remain. The
    /// position is unchanged on failure.
    fn read_into(&mut self, buffer: &mut [u8]) -> Result<()>;

    /// Returns `true` if the range is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes left between the cursor and the end of the range.
    fn remaining(&self) -> usize {
        self.len().saturating_sub(self.pos())
    }

    /// Returns `true` while the cursor is before the end of the range.
    fn has_more_data(&self) -> bool {
        self.pos() < self.len()
    }

    /// Advances the cursor by `count` bytes without materialising them.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if that would move past the end.
    fn skip(&mut self, count: usize) -> Result<()> {
        let Some(end) = self.pos().checked_add(count) else {
            return Err(out_of_bounds_error!());
        };
        self.seek(end)
    }

    /// Advances the cursor to the next multiple of `alignment`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the aligned position is past the end.
    fn align(&mut self, alignment: usize) -> Result<()> {
        if alignment == 0 {
            return Ok(());
        }
        let padding = (alignment - (self.pos() % alignment)) % alignment;
        self.skip(padding)
    }

    /// Reads a little-endian `T` and advances past it.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the read would exceed the range.
    fn read_le<T: PdbIO>(&mut self) -> Result<T> {
        let mut buffer = [0_u8; 16];
        let Some(bytes) = buffer.get_mut(..std::mem::size_of::<T>()) else {
            return Err(out_of_bounds_error!());
        };
        self.read_into(bytes)?;
        decode_le::<T>(bytes)
    }

    /// Reads a little-endian `T` without moving the cursor.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the read would exceed the range.
    fn peek_le<T: PdbIO>(&mut self) -> Result<T> {
        let position = self.pos();
        let value = self.read_le::<T>();
        self.seek(position)?;
        value
    }

    /// Reads `length` raw bytes into an owned buffer.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `length` bytes remain.
    fn read_byte_array(&mut self, length: usize) -> Result<Vec<u8>> {
        if length > self.remaining() {
            return Err(out_of_bounds_error!());
        }
        let mut buffer = vec![0_u8; length];
        self.read_into(&mut buffer)?;
        Ok(buffer)
    }

    /// Reads a null-terminated string.
    ///
    /// Names in PDB files are usually UTF-8 but older producers emit the active code page;
    /// invalid sequences are replaced rather than rejected.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the range ends before the terminator.
    fn read_cstring(&mut self) -> Result<String> {
        let start = self.pos();
        let mut bytes = Vec::new();
        loop {
            let byte = match self.read_le::<u8>() {
                Ok(byte) => byte,
                Err(error) => {
                    self.seek(start)?;
                    return Err(error);
                }
            };
            if byte == 0 {
                break;
            }
            bytes.push(byte);
        }

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Reads a CodeView encoded integer.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for truncated input and
    /// [`crate::Error::UnsupportedNumeric`] for leaves that do not carry an integer.
    fn read_numeric(&mut self) -> Result<Numeric> {
        let leaf = self.read_le::<u16>()?;
        if leaf < LF_NUMERIC {
            return Ok(Numeric::UShort(leaf));
        }

        match leaf {
            numeric::LF_CHAR => Ok(Numeric::Char(self.read_le::<i8>()?)),
            numeric::LF_SHORT => Ok(Numeric::Short(self.read_le::<i16>()?)),
            numeric::LF_USHORT => Ok(Numeric::UShort(self.read_le::<u16>()?)),
            numeric::LF_LONG => Ok(Numeric::Long(self.read_le::<i32>()?)),
            numeric::LF_ULONG => Ok(Numeric::ULong(self.read_le::<u32>()?)),
            numeric::LF_QUADWORD => Ok(Numeric::Quad(self.read_le::<i64>()?)),
            numeric::LF_UQUADWORD => Ok(Numeric::UQuad(self.read_le::<u64>()?)),
            numeric::LF_OCTWORD => Ok(Numeric::Oct(self.read_le::<i128>()?)),
            numeric::LF_UOCTWORD => Ok(Numeric::UOct(self.read_le::<u128>()?)),
            other => {
                numeric::check_leaf(other)?;
                Err(malformed_error!("Invalid numeric leaf - 0x{:04x}", other))
            }
        }
    }

    /// Reads `count` consecutive little-endian `u16` values.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the array does not fit in the remaining bytes.
    fn read_u16_array(&mut self, count: usize) -> Result<Vec<u16>> {
        let bytes = read_array_bytes(self, count, 2)?;
        Ok(bytes
            .chunks_exact(2)
            .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
            .collect())
    }

    /// Reads `count` consecutive little-endian `u32` values.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the array does not fit in the remaining bytes.
    fn read_u32_array(&mut self, count: usize) -> Result<Vec<u32>> {
        let bytes = read_array_bytes(self, count, 4)?;
        Ok(bytes
            .chunks_exact(4)
            .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect())
    }
}

fn read_array_bytes<R: BinaryReader + ?Sized>(
    reader: &mut R,
    count: usize,
    width: usize,
) -> Result<Vec<u8>> {
    let Some(length) = count.checked_mul(width) else {
        return Err(out_of_bounds_error!());
    };
    reader.read_byte_array(length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{file::parser::Parser, Error};

    #[test]
    fn numeric_immediate() {
        let mut reader = Parser::new(&[0x08, 0x00]);
        assert_eq!(reader.read_numeric().unwrap(), Numeric::UShort(8));

        let mut reader = Parser::new(&[0xFF, 0x7F]);
        assert_eq!(reader.read_numeric().unwrap(), Numeric::UShort(0x7FFF));
    }

    #[test]
    fn numeric_payloads() {
        #[rustfmt::skip]
        let data = [
            0x00, 0x80, 0xFF,                   // LF_CHAR -1
            0x01, 0x80, 0xFE, 0xFF,             // LF_SHORT -2
            0x02, 0x80, 0x00, 0x80,             // LF_USHORT 0x8000
            0x03, 0x80, 0xFD, 0xFF, 0xFF, 0xFF, // LF_LONG -3
            0x04, 0x80, 0x00, 0x00, 0x00, 0x80, // LF_ULONG 0x80000000
            0x09, 0x80, 0xFC, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, // LF_QUADWORD -4
            0x0A, 0x80, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x80, // LF_UQUADWORD
        ];

        let mut reader = Parser::new(&data);
        assert_eq!(reader.read_numeric().unwrap(), Numeric::Char(-1));
        assert_eq!(reader.read_numeric().unwrap(), Numeric::Short(-2));
        assert_eq!(reader.read_numeric().unwrap(), Numeric::UShort(0x8000));
        assert_eq!(reader.read_numeric().unwrap(), Numeric::Long(-3));
        assert_eq!(reader.read_numeric().unwrap(), Numeric::ULong(0x8000_0000));
        assert_eq!(reader.read_numeric().unwrap(), Numeric::Quad(-4));
        assert_eq!(
            reader.read_numeric().unwrap(),
            Numeric::UQuad(0x8000_0000_0000_0001)
        );
        assert!(!reader.has_more_data());
    }

    #[test]
    fn numeric_octword() {
        let mut data = vec![0x18, 0x80];
        data.extend_from_slice(&u128::MAX.to_le_bytes());
        let mut reader = Parser::new(&data);
        assert_eq!(reader.read_numeric().unwrap(), Numeric::UOct(u128::MAX));
    }

    #[test]
    fn numeric_fails_closed() {
        let mut reader = Parser::new(&[0x05, 0x80, 0x00, 0x00, 0x80, 0x3F]);
        assert!(matches!(
            reader.read_numeric(),
            Err(Error::UnsupportedNumeric(0x8005))
        ));

        let mut reader = Parser::new(&[0x1C, 0x80, 0x00, 0x3C]);
        assert!(matches!(
            reader.read_numeric(),
            Err(Error::UnsupportedNumeric(0x801c))
        ));

        // Unassigned leaf
        let mut reader = Parser::new(&[0x11, 0x80]);
        assert!(matches!(reader.read_numeric(), Err(Error::Malformed { .. })));

        // Truncated payload
        let mut reader = Parser::new(&[0x04, 0x80, 0x01]);
        assert!(matches!(
            reader.read_numeric(),
            Err(Error::OutOfBounds { .. })
        ));
    }

    #[test]
    fn cstrings() {
        let mut reader = Parser::new(b"Foo\0.?AVFoo@@\0tail");
        assert_eq!(reader.read_cstring().unwrap(), "Foo");
        assert_eq!(reader.read_cstring().unwrap(), ".?AVFoo@@");
        assert!(matches!(
            reader.read_cstring(),
            Err(Error::OutOfBounds { .. })
        ));
        assert_eq!(reader.pos(), 14);

        let mut reader = Parser::new(&[0x41, 0xFF, 0x00]);
        assert_eq!(reader.read_cstring().unwrap(), "A\u{FFFD}");
    }

    #[test]
    fn arrays() {
        let data = [0x01, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00];
        let mut reader = Parser::new(&data);
        assert_eq!(reader.read_u32_array(2).unwrap(), vec![1, 2]);

        let mut reader = Parser::new(&data);
        assert_eq!(reader.read_u16_array(3).unwrap(), vec![1, 0, 2]);

        let mut reader = Parser::new(&data);
        assert!(reader.read_u32_array(3).is_err());
        assert_eq!(reader.pos(), 0);
        assert!(reader.read_u32_array(usize::MAX).is_err());
    }

    #[test]
    fn skip_and_align() {
        let data = [0_u8; 8];
        let mut reader = Parser::new(&data);
        reader.skip(1).unwrap();
        reader.align(4).unwrap();
        assert_eq!(reader.pos(), 4);
        reader.align(4).unwrap();
        assert_eq!(reader.pos(), 4);
        reader.skip(4).unwrap();
        assert!(!reader.has_more_data());
        assert!(reader.skip(1).is_err());
    }

    #[test]
    fn peek() {
        let mut reader = Parser::new(&[0x34, 0x12]);
        assert_eq!(reader.peek_le::<u16>().unwrap(), 0x1234);
        assert_eq!(reader.pos(), 0);
    }
}
