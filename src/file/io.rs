//! Little-endian primitive decoding.
//!
//! Every multi-byte value in an MSF container and in the CodeView streams it carries is stored
//! little-endian. This module provides the [`crate::file::io::PdbIO`] trait, which abstracts the
//! fixed-width integer types over their byte representation, and two bounds-checked helpers for
//! reading them from plain byte slices.
//!
//! # Key Components
//!
//! - [`crate::file::io::PdbIO`] - Byte conversion for all fixed-width integers up to 128 bits
//! - [`crate::file::io::read_le`] - Read a value from the start of a slice
//! - [`crate::file::io::read_le_at`] - Read a value at an offset and advance the offset
//!
//! # Examples
//!
//! ```rust,ignore
//! use pdbscope::file::io::{read_le, read_le_at};
//!
//! let data = [0x00, 0x10, 0x00, 0x00, 0xFF, 0xFF];
//! assert_eq!(read_le::<u32>(&data)?, 0x1000);
//!
//! let mut offset = 4;
//! assert_eq!(read_le_at::<u16>(&data, &mut offset)?, 0xFFFF);
//! assert_eq!(offset, 6);
//! # Ok::<(), pdbscope::Error>(())
//! ```

use crate::Result;

/// Trait for the fixed-width integer types that can be decoded from raw bytes.
///
/// The associated `Bytes` array type ties each integer to its exact on-disk width, so a
/// reader only ever needs `std::mem::size_of::<T>()` bytes to produce a `T`.
pub trait PdbIO: Sized {
    /// Associated type representing the byte array type for this numeric type.
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]>;

    /// Read T from a byte buffer in little-endian
    fn from_le_bytes(bytes: Self::Bytes) -> Self;
}

macro_rules! impl_pdb_io {
    ($($ty:ty),*) => {
        $(
            impl PdbIO for $ty {
                type Bytes = [u8; std::mem::size_of::<$ty>()];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }
            }
        )*
    };
}

impl_pdb_io!(u8, i8, u16, i16, u32, i32, u64, i64, u128, i128);

/// Safely reads a value of type `T` in little-endian byte order from the start of a buffer.
///
/// # Errors
///
/// Returns [`crate::Error::OutOfBounds`] if the buffer is shorter than `T`.
pub fn read_le<T: PdbIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_le_at(data, &mut offset)
}

/// Safely reads a value of type `T` in little-endian byte order at `offset`, advancing the
/// offset by the size of `T` on success.
///
/// # Errors
///
/// Returns [`crate::Error::OutOfBounds`] if the read would exceed the buffer. The offset is left
/// untouched in that case.
pub fn read_le_at<T: PdbIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(out_of_bounds_error!());
    };
    if end > data.len() {
        return Err(out_of_bounds_error!());
    }

    let Ok(read) = T::Bytes::try_from(&data[*offset..end]) else {
        return Err(out_of_bounds_error!());
    };

    *offset = end;

    Ok(T::from_le_bytes(read))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_BUFFER: [u8; 16] = [
        0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F,
        0x10,
    ];

    #[test]
    fn read_widths() {
        assert_eq!(read_le::<u8>(&TEST_BUFFER).unwrap(), 0x01);
        assert_eq!(read_le::<i8>(&TEST_BUFFER).unwrap(), 0x01);
        assert_eq!(read_le::<u16>(&TEST_BUFFER).unwrap(), 0x0201);
        assert_eq!(read_le::<u32>(&TEST_BUFFER).unwrap(), 0x0403_0201);
        assert_eq!(read_le::<u64>(&TEST_BUFFER).unwrap(), 0x0807_0605_0403_0201);
        assert_eq!(
            read_le::<u128>(&TEST_BUFFER).unwrap(),
            0x100F_0E0D_0C0B_0A09_0807_0605_0403_0201
        );
    }

    #[test]
    fn read_signed() {
        let data = [0xFE, 0xFF, 0xFF, 0xFF];
        assert_eq!(read_le::<i32>(&data).unwrap(), -2);
        assert_eq!(read_le::<i16>(&data).unwrap(), -2);
    }

    #[test]
    fn read_at_advances() {
        let mut offset = 2;
        assert_eq!(read_le_at::<u16>(&TEST_BUFFER, &mut offset).unwrap(), 0x0403);
        assert_eq!(offset, 4);
        assert_eq!(read_le_at::<u32>(&TEST_BUFFER, &mut offset).unwrap(), 0x0807_0605);
        assert_eq!(offset, 8);
    }

    #[test]
    fn errors() {
        let mut offset = 14;
        let result = read_le_at::<u32>(&TEST_BUFFER, &mut offset);
        assert!(matches!(result, Err(crate::Error::OutOfBounds { .. })));
        assert_eq!(offset, 14);

        let mut offset = usize::MAX;
        assert!(read_le_at::<u8>(&TEST_BUFFER, &mut offset).is_err());

        assert!(read_le::<u32>(&[]).is_err());
    }
}
