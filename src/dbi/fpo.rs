//! Frame pointer omission records of the `FPO` debug stream.

use strum::FromRepr;

use crate::{file::reader::BinaryReader, Result};

/// How a function sets up its frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(u8)]
pub enum FpoFrameType {
    /// Frame pointer omitted
    Fpo = 0,
    /// Trap frame
    Trap = 1,
    /// Task state segment
    Tss = 2,
    /// Standard frame with `ebp`
    NonFpo = 3,
}

/// One `FPO_DATA` entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FpoData {
    /// Offset of the first byte of the function code
    pub offset: u32,
    /// Number of bytes in the function
    pub size: u32,
    /// Number of local variables, in dwords
    pub locals: u32,
    /// Size of the parameters, in dwords
    pub params: u16,
    /// Packed prolog, register and frame attributes
    pub attributes: u16,
}

impl FpoData {
    /// Encoded size
    pub const SIZE: usize = 16;

    /// Reads one entry.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on truncated input.
    pub fn read<R: BinaryReader + ?Sized>(reader: &mut R) -> Result<FpoData> {
        Ok(FpoData {
            offset: reader.read_le::<u32>()?,
            size: reader.read_le::<u32>()?,
            locals: reader.read_le::<u32>()?,
            params: reader.read_le::<u16>()?,
            attributes: reader.read_le::<u16>()?,
        })
    }

    /// Number of bytes in the prolog
    #[must_use]
    pub fn prolog_size(&self) -> u8 {
        (self.attributes & 0xFF) as u8
    }

    /// Number of registers saved
    #[must_use]
    pub fn saved_registers(&self) -> u8 {
        ((self.attributes >> 8) & 0x7) as u8
    }

    /// Returns `true` if the function uses structured exception handling
    #[must_use]
    pub fn has_seh(&self) -> bool {
        self.attributes & 0x0800 != 0
    }

    /// Returns `true` if `ebp` has been allocated
    #[must_use]
    pub fn uses_base_pointer(&self) -> bool {
        self.attributes & 0x1000 != 0
    }

    /// Frame type
    #[must_use]
    pub fn frame_type(&self) -> FpoFrameType {
        match FpoFrameType::from_repr((self.attributes >> 14) as u8) {
            Some(frame) => frame,
            None => FpoFrameType::NonFpo,
        }
    }
}
