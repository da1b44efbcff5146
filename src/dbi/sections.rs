//! Section contributions, the section map and COFF section headers.

use bitflags::bitflags;

use crate::{file::reader::BinaryReader, Result};

/// Section contribution substream version written by Visual C++ 6.0 and newer
pub const SECTION_CONTRIBUTION_V60: u32 = 0xeffe_0000 + 19_970_605;
/// Section contribution substream version carrying the COFF section index
pub const SECTION_CONTRIBUTION_V2: u32 = 0xeffe_0000 + 20_140_516;

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
    /// Characteristics of a COFF section, as found in `IMAGE_SECTION_HEADER`
    pub struct ImageSectionCharacteristics : u32 {
        /// Must not be padded to the next boundary
        const TYPE_NO_PAD = 0x0000_0008;
        /// Executable code
        const CNT_CODE = 0x0000_0020;
        /// Initialized data
        const CNT_INITIALIZED_DATA = 0x0000_0040;
        /// Uninitialized data
        const CNT_UNINITIALIZED_DATA = 0x0000_0080;
        /// Reserved
        const LNK_OTHER = 0x0000_0100;
        /// Comments or other information
        const LNK_INFO = 0x0000_0200;
        /// Not part of the image
        const LNK_REMOVE = 0x0000_0800;
        /// COMDAT data
        const LNK_COMDAT = 0x0000_1000;
        /// Reset speculative exception handling bits in the TLB entries
        const NO_DEFER_SPEC_EXC = 0x0000_4000;
        /// Referenced through the global pointer
        const GPREL = 0x0000_8000;
        /// Reserved
        const MEM_PURGEABLE = 0x0002_0000;
        /// Reserved
        const MEM_LOCKED = 0x0004_0000;
        /// Reserved
        const MEM_PRELOAD = 0x0008_0000;
        /// Contains extended relocations
        const LNK_NRELOC_OVFL = 0x0100_0000;
        /// Can be discarded
        const MEM_DISCARDABLE = 0x0200_0000;
        /// Cannot be cached
        const MEM_NOT_CACHED = 0x0400_0000;
        /// Cannot be paged
        const MEM_NOT_PAGED = 0x0800_0000;
        /// Can be shared
        const MEM_SHARED = 0x1000_0000;
        /// Can be executed
        const MEM_EXECUTE = 0x2000_0000;
        /// Can be read
        const MEM_READ = 0x4000_0000;
        /// Can be written
        const MEM_WRITE = 0x8000_0000;
    }
}

/// Bitmask of the alignment field in [`ImageSectionCharacteristics`]
pub const SECTION_ALIGN_MASK: u32 = 0x00F0_0000;

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
    /// Flags of a section map entry
    pub struct SectionMapEntryFlags : u16 {
        /// Segment is readable
        const READ = 0x0001;
        /// Segment is writable
        const WRITE = 0x0002;
        /// Segment is executable
        const EXECUTE = 0x0004;
        /// Descriptor describes a 32-bit linear address
        const ADDRESS_IS_32_BIT = 0x0008;
        /// Frame represents a selector
        const IS_SELECTOR = 0x0100;
        /// Frame represents an absolute address
        const IS_ABSOLUTE_ADDRESS = 0x0200;
        /// Descriptor represents a group
        const IS_GROUP = 0x0400;
    }
}

/// A range of an image section contributed by one module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(missing_docs)]
pub struct SectionContribution {
    pub section: u16,
    pub offset: i32,
    pub size: i32,
    pub characteristics: ImageSectionCharacteristics,
    pub module_index: u16,
    pub data_crc: u32,
    pub relocation_crc: u32,
}

impl SectionContribution {
    /// Encoded size
    pub const SIZE: usize = 28;

    /// Reads one entry.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on truncated input.
    pub fn read<R: BinaryReader + ?Sized>(reader: &mut R) -> Result<SectionContribution> {
        let section = reader.read_le::<u16>()?;
        reader.skip(2)?;
        let offset = reader.read_le::<i32>()?;
        let size = reader.read_le::<i32>()?;
        let characteristics =
            ImageSectionCharacteristics::from_bits_retain(reader.read_le::<u32>()?);
        let module_index = reader.read_le::<u16>()?;
        reader.skip(2)?;

        Ok(SectionContribution {
            section,
            offset,
            size,
            characteristics,
            module_index,
            data_crc: reader.read_le::<u32>()?,
            relocation_crc: reader.read_le::<u32>()?,
        })
    }
}

/// A [`SectionContribution`] extended with the COFF section index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SectionContribution2 {
    /// The common fields
    pub base: SectionContribution,
    /// Index of the section in the COFF object
    pub coff_section: u32,
}

impl SectionContribution2 {
    /// Encoded size
    pub const SIZE: usize = 32;

    /// Reads one entry.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on truncated input.
    pub fn read<R: BinaryReader + ?Sized>(reader: &mut R) -> Result<SectionContribution2> {
        Ok(SectionContribution2 {
            base: SectionContribution::read(reader)?,
            coff_section: reader.read_le::<u32>()?,
        })
    }
}

/// One logical segment of the section map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct SectionMapEntry {
    pub flags: SectionMapEntryFlags,
    pub overlay: u16,
    pub group: u16,
    pub frame: u16,
    pub section_name: u16,
    pub class_name: u16,
    pub offset: u32,
    pub section_length: u32,
}

impl SectionMapEntry {
    /// Encoded size
    pub const SIZE: usize = 20;

    /// Reads one entry.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on truncated input.
    pub fn read<R: BinaryReader + ?Sized>(reader: &mut R) -> Result<SectionMapEntry> {
        Ok(SectionMapEntry {
            flags: SectionMapEntryFlags::from_bits_retain(reader.read_le::<u16>()?),
            overlay: reader.read_le::<u16>()?,
            group: reader.read_le::<u16>()?,
            frame: reader.read_le::<u16>()?,
            section_name: reader.read_le::<u16>()?,
            class_name: reader.read_le::<u16>()?,
            offset: reader.read_le::<u32>()?,
            section_length: reader.read_le::<u32>()?,
        })
    }
}

/// A 40-byte `IMAGE_SECTION_HEADER` copied from the image
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct CoffSectionHeader {
    pub name: [u8; 8],
    pub virtual_size: u32,
    pub virtual_address: u32,
    pub size_of_raw_data: u32,
    pub pointer_to_raw_data: u32,
    pub pointer_to_relocations: u32,
    pub pointer_to_linenumbers: u32,
    pub number_of_relocations: u16,
    pub number_of_linenumbers: u16,
    pub characteristics: ImageSectionCharacteristics,
}

impl CoffSectionHeader {
    /// Encoded size
    pub const SIZE: usize = 40;

    /// Reads one header.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on truncated input.
    pub fn read<R: BinaryReader + ?Sized>(reader: &mut R) -> Result<CoffSectionHeader> {
        let mut name = [0_u8; 8];
        reader.read_into(&mut name)?;

        Ok(CoffSectionHeader {
            name,
            virtual_size: reader.read_le::<u32>()?,
            virtual_address: reader.read_le::<u32>()?,
            size_of_raw_data: reader.read_le::<u32>()?,
            pointer_to_raw_data: reader.read_le::<u32>()?,
            pointer_to_relocations: reader.read_le::<u32>()?,
            pointer_to_linenumbers: reader.read_le::<u32>()?,
            number_of_relocations: reader.read_le::<u16>()?,
            number_of_linenumbers: reader.read_le::<u16>()?,
            characteristics: ImageSectionCharacteristics::from_bits_retain(
                reader.read_le::<u32>()?,
            ),
        })
    }

    /// Section name up to the first null byte
    #[must_use]
    pub fn name(&self) -> String {
        let end = self
            .name
            .iter()
            .position(|byte| *byte == 0)
            .unwrap_or(self.name.len());
        String::from_utf8_lossy(&self.name[..end]).into_owned()
    }

    /// Section alignment in bytes, `None` if the header does not specify one
    #[must_use]
    pub fn alignment(&self) -> Option<u32> {
        match (self.characteristics.bits() & SECTION_ALIGN_MASK) >> 20 {
            0 => None,
            shift @ 1..=14 => Some(1 << (shift - 1)),
            _ => None,
        }
    }
}
