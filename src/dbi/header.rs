//! The fixed 64-byte header of the DBI stream.
//!
//! Besides the version and age, the header names the global, public and symbol record
//! streams and gives the byte sizes of the substreams that follow it.

use bitflags::bitflags;
use strum::FromRepr;

use crate::{file::reader::BinaryReader, Result};

/// Oldest DBI version accepted, Visual C++ 7.0
pub const DBI_VERSION_V70: u32 = 19_990_903;

/// Mask of the minor version in [`DbiStreamHeader::build_number`]
pub const BUILD_MINOR_MASK: u16 = 0x00FF;
/// Mask of the major version in [`DbiStreamHeader::build_number`]
pub const BUILD_MAJOR_MASK: u16 = 0x7F00;
/// Set if the build number uses the format above
pub const BUILD_NEW_FORMAT: u16 = 0x8000;

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
    /// Link properties of the image
    pub struct DbiFlags : u16 {
        /// Linked incrementally
        const INCREMENTALLY_LINKED = 0x0001;
        /// Private symbols were stripped
        const STRIPPED = 0x0002;
        /// Contains C types
        const HAS_CTYPES = 0x0004;
    }
}

/// Target machine of the image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr)]
#[repr(u16)]
#[allow(missing_docs)]
pub enum MachineType {
    Unknown = 0x0000,
    X86 = 0x014c,
    R3000 = 0x0162,
    R4000 = 0x0166,
    R10000 = 0x0168,
    WceMipsV2 = 0x0169,
    Alpha = 0x0184,
    Sh3 = 0x01a2,
    Sh3Dsp = 0x01a3,
    Sh3E = 0x01a4,
    Sh4 = 0x01a6,
    Sh5 = 0x01a8,
    Arm = 0x01c0,
    Thumb = 0x01c2,
    ArmNT = 0x01c4,
    Am33 = 0x01d3,
    PowerPC = 0x01f0,
    PowerPCFP = 0x01f1,
    Ia64 = 0x0200,
    Mips16 = 0x0266,
    Alpha64 = 0x0284,
    MipsFpu = 0x0366,
    MipsFpu16 = 0x0466,
    TriCore = 0x0520,
    Cef = 0x0cef,
    Ebc = 0x0ebc,
    Amd64 = 0x8664,
    M32R = 0x9041,
    Arm64 = 0xaa64,
    Cee = 0xc0ee,
}

impl MachineType {
    /// Pointer size of the machine, 8 for 64-bit targets and 4 otherwise
    #[must_use]
    pub fn pointer_size(self) -> u32 {
        match self {
            MachineType::Amd64 | MachineType::Arm64 | MachineType::Ia64 => 8,
            _ => 4,
        }
    }
}

/// The 64-byte header of the DBI stream
///
/// ## Layout
///
/// | Offset | Size | Field                                 |
/// |--------|------|---------------------------------------|
/// | 0x00   | 4    | `version_signature`, always -1        |
/// | 0x04   | 4    | `version`                             |
/// | 0x08   | 4    | `age`                                 |
/// | 0x0C   | 2    | `global_symbol_stream_index`          |
/// | 0x0E   | 2    | `build_number`                        |
/// | 0x10   | 2    | `public_symbol_stream_index`          |
/// | 0x12   | 2    | `pdb_dll_version`                     |
/// | 0x14   | 2    | `symbol_record_stream_index`          |
/// | 0x16   | 2    | `pdb_dll_rbld`                        |
/// | 0x18   | 4    | `module_info_size`                    |
/// | 0x1C   | 4    | `section_contribution_size`           |
/// | 0x20   | 4    | `section_map_size`                    |
/// | 0x24   | 4    | `file_info_size`                      |
/// | 0x28   | 4    | `type_server_map_size`                |
/// | 0x2C   | 4    | `mfc_type_server_index`               |
/// | 0x30   | 4    | `optional_debug_header_size`          |
/// | 0x34   | 4    | `ec_substream_size`                   |
/// | 0x38   | 2    | `flags`                               |
/// | 0x3A   | 2    | `machine`                             |
/// | 0x3C   | 4    | `padding`                             |
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct DbiStreamHeader {
    pub version_signature: i32,
    pub version: u32,
    pub age: u32,
    pub global_symbol_stream_index: u16,
    pub build_number: u16,
    pub public_symbol_stream_index: u16,
    pub pdb_dll_version: u16,
    pub symbol_record_stream_index: u16,
    pub pdb_dll_rbld: u16,
    pub module_info_size: i32,
    pub section_contribution_size: i32,
    pub section_map_size: i32,
    pub file_info_size: i32,
    pub type_server_map_size: i32,
    pub mfc_type_server_index: u32,
    pub optional_debug_header_size: i32,
    pub ec_substream_size: i32,
    pub flags: DbiFlags,
    pub machine: u16,
    pub padding: u32,
}

impl DbiStreamHeader {
    /// Encoded size
    pub const SIZE: usize = 64;

    /// Reads and validates the header.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for a short stream, a version signature other
    /// than -1, a version older than [`DBI_VERSION_V70`] or a negative substream size.
    pub fn read<R: BinaryReader + ?Sized>(reader: &mut R) -> Result<DbiStreamHeader> {
        if reader.remaining() < Self::SIZE {
            return Err(malformed_error!("DBI stream does not contain a header"));
        }

        let header = DbiStreamHeader {
            version_signature: reader.read_le::<i32>()?,
            version: reader.read_le::<u32>()?,
            age: reader.read_le::<u32>()?,
            global_symbol_stream_index: reader.read_le::<u16>()?,
            build_number: reader.read_le::<u16>()?,
            public_symbol_stream_index: reader.read_le::<u16>()?,
            pdb_dll_version: reader.read_le::<u16>()?,
            symbol_record_stream_index: reader.read_le::<u16>()?,
            pdb_dll_rbld: reader.read_le::<u16>()?,
            module_info_size: reader.read_le::<i32>()?,
            section_contribution_size: reader.read_le::<i32>()?,
            section_map_size: reader.read_le::<i32>()?,
            file_info_size: reader.read_le::<i32>()?,
            type_server_map_size: reader.read_le::<i32>()?,
            mfc_type_server_index: reader.read_le::<u32>()?,
            optional_debug_header_size: reader.read_le::<i32>()?,
            ec_substream_size: reader.read_le::<i32>()?,
            flags: DbiFlags::from_bits_truncate(reader.read_le::<u16>()?),
            machine: reader.read_le::<u16>()?,
            padding: reader.read_le::<u32>()?,
        };

        if header.version_signature != -1 {
            return Err(malformed_error!("Invalid DBI version signature"));
        }
        if header.version < DBI_VERSION_V70 {
            return Err(malformed_error!("Unsupported DBI version {}", header.version));
        }
        if header.substream_sizes().iter().any(|size| *size < 0) {
            return Err(malformed_error!("Negative DBI substream size"));
        }

        Ok(header)
    }

    /// Sizes of the substreams following the header, in stream order
    ///
    /// Module info, section contributions, section map, file info, type server map, edit and
    /// continue, optional debug header.
    #[must_use]
    pub fn substream_sizes(&self) -> [i32; 7] {
        [
            self.module_info_size,
            self.section_contribution_size,
            self.section_map_size,
            self.file_info_size,
            self.type_server_map_size,
            self.ec_substream_size,
            self.optional_debug_header_size,
        ]
    }

    /// Major toolchain version from the build number
    #[must_use]
    pub fn build_major(&self) -> u16 {
        (self.build_number & BUILD_MAJOR_MASK) >> 8
    }

    /// Minor toolchain version from the build number
    #[must_use]
    pub fn build_minor(&self) -> u16 {
        self.build_number & BUILD_MINOR_MASK
    }

    /// Returns `true` if the build number uses the major/minor format
    #[must_use]
    pub fn has_new_build_format(&self) -> bool {
        self.build_number & BUILD_NEW_FORMAT != 0
    }

    /// Target machine, `None` for unknown values
    #[must_use]
    pub fn machine(&self) -> Option<MachineType> {
        MachineType::from_repr(self.machine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{file::parser::Parser, Error};

    fn header(signature: i32, version: u32, sizes: [i32; 7], machine: u16) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&signature.to_le_bytes());
        data.extend_from_slice(&version.to_le_bytes());
        data.extend_from_slice(&1_u32.to_le_bytes());
        for value in [7_u16, 0x8E1D, 8, 0, 9, 1] {
            data.extend_from_slice(&value.to_le_bytes());
        }
        // module info .. type server map
        for size in &sizes[..5] {
            data.extend_from_slice(&size.to_le_bytes());
        }
        data.extend_from_slice(&0_u32.to_le_bytes());
        data.extend_from_slice(&sizes[6].to_le_bytes());
        data.extend_from_slice(&sizes[5].to_le_bytes());
        data.extend_from_slice(&1_u16.to_le_bytes());
        data.extend_from_slice(&machine.to_le_bytes());
        data.extend_from_slice(&0_u32.to_le_bytes());
        data
    }

    #[test]
    fn crafted() {
        let data = header(-1, 19_990_903, [8, 4, 0, 0, 0, 0, 22], 0x8664);
        assert_eq!(data.len(), DbiStreamHeader::SIZE);
        let header = DbiStreamHeader::read(&mut Parser::new(&data)).unwrap();

        assert_eq!(header.global_symbol_stream_index, 7);
        assert_eq!(header.symbol_record_stream_index, 9);
        assert_eq!(header.build_major(), 14);
        assert_eq!(header.build_minor(), 0x1D);
        assert!(header.has_new_build_format());
        assert_eq!(header.module_info_size, 8);
        assert_eq!(header.optional_debug_header_size, 22);
        assert_eq!(header.flags, DbiFlags::INCREMENTALLY_LINKED);
        assert_eq!(header.machine(), Some(MachineType::Amd64));
        assert_eq!(MachineType::Amd64.pointer_size(), 8);
        assert_eq!(MachineType::X86.pointer_size(), 4);
    }

    #[test]
    fn crafted_invalid() {
        for data in [
            header(0, 19_990_903, [0; 7], 0x14c),
            header(-1, 19_970_606, [0; 7], 0x14c),
            header(-1, 19_990_903, [0, -4, 0, 0, 0, 0, 0], 0x14c),
        ] {
            assert!(matches!(
                DbiStreamHeader::read(&mut Parser::new(&data)),
                Err(Error::Malformed { .. })
            ));
        }

        let data = header(-1, 19_990_903, [0; 7], 0x14c);
        assert!(matches!(
            DbiStreamHeader::read(&mut Parser::new(&data[..60])),
            Err(Error::Malformed { .. })
        ));
    }
}
