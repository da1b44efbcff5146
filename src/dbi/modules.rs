//! Module descriptors of the DBI module info substream and their source file lists.

use crate::{
    dbi::sections::SectionContribution,
    file::reader::BinaryReader,
    Result,
};

/// The fixed-size part of a module descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct ModuleInfoHeader {
    pub module_pointer: u32,
    pub section_contribution: SectionContribution,
    pub flags: u16,
    pub module_symbol_stream: u16,
    pub symbol_byte_size: u32,
    pub c11_byte_size: u32,
    pub c13_byte_size: u32,
    pub source_file_count: u16,
    pub file_name_offsets: u32,
    pub source_file_name_index: u32,
    pub pdb_file_path_name_index: u32,
}

impl ModuleInfoHeader {
    /// Encoded size
    pub const SIZE: usize = 64;

    /// Reads the fixed part of a descriptor.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on truncated input.
    pub fn read<R: BinaryReader + ?Sized>(reader: &mut R) -> Result<ModuleInfoHeader> {
        let module_pointer = reader.read_le::<u32>()?;
        let section_contribution = SectionContribution::read(reader)?;
        let flags = reader.read_le::<u16>()?;
        let module_symbol_stream = reader.read_le::<u16>()?;
        let symbol_byte_size = reader.read_le::<u32>()?;
        let c11_byte_size = reader.read_le::<u32>()?;
        let c13_byte_size = reader.read_le::<u32>()?;
        let source_file_count = reader.read_le::<u16>()?;
        reader.skip(2)?;

        Ok(ModuleInfoHeader {
            module_pointer,
            section_contribution,
            flags,
            module_symbol_stream,
            symbol_byte_size,
            c11_byte_size,
            c13_byte_size,
            source_file_count,
            file_name_offsets: reader.read_le::<u32>()?,
            source_file_name_index: reader.read_le::<u32>()?,
            pdb_file_path_name_index: reader.read_le::<u32>()?,
        })
    }

    /// Returns `true` if the module was written since the DBI was opened
    #[must_use]
    pub fn is_written(&self) -> bool {
        self.flags & 0x1 != 0
    }

    /// Returns `true` if the module was compiled with edit and continue support
    #[must_use]
    pub fn has_edit_and_continue(&self) -> bool {
        self.flags & 0x2 != 0
    }

    /// Index into the type server map
    #[must_use]
    pub fn type_server_index(&self) -> u8 {
        (self.flags >> 8) as u8
    }
}

/// One compiland or import of the image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbiModuleDescriptor {
    /// The fixed part of the descriptor
    pub header: ModuleInfoHeader,
    /// Path of the object or import library
    pub module_name: String,
    /// Path of the archive the object was taken from, same as the module name otherwise
    pub object_file_name: String,
    /// Index of the first source file of this module in the file info substream
    pub start_file_index: u32,
    /// Source file names, filled from the file info substream
    pub source_files: Vec<String>,
}

impl DbiModuleDescriptor {
    /// Reads one descriptor including its trailing names and padding.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on truncated input.
    pub fn read<R: BinaryReader + ?Sized>(reader: &mut R) -> Result<DbiModuleDescriptor> {
        let header = ModuleInfoHeader::read(reader)?;
        let module_name = reader.read_cstring()?;
        let object_file_name = reader.read_cstring()?;
        reader.align(4)?;

        Ok(DbiModuleDescriptor {
            header,
            module_name,
            object_file_name,
            start_file_index: 0,
            source_files: Vec::new(),
        })
    }

    /// Stream index of the module symbols, `None` if the module has none
    #[must_use]
    pub fn symbol_stream(&self) -> Option<u16> {
        (self.header.module_symbol_stream != crate::msf::INVALID_STREAM_INDEX)
            .then_some(self.header.module_symbol_stream)
    }
}

/// Reads every module descriptor and attaches the source files listed in the file info
/// substream.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if the file info substream describes a different
/// number of modules, and [`crate::Error::OutOfBounds`] on truncated input.
pub fn read_modules<R, F>(module_info: &mut R, file_info: &mut F) -> Result<Vec<DbiModuleDescriptor>>
where
    R: BinaryReader + ?Sized,
    F: BinaryReader + ?Sized,
{
    let mut modules = Vec::new();
    while module_info.has_more_data() {
        modules.push(DbiModuleDescriptor::read(module_info)?);
    }

    if file_info.is_empty() {
        return Ok(modules);
    }

    let module_count = file_info.read_le::<u16>()? as usize;
    // The 16-bit source file count overflows on large images, the sum of the per-module
    // counts is authoritative.
    let _ = file_info.read_le::<u16>()?;
    if module_count != modules.len() {
        return Err(malformed_error!("Inconsistent number of modules"));
    }

    let _module_indices = file_info.read_u16_array(module_count)?;
    let file_counts = file_info.read_u16_array(module_count)?;
    let total_files: usize = file_counts.iter().map(|count| *count as usize).sum();
    let name_offsets = file_info.read_u32_array(total_files)?;
    let names_start = file_info.pos();

    let mut start = 0_usize;
    for (module, count) in modules.iter_mut().zip(&file_counts) {
        module.start_file_index = start as u32;
        let end = start + *count as usize;
        for offset in &name_offsets[start..end] {
            file_info.seek(names_start + *offset as usize)?;
            module.source_files.push(file_info.read_cstring()?);
        }
        start = end;
    }

    Ok(modules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{file::parser::Parser, Error};

    fn descriptor(stream: u16, files: u16, name: &str, object: &str) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&0_u32.to_le_bytes());
        data.extend_from_slice(&1_u16.to_le_bytes());
        data.extend_from_slice(&[0; 2]);
        for value in [0x10_i32, 0x20, 0x6000_0020] {
            data.extend_from_slice(&value.to_le_bytes());
        }
        data.extend_from_slice(&0_u16.to_le_bytes());
        data.extend_from_slice(&[0; 2]);
        data.extend_from_slice(&[0; 8]);
        data.extend_from_slice(&0x0102_u16.to_le_bytes());
        data.extend_from_slice(&stream.to_le_bytes());
        for value in [0x40_u32, 0, 0x80] {
            data.extend_from_slice(&value.to_le_bytes());
        }
        data.extend_from_slice(&files.to_le_bytes());
        data.extend_from_slice(&[0; 2]);
        data.extend_from_slice(&[0; 12]);
        data.extend_from_slice(name.as_bytes());
        data.push(0);
        data.extend_from_slice(object.as_bytes());
        data.push(0);
        while data.len() % 4 != 0 {
            data.push(0);
        }
        data
    }

    fn file_info(modules: u16, counts: &[u16]) -> Vec<u8> {
        let names = b"a.cpp\0b.h\0c.cpp\0";
        let offsets = [0_u32, 6, 10];

        let mut data = Vec::new();
        data.extend_from_slice(&modules.to_le_bytes());
        data.extend_from_slice(&3_u16.to_le_bytes());
        for index in 0..counts.len() as u16 {
            data.extend_from_slice(&index.to_le_bytes());
        }
        for count in counts {
            data.extend_from_slice(&count.to_le_bytes());
        }
        for offset in offsets {
            data.extend_from_slice(&offset.to_le_bytes());
        }
        data.extend_from_slice(names);
        data
    }

    #[test]
    fn crafted() {
        let mut module_info = descriptor(12, 2, "a.obj", "a.obj");
        module_info.extend(descriptor(0xFFFF, 1, "* Linker *", ""));
        let files = file_info(2, &[2, 1]);

        let modules =
            read_modules(&mut Parser::new(&module_info), &mut Parser::new(&files)).unwrap();
        assert_eq!(modules.len(), 2);

        assert_eq!(modules[0].module_name, "a.obj");
        assert_eq!(modules[0].symbol_stream(), Some(12));
        assert_eq!(modules[0].header.section_contribution.size, 0x20);
        assert_eq!(modules[0].header.symbol_byte_size, 0x40);
        assert!(!modules[0].header.is_written());
        assert!(modules[0].header.has_edit_and_continue());
        assert_eq!(modules[0].header.type_server_index(), 1);
        assert_eq!(modules[0].start_file_index, 0);
        assert_eq!(modules[0].source_files, vec!["a.cpp", "b.h"]);

        assert_eq!(modules[1].module_name, "* Linker *");
        assert_eq!(modules[1].object_file_name, "");
        assert_eq!(modules[1].symbol_stream(), None);
        assert_eq!(modules[1].start_file_index, 2);
        assert_eq!(modules[1].source_files, vec!["c.cpp"]);
    }

    #[test]
    fn inconsistent_module_count() {
        let module_info = descriptor(12, 2, "a.obj", "a.obj");
        let files = file_info(2, &[2, 1]);

        assert!(matches!(
            read_modules(&mut Parser::new(&module_info), &mut Parser::new(&files)),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn truncated_descriptor() {
        let module_info = descriptor(12, 2, "a.obj", "a.obj");
        assert!(read_modules(&mut Parser::new(&module_info[..40]), &mut Parser::new(&[])).is_err());
    }
}
