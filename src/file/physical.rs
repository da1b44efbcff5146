//! Memory-mapped file backend.
//!
//! PDB files for large binaries routinely reach hundreds of megabytes, while a typical query
//! touches a handful of streams. [`crate::file::physical::Physical`] maps the file read-only and
//! lets the operating system page in only the blocks that are actually read.

use super::{checked_slice, Backend};
use crate::{
    Error::{Error, FileError},
    Result,
};

use memmap2::Mmap;
use std::{fs, path::Path};

/// A file backend that uses memory-mapped I/O for access to files on disk.
///
/// # Examples
///
/// ```rust,ignore
/// use pdbscope::file::{Backend, Physical};
/// use std::path::Path;
///
/// let physical = Physical::new(Path::new("ntdll.pdb"))?;
/// assert_eq!(&physical.data_slice(0, 2)?, b"Mi");
/// # Ok::<(), pdbscope::Error>(())
/// ```
#[derive(Debug)]
pub struct Physical {
    /// Memory-mapped file data
    data: Mmap,
}

impl Physical {
    /// Create a new physical file backend by memory-mapping the specified file.
    ///
    /// # Arguments
    /// * `path` - Path to the PDB file on disk.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or
    /// [`crate::Error::Error`] if memory mapping fails.
    pub fn new(path: impl AsRef<Path>) -> Result<Physical> {
        let file = match fs::File::open(path) {
            Ok(file) => file,
            Err(error) => return Err(FileError(error)),
        };

        // The file is opened read-only and the mapping is never written through.
        let mmap = match unsafe { Mmap::map(&file) } {
            Ok(mmap) => mmap,
            Err(error) => return Err(Error(error.to_string())),
        };

        Ok(Physical { data: mmap })
    }
}

impl Backend for Physical {
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        checked_slice(&self.data, offset, len)
    }

    fn data(&self) -> &[u8] {
        self.data.as_ref()
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}
