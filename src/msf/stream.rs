//! Streams as block lists over the shared file contents.

use std::{fmt, sync::Arc};

use crate::file::{mapped::MappedBlockReader, Backend};

/// A logical stream of an MSF container.
///
/// A stream is a byte length plus the list of blocks its contents are scattered across. It
/// shares the file contents with every other stream of the same file, so cloning a stream is
/// cheap and a stream stays valid for as long as any clone exists.
///
/// Reads go through [`PdbStream::reader`], which hands out a fresh cursor every time. Two
/// readers over the same stream never observe each other's position.
///
/// # Examples
///
/// ```rust,no_run
/// use pdbscope::{BinaryReader, PdbFile};
/// use std::path::Path;
///
/// let pdb = PdbFile::from_file(Path::new("ntdll.pdb"))?;
/// let info = pdb.stream(1)?;
/// let mut reader = info.reader();
/// println!("PDB info version {}", reader.read_le::<u32>()?);
/// # Ok::<(), pdbscope::Error>(())
/// ```
#[derive(Clone)]
pub struct PdbStream {
    index: u32,
    length: usize,
    unused: bool,
    blocks: Arc<[u32]>,
    block_size: usize,
    data: Arc<dyn Backend>,
}

impl PdbStream {
    /// Size value the directory uses for streams that do not exist
    pub const UNUSED_SIZE: u32 = 0xFFFF_FFFF;

    pub(crate) fn new(
        index: u32,
        size: u32,
        blocks: Vec<u32>,
        block_size: u32,
        data: Arc<dyn Backend>,
    ) -> PdbStream {
        let unused = size == Self::UNUSED_SIZE;
        PdbStream {
            index,
            length: if unused { 0 } else { size as usize },
            unused,
            blocks: blocks.into(),
            block_size: block_size as usize,
            data,
        }
    }

    /// Position of this stream in the stream directory
    #[must_use]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Length of the stream in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the stream holds no data
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns `true` if the directory marks this stream slot as unused
    #[must_use]
    pub fn is_unused(&self) -> bool {
        self.unused
    }

    /// Blocks holding the stream contents, in stream order
    #[must_use]
    pub fn blocks(&self) -> &[u32] {
        &self.blocks
    }

    /// Creates a new reader positioned at the start of the stream.
    #[must_use]
    pub fn reader(&self) -> MappedBlockReader<'_> {
        MappedBlockReader::new(self.data.data(), &self.blocks, self.block_size, self.length)
    }
}

impl fmt::Debug for PdbStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PdbStream")
            .field("index", &self.index)
            .field("length", &self.length)
            .field("unused", &self.unused)
            .field("blocks", &self.blocks)
            .finish_non_exhaustive()
    }
}
