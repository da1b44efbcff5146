//! Byte sources and cursors.
//!
//! Everything that touches raw bytes lives here. The MSF container, every stream and every
//! record decoder read through the types in this module, never through ad-hoc slicing.
//!
//! # Architecture
//!
//! - **Backends** - A [`crate::file::Backend`] owns the complete file contents, either as a
//!   read-only memory map ([`crate::file::physical::Physical`]) or as an owned buffer
//!   ([`crate::file::memory::Memory`]). Backends are shared between all streams of a file
//!   through an `Arc`.
//! - **Cursors** - [`crate::file::reader::BinaryReader`] is the one decoding interface. It is
//!   implemented by [`crate::file::parser::Parser`] for contiguous bytes and by
//!   [`crate::file::mapped::MappedBlockReader`] for streams scattered across MSF blocks.
//! - **Primitives** - [`crate::file::io`] decodes fixed-width little-endian integers and
//!   [`crate::file::numeric`] the CodeView encoded integers.
//!
//! # Examples
//!
//! ```rust
//! use pdbscope::{BinaryReader, MappedBlockReader};
//!
//! // Two 4-byte blocks, the stream uses block 1 first and block 0 second
//! let data = [0x05, 0x06, 0x07, 0x08, 0x01, 0x02, 0x03, 0x04];
//! let blocks = [1, 0];
//! let mut reader = MappedBlockReader::new(&data, &blocks, 4, 8);
//!
//! reader.skip(2)?;
//! assert_eq!(reader.read_le::<u32>()?, 0x0605_0403);
//! # Ok::<(), pdbscope::Error>(())
//! ```
//!
//! # Thread Safety
//!
//! Backends are `Send + Sync` and never mutated after construction. Cursors are cheap values
//! that are created per read and never shared.

pub mod io;
pub mod mapped;
pub mod numeric;
pub mod parser;
pub mod reader;

mod memory;
mod physical;

pub use memory::Memory;
pub use physical::Physical;

use crate::Result;

/// Backend trait for file data sources.
///
/// This trait abstracts over where the bytes of a PDB file live, so the container can be
/// parsed identically from disk or from a buffer. All implementations must be thread-safe,
/// because a single backend is shared by every stream of a file.
pub trait Backend: Send + Sync {
    /// Returns `len` bytes starting at `offset`.
    ///
    /// # Arguments
    ///
    /// * `offset` - The starting offset within the data.
    /// * `len` - The length of the slice in bytes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if the requested range is out of bounds.
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]>;

    /// Returns the entire data buffer.
    fn data(&self) -> &[u8];

    /// Returns the total length of the data buffer.
    fn len(&self) -> usize;

    /// Returns `true` if the backend holds no data.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Bounds-checked slicing shared by both backends.
fn checked_slice(data: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    let Some(offset_end) = offset.checked_add(len) else {
        return Err(out_of_bounds_error!());
    };

    data.get(offset..offset_end)
        .ok_or(out_of_bounds_error!())
}
