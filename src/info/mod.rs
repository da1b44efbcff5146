//! The PDB info stream and the string tables it points to.
//!
//! Stream 1 identifies the file and maps stream names to indexes. The most important named
//! stream is `"/names"`, a [`PdbStringTable`] holding the source file names referenced by
//! offset from other streams.

pub mod stream;
pub mod strings;

pub use stream::{PdbFeature, PdbInfoStream};
pub use strings::PdbStringTable;
