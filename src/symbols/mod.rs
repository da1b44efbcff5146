//! The global symbol record stream.
//!
//! The stream index is stored in the DBI header. Records share the `(length, kind)` prefix of
//! type records; the kinds are described by [`SymbolRecordKind`].
//!
//! # Key Components
//!
//! - [`crate::symbols::SymbolStream`] - Prefix scan and per-kind decoding
//! - [`crate::symbols::SymbolRecord`] - The decoded records

pub mod kind;
pub mod records;
pub mod stream;

pub use kind::SymbolRecordKind;
pub use records::*;
pub use stream::SymbolStream;
