//! The type (TPI) and id (IPI) streams.
//!
//! Both streams share one layout: a fixed header followed by a densely packed sequence of
//! CodeView records, addressed by [`TypeIndex`]. Indexes below `0x1000` do not reference a
//! record at all but encode a builtin type directly, see [`SimpleTypeKind`] and
//! [`SimpleTypeMode`].
//!
//! # Key Components
//!
//! - [`crate::tpi::TpiStream`] - Record scan, lazy decoding and the hash side tables
//! - [`crate::tpi::TpiStreamHeader`] - The validated stream header
//! - [`crate::tpi::TypeIndex`] - Index into the record sequence or builtin type
//!
//! # Thread Safety
//!
//! [`TpiStream`] is `Send + Sync`. Records are decoded at most once, concurrent first accesses
//! to the same index resolve to the same stored record.

pub mod header;
pub mod simple;
pub mod stream;
pub mod typeindex;

pub use header::{EmbeddedBuffer, TpiStreamHeader};
pub use simple::{SimpleTypeKind, SimpleTypeMode};
pub use stream::TpiStream;
pub use typeindex::{TypeIndex, TypeIndexOffset};
