//! Small container types shared by the stream parsers.

pub mod bitset;
pub mod hashtable;

pub use bitset::BitSet;
pub use hashtable::HashTable;
