//! Type indexes and the index offset pairs of the TPI hash stream.
//!
//! Indexes below `0x1000` name built-in types directly, see [`crate::tpi::simple`]. Every
//! other index addresses a record, counted from the first index of the stream.

use std::fmt;

use crate::{
    file::{io::PdbIO, reader::BinaryReader},
    tpi::simple::{SimpleTypeKind, SimpleTypeMode},
    Result,
};

/// A reference to a type.
///
/// Values below [`TypeIndex::FIRST_NON_SIMPLE`] encode a built-in type directly: the low byte
/// is a [`SimpleTypeKind`], bits 8 to 10 a [`SimpleTypeMode`]. Every other value is an index
/// into the record array of a TPI or IPI stream, offset by [`TypeIndex::FIRST_NON_SIMPLE`].
///
/// # Examples
///
/// ```rust
/// use pdbscope::tpi::{SimpleTypeKind, SimpleTypeMode, TypeIndex};
///
/// let index = TypeIndex::simple(SimpleTypeKind::Int32, SimpleTypeMode::NearPointer32);
/// assert!(index.is_simple());
/// assert_eq!(index.simple_type_name(), "int*");
///
/// let record = TypeIndex::from_array_index(2);
/// assert_eq!(record.index(), 0x1002);
/// assert_eq!(record.array_index(), Some(2));
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeIndex(pub u32);

impl TypeIndex {
    /// First index referencing a record instead of a built-in
    pub const FIRST_NON_SIMPLE: u32 = 0x1000;
    /// Mask of the [`SimpleTypeKind`] bits
    pub const SIMPLE_KIND_MASK: u32 = 0x0000_00ff;
    /// Mask of the [`SimpleTypeMode`] bits
    pub const SIMPLE_MODE_MASK: u32 = 0x0000_0700;

    /// The "no type" index
    pub const NONE: TypeIndex = TypeIndex(0);
    /// `void`
    pub const VOID: TypeIndex = TypeIndex(SimpleTypeKind::Void as u32);

    /// Creates a simple type index from a kind and a pointer mode.
    #[must_use]
    pub const fn simple(kind: SimpleTypeKind, mode: SimpleTypeMode) -> TypeIndex {
        TypeIndex(kind as u32 | mode as u32)
    }

    /// Creates the index of the record at position `index` of a type stream.
    #[must_use]
    pub const fn from_array_index(index: u32) -> TypeIndex {
        TypeIndex(index.saturating_add(Self::FIRST_NON_SIMPLE))
    }

    /// The raw value
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }

    /// Returns `true` if this index encodes a built-in type
    #[must_use]
    pub const fn is_simple(self) -> bool {
        self.0 < Self::FIRST_NON_SIMPLE
    }

    /// Returns `true` for [`TypeIndex::NONE`]
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == Self::NONE.0
    }

    /// Position of the referenced record, `None` for simple indexes.
    #[must_use]
    pub const fn array_index(self) -> Option<u32> {
        if self.is_simple() {
            None
        } else {
            Some(self.0 - Self::FIRST_NON_SIMPLE)
        }
    }

    /// The built-in kind, if the kind bits hold a known value
    #[must_use]
    pub fn simple_kind(self) -> Option<SimpleTypeKind> {
        SimpleTypeKind::from_repr(self.0 & Self::SIMPLE_KIND_MASK)
    }

    /// The pointer mode of a simple index
    #[must_use]
    pub fn simple_mode(self) -> SimpleTypeMode {
        SimpleTypeMode::from_repr(self.0 & Self::SIMPLE_MODE_MASK).unwrap_or(SimpleTypeMode::Direct)
    }

    /// The same built-in without pointer mode
    #[must_use]
    pub const fn direct(self) -> TypeIndex {
        TypeIndex(self.0 & Self::SIMPLE_KIND_MASK)
    }

    /// The C/C++ spelling of a simple index.
    ///
    /// Pointer modes append `*`. [`TypeIndex::NONE`] yields `"<no type>"` and any kind without
    /// a spelling yields `"<unknown simple type>"`.
    #[must_use]
    pub fn simple_type_name(self) -> String {
        if self.is_none() {
            return "<no type>".to_string();
        }

        match self.simple_kind().and_then(SimpleTypeKind::name) {
            Some(name) if self.simple_mode().is_pointer() => format!("{name}*"),
            Some(name) => name.to_string(),
            None => "<unknown simple type>".to_string(),
        }
    }

    /// Every built-in type that has a spelling, in direct mode.
    #[must_use]
    pub fn builtin_types() -> Vec<TypeIndex> {
        SimpleTypeKind::named()
            .map(|kind| TypeIndex::simple(kind, SimpleTypeMode::Direct))
            .collect()
    }

    /// Reads a type index from `reader`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than 4 bytes remain.
    pub fn read<R: BinaryReader + ?Sized>(reader: &mut R) -> Result<TypeIndex> {
        Ok(TypeIndex(reader.read_le::<u32>()?))
    }
}

impl From<u32> for TypeIndex {
    fn from(value: u32) -> Self {
        TypeIndex(value)
    }
}

impl From<SimpleTypeKind> for TypeIndex {
    fn from(kind: SimpleTypeKind) -> Self {
        TypeIndex::simple(kind, SimpleTypeMode::Direct)
    }
}

impl fmt::Debug for TypeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_simple() {
            write!(f, "TypeIndex(0x{:04x} {})", self.0, self.simple_type_name())
        } else {
            write!(f, "TypeIndex(0x{:04x})", self.0)
        }
    }
}

impl fmt::Display for TypeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04x}", self.0)
    }
}

/// An entry of the TPI index offset buffer: the stream offset of every n-th record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeIndexOffset {
    /// The first record covered by this entry
    pub type_index: TypeIndex,
    /// Offset of that record in the type record area
    pub offset: u32,
}

impl TypeIndexOffset {
    /// Encoded size
    pub const SIZE: usize = 8;

    /// Reads one entry from `reader`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on truncated input.
    pub fn read<R: BinaryReader + ?Sized>(reader: &mut R) -> Result<TypeIndexOffset> {
        Ok(TypeIndexOffset {
            type_index: TypeIndex::read(reader)?,
            offset: reader.read_le::<u32>()?,
        })
    }
}

impl PdbIO for TypeIndex {
    type Bytes = [u8; 4];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        TypeIndex(u32::from_le_bytes(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::parser::Parser;

    #[test]
    fn simple_pointer_name() {
        let index = TypeIndex::simple(SimpleTypeKind::Int32, SimpleTypeMode::NearPointer32);
        assert_eq!(index.index(), 0x474);
        assert!(index.is_simple());
        assert_eq!(index.simple_kind(), Some(SimpleTypeKind::Int32));
        assert_eq!(index.simple_mode(), SimpleTypeMode::NearPointer32);
        assert_eq!(index.simple_type_name(), "int*");
        assert_eq!(index.direct().simple_type_name(), "int");
    }

    #[test]
    fn special_names() {
        assert_eq!(TypeIndex::NONE.simple_type_name(), "<no type>");
        assert_eq!(TypeIndex(0x0001).simple_type_name(), "<unknown simple type>");
        assert_eq!(
            TypeIndex::from(SimpleTypeKind::Boolean128).simple_type_name(),
            "<unknown simple type>"
        );
        assert_eq!(TypeIndex::VOID.simple_type_name(), "void");
    }

    #[test]
    fn simple_boundary() {
        for value in [0, 1, 0x74, 0x0FFF, 0x1000, 0x1001, u32::MAX] {
            let index = TypeIndex(value);
            assert_eq!(index.is_simple(), value < TypeIndex::FIRST_NON_SIMPLE);
            assert_eq!(index.array_index().is_none(), index.is_simple());
        }
    }

    #[test]
    fn array_index_roundtrip() {
        for n in [0, 1, 2, 0x1000, 123_456, u32::MAX - TypeIndex::FIRST_NON_SIMPLE] {
            assert_eq!(TypeIndex::from_array_index(n).array_index(), Some(n));
        }
    }

    #[test]
    fn builtins() {
        let builtins = TypeIndex::builtin_types();
        assert!(builtins.iter().all(|index| index.is_simple()));
        assert!(!builtins.contains(&TypeIndex::NONE));
        assert!(builtins.contains(&TypeIndex::from(SimpleTypeKind::HResult)));
        assert!(builtins
            .iter()
            .all(|index| !index.simple_type_name().starts_with('<') || index.0 == 7));
    }

    #[test]
    fn read() {
        let mut parser = Parser::new(&[0x03, 0x10, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00]);
        let entry = TypeIndexOffset::read(&mut parser).unwrap();
        assert_eq!(entry.type_index, TypeIndex(0x1003));
        assert_eq!(entry.offset, 0x10);
    }
}
