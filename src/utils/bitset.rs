//! Sparse bit vectors as stored inside PDB hash tables.
//!
//! On disk a bit vector is a `u32` word count followed by that many little-endian `u32`
//! words. Bit `n` lives in word `n / 32` at position `n % 32`. Bits past the stored words are
//! implicitly clear, which is what makes the encoding "sparse": trailing zero words are
//! simply never written.

use crate::{file::reader::BinaryReader, Result};

/// A bit vector backed by 32-bit words.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct BitSet {
    words: Vec<u32>,
}

impl BitSet {
    /// Reads a word count followed by the words from `reader`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the reader holds fewer words than announced.
    pub fn read<R: BinaryReader + ?Sized>(reader: &mut R) -> Result<Self> {
        let count = reader.read_le::<u32>()?;
        let words = reader.read_u32_array(count as usize)?;
        Ok(Self { words })
    }

    /// Number of bits the stored words can hold.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len() * 32
    }

    /// Returns `true` if no bit is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|word| *word == 0)
    }

    /// The stored words.
    #[must_use]
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Returns `true` if bit `index` is set.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.words
            .get(index / 32)
            .is_some_and(|word| word & (1 << (index % 32)) != 0)
    }

    /// Number of set bits.
    #[must_use]
    pub fn count(&self) -> usize {
        self.words.iter().map(|word| word.count_ones() as usize).sum()
    }

    /// Returns `true` if any bit is set in both vectors. Vectors of different lengths are
    /// compared over their common words only.
    #[must_use]
    pub fn intersects(&self, other: &BitSet) -> bool {
        self.words
            .iter()
            .zip(other.words.iter())
            .any(|(a, b)| a & b != 0)
    }

    /// Iterates the indexes of all set bits in ascending order.
    #[must_use]
    pub fn iter(&self) -> BitSetIter<'_> {
        BitSetIter {
            set: self,
            word_idx: 0,
            bit_idx: 0,
        }
    }
}

impl std::fmt::Debug for BitSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Iterator over the set bits in a [`BitSet`].
pub struct BitSetIter<'a> {
    set: &'a BitSet,
    word_idx: usize,
    bit_idx: usize,
}

impl Iterator for BitSetIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(&word) = self.set.words.get(self.word_idx) {
            let remaining = if self.bit_idx < 32 {
                word >> self.bit_idx
            } else {
                0
            };

            if remaining != 0 {
                let bit = self.bit_idx + remaining.trailing_zeros() as usize;
                self.bit_idx = bit + 1;
                return Some(self.word_idx * 32 + bit);
            }

            self.word_idx += 1;
            self.bit_idx = 0;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::parser::Parser;

    #[test]
    fn read_words() {
        #[rustfmt::skip]
        let data = [
            0x02, 0x00, 0x00, 0x00,
            0x05, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x80,
        ];
        let mut parser = Parser::new(&data);
        let bits = BitSet::read(&mut parser).unwrap();

        assert_eq!(bits.len(), 64);
        assert_eq!(bits.count(), 3);
        assert!(bits.contains(0));
        assert!(!bits.contains(1));
        assert!(bits.contains(2));
        assert!(bits.contains(63));
        assert!(!bits.contains(64));
        assert!(!bits.contains(10_000));
        assert_eq!(bits.iter().collect::<Vec<_>>(), vec![0, 2, 63]);
    }

    #[test]
    fn read_truncated() {
        let data = [0x02, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF];
        let mut parser = Parser::new(&data);
        assert!(BitSet::read(&mut parser).is_err());
    }

    #[test]
    fn empty_vector() {
        let mut parser = Parser::new(&[0, 0, 0, 0]);
        let bits = BitSet::read(&mut parser).unwrap();
        assert!(bits.is_empty());
        assert_eq!(bits.len(), 0);
        assert_eq!(bits.iter().next(), None);
    }

    fn bits(words: &[u32]) -> BitSet {
        let mut data = (words.len() as u32).to_le_bytes().to_vec();
        for word in words {
            data.extend_from_slice(&word.to_le_bytes());
        }
        BitSet::read(&mut Parser::new(&data)).unwrap()
    }

    #[test]
    fn intersect() {
        let a = bits(&[0b1000, 0x100]);
        assert!(a.contains(3));
        assert!(a.contains(40));
        assert!(!a.intersects(&bits(&[0b1_0000])));
        assert!(a.intersects(&bits(&[0b1_0000, 0x100])));

        // Only the common words are compared
        let short = bits(&[0b1000]);
        let long = bits(&[0, 0xFFFF_FFFF]);
        assert!(!short.intersects(&long));
        assert!(short.intersects(&a));
    }

    #[test]
    fn iter_full_words() {
        let set: Vec<_> = bits(&[0xFFFF_FFFF, 0, 1]).iter().collect();
        assert_eq!(set.len(), 33);
        assert_eq!(set[31], 31);
        assert_eq!(set[32], 64);
        assert!(format!("{:?}", bits(&[6])) == "{1, 2}");
    }
}
