//! The serialized hash table used by the PDB info stream and the TPI hash adjusters.
//!
//! # Layout
//!
//! | Field      | Encoding                                       |
//! |------------|------------------------------------------------|
//! | `size`     | `u32`, number of live entries                  |
//! | `capacity` | `u32`, number of buckets                       |
//! | `present`  | sparse bit vector, one bit per occupied bucket |
//! | `deleted`  | sparse bit vector, one bit per tombstone       |
//! | entries    | `(key: u32, value: u32)` per `present` bit     |
//!
//! Entries are stored in ascending bucket order. The table is only ever read, so only the
//! occupied buckets are kept and a plain [`HashMap`] is derived from them on first lookup.

use std::{collections::HashMap, sync::OnceLock};

use crate::{file::reader::BinaryReader, utils::bitset::BitSet, Result};

/// A read-only PDB hash table
pub struct HashTable {
    size: u32,
    capacity: u32,
    present: BitSet,
    deleted: BitSet,
    /// `(bucket, key, value)` for every present bucket
    entries: Vec<(u32, u32, u32)>,
    map: OnceLock<HashMap<u32, u32>>,
}

impl HashTable {
    /// Reads and validates a hash table at the current position of `reader`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the capacity is zero, the size exceeds the maximum
    /// load, a bit vector is longer than the capacity needs, the number of `present` bits
    /// differs from the size, a bucket is out of range or a bucket is both present and deleted.
    /// Returns [`crate::Error::OutOfBounds`] if the data is truncated.
    pub fn read<R: BinaryReader + ?Sized>(reader: &mut R) -> Result<HashTable> {
        let size = reader.read_le::<u32>()?;
        let capacity = reader.read_le::<u32>()?;
        if capacity == 0 {
            return Err(malformed_error!("Corrupt hash table - capacity is zero"));
        }
        if u64::from(size) > Self::max_load(capacity) {
            return Err(malformed_error!(
                "Corrupt hash table - size {} exceeds capacity {}",
                size,
                capacity
            ));
        }

        let max_words = capacity.div_ceil(32) as usize;
        let present = BitSet::read(reader)?;
        if present.words().len() > max_words {
            return Err(malformed_error!(
                "Corrupt hash table - present bit vector has {} words for capacity {}",
                present.words().len(),
                capacity
            ));
        }
        if present.count() != size as usize {
            return Err(malformed_error!(
                "Corrupt hash table - present bit vector does not match size"
            ));
        }

        let deleted = BitSet::read(reader)?;
        if deleted.words().len() > max_words {
            return Err(malformed_error!(
                "Corrupt hash table - deleted bit vector has {} words for capacity {}",
                deleted.words().len(),
                capacity
            ));
        }
        if present.intersects(&deleted) {
            return Err(malformed_error!(
                "Corrupt hash table - present bit vector intersects deleted"
            ));
        }

        let mut entries = Vec::with_capacity(size as usize);
        for index in present.iter() {
            if index >= capacity as usize {
                return Err(malformed_error!(
                    "Corrupt hash table - bucket {} is out of range",
                    index
                ));
            }
            let key = reader.read_le::<u32>()?;
            let value = reader.read_le::<u32>()?;
            entries.push((index as u32, key, value));
        }

        Ok(HashTable {
            size,
            capacity,
            present,
            deleted,
            entries,
            map: OnceLock::new(),
        })
    }

    fn max_load(capacity: u32) -> u64 {
        u64::from(capacity) * 2 / 3 + 1
    }

    /// Number of live entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.size as usize
    }

    /// Returns `true` if the table holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of buckets
    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Returns `true` if bucket `index` holds an entry
    #[must_use]
    pub fn is_present(&self, index: usize) -> bool {
        self.present.contains(index)
    }

    /// Returns `true` if bucket `index` is a tombstone
    #[must_use]
    pub fn is_deleted(&self, index: usize) -> bool {
        self.deleted.contains(index)
    }

    /// Entries in bucket order.
    pub fn entries(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.entries.iter().map(|&(_, key, value)| (key, value))
    }

    /// Returns the key to value map, building it on first use.
    pub fn map(&self) -> &HashMap<u32, u32> {
        self.map.get_or_init(|| {
            let mut map = HashMap::with_capacity(self.len());
            for (key, value) in self.entries() {
                map.entry(key).or_insert(value);
            }
            map
        })
    }

    /// Looks up the value stored for `key`.
    #[must_use]
    pub fn get(&self, key: u32) -> Option<u32> {
        self.map().get(&key).copied()
    }
}

impl std::fmt::Debug for HashTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashTable")
            .field("size", &self.size)
            .field("capacity", &self.capacity)
            .field("present", &self.present)
            .field("deleted", &self.deleted)
            .finish_non_exhaustive()
    }
}
