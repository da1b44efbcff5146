//! Loader configuration
//!
//! This module provides the options that control how strictly a PDB file is validated while
//! it is opened and how the record decoders react to data they do not understand.

/// How the type stream decoders treat record kinds without a decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownRecordPolicy {
    /// Decoding an unknown kind raises [`crate::Error::UnknownTypeRecord`]
    #[default]
    Fail,
    /// Unknown kinds decode to [`crate::TypeRecord::Unknown`], carrying the raw body
    Preserve,
}

/// Configuration for opening a PDB file
///
/// The container structure (superblock, stream directory, block ranges) is always validated.
/// These options only cover checks that real-world producers are known to violate, plus
/// parameters the symbol layer cannot always derive on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PdbConfig {
    /// Reject files whose length is not a multiple of the block size
    pub verify_file_length: bool,

    /// Behaviour for type records without a decoder
    pub unknown_records: UnknownRecordPolicy,

    /// Size of pointer symbols created by the symbol layer
    ///
    /// `None` derives it from the machine type in the DBI stream: 8 for 64-bit targets,
    /// 4 otherwise, and 8 if the file has no DBI stream.
    pub pointer_size: Option<u32>,
}

impl Default for PdbConfig {
    fn default() -> Self {
        Self {
            verify_file_length: true,
            unknown_records: UnknownRecordPolicy::Fail,
            pointer_size: None,
        }
    }
}

impl PdbConfig {
    /// Creates a strict configuration, identical to [`PdbConfig::default`]
    ///
    /// Every check is enabled and unknown type records are fatal.
    #[must_use]
    pub fn strict() -> Self {
        Self::default()
    }

    /// Creates a permissive configuration for files from unusual producers
    ///
    /// Truncated trailing blocks are accepted and unknown type records are preserved as raw
    /// bytes instead of failing the lookup.
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            verify_file_length: false,
            unknown_records: UnknownRecordPolicy::Preserve,
            pointer_size: None,
        }
    }

    /// Returns a copy with a fixed pointer size
    #[must_use]
    pub fn with_pointer_size(mut self, size: u32) -> Self {
        self.pointer_size = Some(size);
        self
    }
}
