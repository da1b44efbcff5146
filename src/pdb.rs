//! The PDB file: an MSF container with lazily parsed well-known streams.

use std::{path::Path, sync::Arc, sync::OnceLock};

use crate::{
    config::PdbConfig,
    dbi::DbiStream,
    file::{Backend, Memory, Physical},
    info::{PdbInfoStream, PdbStringTable},
    msf::{
        directory, stream::PdbStream, superblock::Superblock, FreePageMap, STREAM_DBI,
        STREAM_IPI, STREAM_PDB_INFO, STREAM_TPI,
    },
    symbols::SymbolStream,
    tpi::TpiStream,
    Error::{Empty, StreamNotFound},
    Result,
};

/// Pointer size used when neither the configuration nor the DBI machine type provide one
const DEFAULT_POINTER_SIZE: u32 = 8;

/// An opened PDB file.
///
/// Opening validates the superblock, reads the free page map and decodes the stream
/// directory. The well-known streams are parsed on first access and kept for the lifetime of
/// the file, so every accessor returns the same instance on repeated calls.
///
/// # Examples
///
/// ```rust,no_run
/// use pdbscope::PdbFile;
/// use std::path::Path;
///
/// let pdb = PdbFile::from_file(Path::new("ntdll.pdb"))?;
/// println!("{} streams, block size {}", pdb.streams().len(), pdb.superblock().block_size);
///
/// let tpi = pdb.tpi()?;
/// println!("{} type records", tpi.record_count());
/// # Ok::<(), pdbscope::Error>(())
/// ```
///
/// # Thread Safety
///
/// [`PdbFile`] is `Send + Sync`. Lazily parsed streams are initialised at most once even when
/// several threads request them concurrently.
pub struct PdbFile {
    data: Arc<dyn Backend>,
    config: PdbConfig,
    superblock: Superblock,
    free_page_map: FreePageMap,
    streams: Vec<PdbStream>,
    info: OnceLock<PdbInfoStream>,
    names: OnceLock<Option<PdbStringTable>>,
    dbi: OnceLock<DbiStream>,
    tpi: OnceLock<TpiStream>,
    ipi: OnceLock<Option<TpiStream>>,
    symbols: OnceLock<SymbolStream>,
}

impl PdbFile {
    /// Opens a PDB file from disk.
    ///
    /// The file is memory-mapped and validated with [`PdbConfig::default`].
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened, [`crate::Error::Empty`]
    /// for an empty file and [`crate::Error::Malformed`] for a corrupt container.
    pub fn from_file(path: &Path) -> Result<PdbFile> {
        Self::from_file_with_config(path, PdbConfig::default())
    }

    /// Opens a PDB file from disk with an explicit configuration.
    ///
    /// # Errors
    /// See [`PdbFile::from_file`].
    pub fn from_file_with_config(path: &Path, config: PdbConfig) -> Result<PdbFile> {
        let input = Physical::new(path)?;

        Self::load(input, config)
    }

    /// Parses a PDB file held in memory.
    ///
    /// # Errors
    /// Returns [`crate::Error::Empty`] for an empty buffer and [`crate::Error::Malformed`] for
    /// a corrupt container.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use pdbscope::PdbFile;
    /// use std::fs;
    ///
    /// let data = fs::read("ntdll.pdb")?;
    /// let pdb = PdbFile::from_mem(data)?;
    /// println!("{} free blocks", pdb.free_page_map().free_blocks());
    /// # Ok::<(), pdbscope::Error>(())
    /// ```
    pub fn from_mem(data: Vec<u8>) -> Result<PdbFile> {
        Self::from_mem_with_config(data, PdbConfig::default())
    }

    /// Parses a PDB file held in memory with an explicit configuration.
    ///
    /// # Errors
    /// See [`PdbFile::from_mem`].
    pub fn from_mem_with_config(data: Vec<u8>, config: PdbConfig) -> Result<PdbFile> {
        let input = Memory::new(data);

        Self::load(input, config)
    }

    #[tracing::instrument(level = "trace", skip_all, fields(length = data.len()))]
    fn load<T: Backend + 'static>(data: T, config: PdbConfig) -> Result<PdbFile> {
        if data.is_empty() {
            return Err(Empty);
        }

        let data: Arc<dyn Backend> = Arc::new(data);
        let superblock = Superblock::read(data.data())?;

        if config.verify_file_length && data.len() % superblock.block_size as usize != 0 {
            return Err(malformed_error!(
                "Corrupt MSF - file length {} is not a multiple of the block size {}",
                data.len(),
                superblock.block_size
            ));
        }

        let free_page_map = FreePageMap::read(data.data(), &superblock)?;
        let streams = directory::read_streams(&data, &superblock)?;

        tracing::debug!(
            block_size = superblock.block_size,
            blocks = superblock.num_blocks,
            streams = streams.len(),
            "opened MSF container"
        );

        Ok(PdbFile {
            data,
            config,
            superblock,
            free_page_map,
            streams,
            info: OnceLock::new(),
            names: OnceLock::new(),
            dbi: OnceLock::new(),
            tpi: OnceLock::new(),
            ipi: OnceLock::new(),
            symbols: OnceLock::new(),
        })
    }

    /// The validated superblock
    #[must_use]
    pub fn superblock(&self) -> &Superblock {
        &self.superblock
    }

    /// The free page map
    #[must_use]
    pub fn free_page_map(&self) -> &FreePageMap {
        &self.free_page_map
    }

    /// Returns `true` if the free page map marks `block` as free
    #[must_use]
    pub fn is_block_free(&self, block: u32) -> bool {
        self.free_page_map.is_block_free(block)
    }

    /// Every stream of the directory, in index order
    #[must_use]
    pub fn streams(&self) -> &[PdbStream] {
        &self.streams
    }

    /// The configuration the file was opened with
    #[must_use]
    pub fn config(&self) -> &PdbConfig {
        &self.config
    }

    /// Size of the file in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the file holds no data
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Stream `index` of the directory.
    ///
    /// # Errors
    /// Returns [`crate::Error::StreamNotFound`] if the directory has no such stream.
    pub fn stream(&self, index: u32) -> Result<&PdbStream> {
        self.streams
            .get(index as usize)
            .ok_or(StreamNotFound(index))
    }

    /// The PDB info stream.
    ///
    /// # Errors
    /// Returns [`crate::Error::StreamNotFound`] if stream 1 is missing and
    /// [`crate::Error::Malformed`] if it is corrupt.
    pub fn info(&self) -> Result<&PdbInfoStream> {
        if let Some(info) = self.info.get() {
            return Ok(info);
        }

        let info = PdbInfoStream::read(&mut self.stream(STREAM_PDB_INFO)?.reader())?;
        Ok(self.info.get_or_init(|| info))
    }

    /// The global string table of the `/names` stream, `None` if the file has none.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the info stream or the table is corrupt.
    pub fn names(&self) -> Result<Option<&PdbStringTable>> {
        if let Some(names) = self.names.get() {
            return Ok(names.as_ref());
        }

        let names = match self.info()?.named_stream("/names") {
            Some(index) => Some(PdbStringTable::read(&mut self.stream(index)?.reader())?),
            None => None,
        };
        Ok(self.names.get_or_init(|| names).as_ref())
    }

    /// The debug information stream.
    ///
    /// # Errors
    /// Returns [`crate::Error::StreamNotFound`] if stream 3 is missing and
    /// [`crate::Error::Malformed`] if it is corrupt.
    pub fn dbi(&self) -> Result<&DbiStream> {
        if let Some(dbi) = self.dbi.get() {
            return Ok(dbi);
        }

        let dbi = DbiStream::new(self.stream(STREAM_DBI)?.clone(), &self.streams)?;
        Ok(self.dbi.get_or_init(|| dbi))
    }

    /// The type record stream.
    ///
    /// # Errors
    /// Returns [`crate::Error::StreamNotFound`] if stream 2 is missing and
    /// [`crate::Error::Malformed`] if it is corrupt.
    pub fn tpi(&self) -> Result<&TpiStream> {
        if let Some(tpi) = self.tpi.get() {
            return Ok(tpi);
        }

        let tpi = TpiStream::new(
            self.stream(STREAM_TPI)?.clone(),
            &self.streams,
            self.config.unknown_records,
        )?;
        Ok(self.tpi.get_or_init(|| tpi))
    }

    /// The id record stream, `None` if the file has no or an empty stream 4.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the stream is present but corrupt.
    pub fn ipi(&self) -> Result<Option<&TpiStream>> {
        if let Some(ipi) = self.ipi.get() {
            return Ok(ipi.as_ref());
        }

        let ipi = match self.streams.get(STREAM_IPI as usize) {
            Some(stream) if !stream.is_empty() => Some(TpiStream::new(
                stream.clone(),
                &self.streams,
                self.config.unknown_records,
            )?),
            _ => None,
        };
        Ok(self.ipi.get_or_init(|| ipi).as_ref())
    }

    /// The global symbol record stream named by the DBI header.
    ///
    /// # Errors
    /// Returns [`crate::Error::StreamNotFound`] if the DBI references a missing stream and
    /// [`crate::Error::Malformed`] if the DBI or the symbol stream is corrupt.
    pub fn symbols(&self) -> Result<&SymbolStream> {
        if let Some(symbols) = self.symbols.get() {
            return Ok(symbols);
        }

        let index = u32::from(self.dbi()?.symbol_record_stream_index());
        let symbols = SymbolStream::new(self.stream(index)?.clone())?;
        Ok(self.symbols.get_or_init(|| symbols))
    }

    /// Size of synthesised pointer types.
    ///
    /// Taken from [`PdbConfig::pointer_size`] when set, otherwise from the DBI machine type.
    /// Files without a usable DBI stream fall back to 8.
    #[must_use]
    pub fn pointer_size(&self) -> u32 {
        if let Some(size) = self.config.pointer_size {
            return size;
        }

        match self.dbi() {
            Ok(dbi) => dbi
                .machine()
                .map_or(DEFAULT_POINTER_SIZE, |machine| machine.pointer_size()),
            Err(_) => DEFAULT_POINTER_SIZE,
        }
    }
}

impl std::fmt::Debug for PdbFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdbFile")
            .field("length", &self.data.len())
            .field("config", &self.config)
            .field("superblock", &self.superblock)
            .field("streams", &self.streams.len())
            .finish_non_exhaustive()
    }
}
