//! Builders for crafted streams and MSF images.

use std::sync::Arc;

use crate::{
    file::{Backend, Memory},
    module::PdbModule,
    msf::{stream::PdbStream, superblock::MAGIC},
    pdb::PdbFile,
    tpi::header::TPI_VERSION_V80,
};

/// Block size used by [`scattered_streams`]
pub const SMALL_BLOCK_SIZE: usize = 64;

/// Prefixes `body` with its record length and kind
pub fn record(kind: u16, body: &[u8]) -> Vec<u8> {
    let mut data = ((body.len() + 2) as u16).to_le_bytes().to_vec();
    data.extend_from_slice(&kind.to_le_bytes());
    data.extend_from_slice(body);
    data
}

/// Lays every stream out in reverse block order so reads have to follow the block map
pub fn scattered_streams(contents: &[Vec<u8>]) -> Vec<PdbStream> {
    let mut file = Vec::new();
    let mut maps = Vec::new();
    for content in contents {
        let chunks: Vec<&[u8]> = content.chunks(SMALL_BLOCK_SIZE).collect();
        let first = file.len() / SMALL_BLOCK_SIZE;
        let mut blocks = Vec::new();
        for (position, chunk) in chunks.iter().rev().enumerate() {
            let mut block = chunk.to_vec();
            block.resize(SMALL_BLOCK_SIZE, 0);
            file.extend_from_slice(&block);
            blocks.push((first + position) as u32);
        }
        blocks.reverse();
        maps.push((content.len(), blocks));
    }

    let backend: Arc<dyn Backend> = Arc::new(Memory::new(file));
    maps.into_iter()
        .enumerate()
        .map(|(index, (size, blocks))| {
            PdbStream::new(
                index as u32,
                size as u32,
                blocks,
                SMALL_BLOCK_SIZE as u32,
                backend.clone(),
            )
        })
        .collect()
}

/// A TPI stream without hash stream holding `records` in order
pub fn tpi_stream(records: &[Vec<u8>]) -> Vec<u8> {
    let bytes: Vec<u8> = records.concat();
    let mut data = Vec::new();
    for value in [
        TPI_VERSION_V80,
        56,
        0x1000,
        0x1000 + records.len() as u32,
        bytes.len() as u32,
    ] {
        data.extend_from_slice(&value.to_le_bytes());
    }
    data.extend_from_slice(&0xFFFF_u16.to_le_bytes());
    data.extend_from_slice(&0xFFFF_u16.to_le_bytes());
    for value in [4_u32, 0x3FFFF] {
        data.extend_from_slice(&value.to_le_bytes());
    }
    data.extend_from_slice(&[0; 24]);
    data.extend_from_slice(&bytes);
    data
}

/// A DBI stream with empty substreams pointing at `symbol_records`
pub fn dbi_stream(symbol_records: u16, machine: u16) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&(-1_i32).to_le_bytes());
    data.extend_from_slice(&19_990_903_u32.to_le_bytes());
    data.extend_from_slice(&1_u32.to_le_bytes());
    for value in [0xFFFF_u16, 0x8E00, 0xFFFF, 0, symbol_records, 0] {
        data.extend_from_slice(&value.to_le_bytes());
    }
    data.extend_from_slice(&[0; 32]);
    data.extend_from_slice(&0_u16.to_le_bytes());
    data.extend_from_slice(&machine.to_le_bytes());
    data.extend_from_slice(&[0; 4]);
    data
}

/// Writes a complete MSF image.
///
/// Block 0 holds the superblock, blocks 1 and 2 the free page maps, block 3 the list of
/// directory blocks. The directory follows, then every stream in order. One trailing block is
/// left free.
pub struct MsfBuilder {
    block_size: usize,
    streams: Vec<Option<Vec<u8>>>,
}

impl MsfBuilder {
    pub fn new(block_size: usize) -> MsfBuilder {
        MsfBuilder {
            block_size,
            streams: Vec::new(),
        }
    }

    /// Appends a stream, `None` for an unused directory slot
    pub fn stream(mut self, content: Option<Vec<u8>>) -> MsfBuilder {
        self.streams.push(content);
        self
    }

    pub fn build(self) -> Vec<u8> {
        let block_size = self.block_size;
        let block_counts: Vec<usize> = self
            .streams
            .iter()
            .map(|stream| stream.as_ref().map_or(0, |data| data.len().div_ceil(block_size)))
            .collect();

        let directory_bytes = 4 + 4 * self.streams.len() + 4 * block_counts.iter().sum::<usize>();
        let directory_blocks = directory_bytes.div_ceil(block_size);
        let first_stream_block = 4 + directory_blocks;
        let used_blocks = first_stream_block + block_counts.iter().sum::<usize>();
        let num_blocks = used_blocks + 1;

        let mut file = vec![0_u8; num_blocks * block_size];

        let mut superblock = MAGIC.to_vec();
        for value in [
            block_size,
            1,
            num_blocks,
            directory_bytes,
            0,
            3,
        ] {
            superblock.extend_from_slice(&(value as u32).to_le_bytes());
        }
        file[..superblock.len()].copy_from_slice(&superblock);

        let free = used_blocks;
        file[block_size + free / 8] |= 1 << (free % 8);

        for block in 0..directory_blocks {
            let offset = 3 * block_size + block * 4;
            file[offset..offset + 4].copy_from_slice(&((4 + block) as u32).to_le_bytes());
        }

        let mut directory = Vec::with_capacity(directory_bytes);
        directory.extend_from_slice(&(self.streams.len() as u32).to_le_bytes());
        for stream in &self.streams {
            let size = stream.as_ref().map_or(u32::MAX, |data| data.len() as u32);
            directory.extend_from_slice(&size.to_le_bytes());
        }

        let mut next = first_stream_block;
        for stream in self.streams.iter().flatten() {
            for chunk in stream.chunks(block_size) {
                directory.extend_from_slice(&(next as u32).to_le_bytes());
                let offset = next * block_size;
                file[offset..offset + chunk.len()].copy_from_slice(chunk);
                next += 1;
            }
        }

        let offset = 4 * block_size;
        file[offset..offset + directory.len()].copy_from_slice(&directory);
        file
    }
}

/// A module over `types` and a global symbol stream holding `symbols`.
///
/// The image has an unused info stream, an x64 DBI stream and the symbols in stream 5.
pub fn module_with_symbols(types: &[Vec<u8>], symbols: &[Vec<u8>]) -> PdbModule {
    let image = MsfBuilder::new(512)
        .stream(Some(Vec::new()))
        .stream(None)
        .stream(Some(tpi_stream(types)))
        .stream(Some(dbi_stream(5, 0x8664)))
        .stream(None)
        .stream(Some(symbols.concat()))
        .build();
    PdbModule::from_pdb(PdbFile::from_mem(image).unwrap()).unwrap()
}

/// A module over `types` with an empty global symbol stream
pub fn module_with_types(types: &[Vec<u8>]) -> PdbModule {
    module_with_symbols(types, &[])
}
