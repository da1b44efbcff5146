//! Shared builders for crafted PDB images.
#![allow(dead_code)]

/// `Microsoft C/C++ MSF 7.00\r\n\x1aDS\0\0\0`
pub const MAGIC: &[u8; 32] = b"Microsoft C/C++ MSF 7.00\r\n\x1aDS\0\0\0";

/// Prefixes `body` with its record length and kind
pub fn record(kind: u16, body: &[u8]) -> Vec<u8> {
    let mut data = ((body.len() + 2) as u16).to_le_bytes().to_vec();
    data.extend_from_slice(&kind.to_le_bytes());
    data.extend_from_slice(body);
    data
}

/// A version 7.0 info stream whose named stream map holds `/names` -> `names_stream`
pub fn info_stream(names_stream: Option<u32>) -> Vec<u8> {
    let mut data = Vec::new();
    for value in [20_000_404_u32, 0x5f3a_1c20, 3] {
        data.extend_from_slice(&value.to_le_bytes());
    }
    data.extend_from_slice(&[
        0x10, 0x32, 0x54, 0x76, 0x98, 0xba, 0xdc, 0xfe, 0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd,
        0xef,
    ]);

    match names_stream {
        Some(index) => {
            let names = b"/names\0";
            data.extend_from_slice(&(names.len() as u32).to_le_bytes());
            data.extend_from_slice(names);
            // size 1, capacity 1, present {0}, deleted {}, entry (0, index)
            for value in [1_u32, 1, 1, 1, 0, 0, index] {
                data.extend_from_slice(&value.to_le_bytes());
            }
        }
        None => {
            // no names, size 0, capacity 1, both bit vectors empty
            for value in [0_u32, 0, 1, 0, 0] {
                data.extend_from_slice(&value.to_le_bytes());
            }
        }
    }

    data.extend_from_slice(&20_140_508_u32.to_le_bytes());
    data
}

/// A `/names` string table holding `strings`, returning the table and every string offset
pub fn string_table(strings: &[&str]) -> (Vec<u8>, Vec<u32>) {
    let mut buffer = vec![0_u8];
    let mut offsets = Vec::new();
    for string in strings {
        offsets.push(buffer.len() as u32);
        buffer.extend_from_slice(string.as_bytes());
        buffer.push(0);
    }

    let mut data = Vec::new();
    for value in [0xEFFE_EFFE_u32, 1, buffer.len() as u32] {
        data.extend_from_slice(&value.to_le_bytes());
    }
    data.extend_from_slice(&buffer);
    data.extend_from_slice(&(offsets.len() as u32).to_le_bytes());
    for offset in &offsets {
        data.extend_from_slice(&offset.to_le_bytes());
    }
    data.extend_from_slice(&(strings.len() as u32).to_le_bytes());
    (data, offsets)
}

/// A TPI stream without hash stream holding `records` in order
pub fn tpi_stream(records: &[Vec<u8>]) -> Vec<u8> {
    let bytes: Vec<u8> = records.concat();
    let mut data = Vec::new();
    for value in [
        20_040_203_u32,
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
/// directory blocks. The directory follows, then every stream in order. Blocks past the last
/// stream are marked free.
pub struct MsfBuilder {
    block_size: usize,
    min_blocks: usize,
    streams: Vec<Option<Vec<u8>>>,
}

impl MsfBuilder {
    pub fn new(block_size: usize) -> MsfBuilder {
        MsfBuilder {
            block_size,
            min_blocks: 0,
            streams: Vec::new(),
        }
    }

    /// Pads the image to at least `blocks` blocks
    pub fn min_blocks(mut self, blocks: usize) -> MsfBuilder {
        self.min_blocks = blocks;
        self
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
        let num_blocks = (used_blocks + 1).max(self.min_blocks);

        let mut file = vec![0_u8; num_blocks * block_size];

        let mut superblock = MAGIC.to_vec();
        for value in [block_size, 1, num_blocks, directory_bytes, 0, 3] {
            superblock.extend_from_slice(&(value as u32).to_le_bytes());
        }
        file[..superblock.len()].copy_from_slice(&superblock);

        for free in used_blocks..num_blocks {
            file[block_size + free / 8] |= 1 << (free % 8);
        }

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

/// A complete image: info stream with `/names`, `types`, an x64 DBI and `symbols` in stream 5
pub fn pdb_image(block_size: usize, types: &[Vec<u8>], symbols: &[Vec<u8>]) -> Vec<u8> {
    let (names, _) = string_table(&["main.cpp", "foo.h"]);
    MsfBuilder::new(block_size)
        .stream(Some(Vec::new()))
        .stream(Some(info_stream(Some(6))))
        .stream(Some(tpi_stream(types)))
        .stream(Some(dbi_stream(5, 0x8664)))
        .stream(None)
        .stream(Some(symbols.concat()))
        .stream(Some(names))
        .build()
}
