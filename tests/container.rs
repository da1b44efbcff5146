//! Integration tests for opening crafted MSF containers.
//!
//! Covers the superblock, the free page map, the stream directory, the info stream with its
//! `/names` table and the DBI header, all through the public [`PdbFile`] surface.

mod common;

use common::{dbi_stream, info_stream, pdb_image, record, string_table, tpi_stream, MsfBuilder};
use pdbscope::{
    dbi::MachineType, symbols::SymbolRecordKind, BinaryReader, Error, PdbConfig, PdbFile,
};

#[test]
fn superblock_and_free_page_map() {
    let image = MsfBuilder::new(4096)
        .stream(Some(Vec::new()))
        .stream(Some(info_stream(None)))
        .min_blocks(16)
        .build();
    assert_eq!(image.len(), 16 * 4096);

    let pdb = PdbFile::from_mem(image).unwrap();
    let superblock = pdb.superblock();
    assert_eq!(superblock.block_size, 4096);
    assert_eq!(superblock.num_blocks, 16);
    assert_eq!(superblock.free_block_map_block, 1);
    assert_eq!(superblock.block_map_addr, 3);

    let map = pdb.free_page_map();
    assert_eq!(map.bit_length(), 16);
    // superblock, two maps, block list, directory, info stream
    for block in 0..6 {
        assert!(!pdb.is_block_free(block), "block {block}");
    }
    for block in 6..16 {
        assert!(pdb.is_block_free(block), "block {block}");
    }
    assert!(!pdb.is_block_free(16));
    assert_eq!(map.free_blocks(), 10);
}

#[test]
fn stream_directory() {
    let types = vec![record(0x1201, &[0x00, 0x00, 0x00, 0x00])];
    let pdb = PdbFile::from_mem(pdb_image(512, &types, &[])).unwrap();

    assert_eq!(pdb.streams().len(), 7);
    assert!(pdb.stream(0).unwrap().is_empty());
    assert!(pdb.stream(4).unwrap().is_unused());
    assert_eq!(pdb.stream(4).unwrap().len(), 0);
    assert!(matches!(pdb.stream(7), Err(Error::StreamNotFound(7))));

    let tpi = pdb.stream(2).unwrap();
    assert_eq!(tpi.len(), tpi_stream(&types).len());
    assert_eq!(tpi.blocks().len(), 1);
    assert_eq!(tpi.index(), 2);

    let mut reader = tpi.reader();
    assert_eq!(reader.read_le::<u32>().unwrap(), 20_040_203);
}

#[test]
fn streams_across_blocks() {
    let content: Vec<u8> = (0..1500_u32).map(|value| (value % 251) as u8).collect();
    let image = MsfBuilder::new(512)
        .stream(Some(Vec::new()))
        .stream(Some(content.clone()))
        .build();
    let pdb = PdbFile::from_mem(image).unwrap();

    let stream = pdb.stream(1).unwrap();
    assert_eq!(stream.blocks().len(), 3);
    let mut reader = stream.reader();
    assert_eq!(reader.read_byte_array(content.len()).unwrap(), content);
    assert!(reader.read_le::<u8>().is_err());

    let mut reader = stream.reader();
    reader.seek(510).unwrap();
    assert_eq!(reader.read_le::<u32>().unwrap(), u32::from_le_bytes([
        content[510],
        content[511],
        content[512],
        content[513],
    ]));
}

#[test]
fn info_and_names() {
    let pdb = PdbFile::from_mem(pdb_image(1024, &[], &[])).unwrap();

    let info = pdb.info().unwrap();
    assert_eq!(info.version, 20_000_404);
    assert_eq!(info.signature, 0x5f3a_1c20);
    assert_eq!(info.age, 3);
    assert_eq!(info.named_stream("/names"), Some(6));
    assert_eq!(info.named_stream("/LinkInfo"), None);
    assert_eq!(info.feature_codes(), &[20_140_508]);

    let (_, offsets) = string_table(&["main.cpp", "foo.h"]);
    let names = pdb.names().unwrap().unwrap();
    assert_eq!(&*names.get(offsets[1]).unwrap(), "foo.h");
    assert_eq!(&*names.get(offsets[0]).unwrap(), "main.cpp");
    assert_eq!(names.name_count(), 2);
    assert!(names.get(0x1000).is_err());
}

#[test]
fn dbi_header() {
    let pdb = PdbFile::from_mem(pdb_image(512, &[], &[])).unwrap();
    let dbi = pdb.dbi().unwrap();
    assert_eq!(dbi.machine(), Some(MachineType::Amd64));
    assert_eq!(dbi.symbol_record_stream_index(), 5);
    assert!(dbi.modules().unwrap().is_empty());
    assert_eq!(pdb.pointer_size(), 8);

    let x86 = MsfBuilder::new(512)
        .stream(Some(Vec::new()))
        .stream(Some(info_stream(None)))
        .stream(Some(tpi_stream(&[])))
        .stream(Some(dbi_stream(5, 0x014c)))
        .stream(None)
        .stream(Some(Vec::new()))
        .build();
    let pdb = PdbFile::from_mem(x86).unwrap();
    assert_eq!(pdb.pointer_size(), 4);

    let configured = PdbFile::from_mem_with_config(
        pdb_image(512, &[], &[]),
        PdbConfig {
            pointer_size: Some(4),
            ..PdbConfig::default()
        },
    )
    .unwrap();
    assert_eq!(configured.pointer_size(), 4);
}

#[test]
fn global_symbols() {
    let mut body = 0x74_u32.to_le_bytes().to_vec();
    body.extend_from_slice(&0x40_u32.to_le_bytes());
    body.extend_from_slice(&2_u16.to_le_bytes());
    body.extend_from_slice(b"g_count\0");
    let symbols = vec![record(SymbolRecordKind::S_GDATA32 as u16, &body)];

    let pdb = PdbFile::from_mem(pdb_image(512, &[], &symbols)).unwrap();
    let stream = pdb.symbols().unwrap();
    assert_eq!(stream.len(), 1);
    let data = stream.symbols(SymbolRecordKind::S_GDATA32).unwrap();
    assert_eq!(data.len(), 1);
    assert!(stream
        .symbols(SymbolRecordKind::S_PUB32)
        .unwrap()
        .is_empty());
}

#[test]
fn rejects_corrupt_containers() {
    assert!(matches!(PdbFile::from_mem(Vec::new()), Err(Error::Empty)));

    let mut image = pdb_image(512, &[], &[]);
    image[0] = b'm';
    assert!(matches!(PdbFile::from_mem(image), Err(Error::Malformed { .. })));

    let mut image = pdb_image(512, &[], &[]);
    image[32..36].copy_from_slice(&768_u32.to_le_bytes());
    assert!(matches!(PdbFile::from_mem(image), Err(Error::Malformed { .. })));

    let mut image = pdb_image(512, &[], &[]);
    image.truncate(image.len() - 100);
    assert!(PdbFile::from_mem(image).is_err());
}
