//! Benchmarks for CodeView record decoding.
//!
//! Tests decoding performance for the records that dominate real type streams:
//! - Class records with unique names
//! - Large field lists with padding
//! - Encoded integers of every width
//! - Global data symbols

extern crate pdbscope;

use criterion::{criterion_group, criterion_main, Criterion};
use pdbscope::{
    records::TypeRecord, symbols::SymbolRecord, BinaryReader, Parser, UnknownRecordPolicy,
};
use std::hint::black_box;

/// Benchmark decoding a structure with a unique name.
/// struct _LIST_ENTRY { ... } (size 16)
fn bench_class_record(c: &mut Criterion) {
    #[rustfmt::skip]
    let body = [
        0x02, 0x00, 0x00, 0x02,
        0x01, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x10, 0x00,
        b'_', b'L', b'I', b'S', b'T', b'_', b'E', b'N', b'T', b'R', b'Y', 0x00,
        b'.', b'?', b'A', b'U', b'_', b'L', b'I', b'S', b'T', b'_', b'E', b'N', b'T', b'R',
        b'Y', b'@', b'@', 0x00,
    ];

    c.bench_function("record_class", |b| {
        b.iter(|| {
            let mut parser = Parser::new(black_box(&body));
            let record =
                TypeRecord::decode(&mut parser, 0x1505, body.len(), UnknownRecordPolicy::Fail)
                    .unwrap();
            black_box(record)
        });
    });
}

/// Benchmark decoding a field list of 64 `int` members named `m00` to `m63`.
fn bench_field_list(c: &mut Criterion) {
    let mut body = Vec::new();
    for index in 0..64_u16 {
        body.extend_from_slice(&0x150d_u16.to_le_bytes());
        body.extend_from_slice(&0x0003_u16.to_le_bytes());
        body.extend_from_slice(&0x74_u32.to_le_bytes());
        body.extend_from_slice(&(index * 4).to_le_bytes());
        body.extend_from_slice(format!("m{index:02}").as_bytes());
        body.push(0);
        body.extend_from_slice(&[0xf2, 0xf1]);
    }

    c.bench_function("record_field_list_64", |b| {
        b.iter(|| {
            let mut parser = Parser::new(black_box(&body));
            let record =
                TypeRecord::decode(&mut parser, 0x1203, body.len(), UnknownRecordPolicy::Fail)
                    .unwrap();
            black_box(record)
        });
    });
}

/// Benchmark reading encoded integers: immediate, LF_CHAR, LF_LONG, LF_UQUADWORD.
fn bench_numeric(c: &mut Criterion) {
    #[rustfmt::skip]
    let data = [
        0x10, 0x00,
        0x00, 0x80, 0xff,
        0x03, 0x80, 0x00, 0x00, 0x00, 0x80,
        0x0a, 0x80, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08,
    ];

    c.bench_function("numeric_leaves", |b| {
        b.iter(|| {
            let mut parser = Parser::new(black_box(&data));
            let mut sum = 0_u64;
            while parser.has_more_data() {
                sum = sum.wrapping_add(parser.read_numeric().unwrap().as_u64());
            }
            black_box(sum)
        });
    });
}

/// Benchmark decoding an S_GDATA32 symbol.
fn bench_data_symbol(c: &mut Criterion) {
    #[rustfmt::skip]
    let body = [
        0x74, 0x00, 0x00, 0x00,
        0x40, 0x01, 0x00, 0x00,
        0x02, 0x00,
        b'g', b'_', b'c', b'o', b'u', b'n', b't', 0x00,
    ];

    c.bench_function("symbol_gdata32", |b| {
        b.iter(|| {
            let mut parser = Parser::new(black_box(&body));
            let symbol = SymbolRecord::decode(&mut parser, 0x110d, body.len()).unwrap();
            black_box(symbol)
        });
    });
}

criterion_group!(
    benches,
    bench_class_record,
    bench_field_list,
    bench_numeric,
    bench_data_symbol
);
criterion_main!(benches);
