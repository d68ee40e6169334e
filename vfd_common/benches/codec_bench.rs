//! Register codec benchmarks.
//!
//! Decoding runs once per poll cycle; encoding once per command write.

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use vfd_common::drive::codec::{decode_status, encode_control};
use vfd_common::drive::consts::STATUS_BLOCK_LEN;
use vfd_common::drive::types::ControlFlags;

fn bench_decode_status(c: &mut Criterion) {
    let mut block = [0u16; STATUS_BLOCK_LEN as usize];
    for (i, word) in block.iter_mut().enumerate() {
        *word = (i as u16) * 137;
    }
    block[1] = 0b0110_0011;

    c.bench_function("decode_status", |b| {
        b.iter(|| decode_status(black_box(&block), black_box(3), black_box(0)))
    });
}

fn bench_encode_control(c: &mut Criterion) {
    let flags = ControlFlags::start();
    c.bench_function("encode_control", |b| b.iter(|| encode_control(black_box(&flags))));
}

criterion_group!(benches, bench_decode_status, bench_encode_control);
criterion_main!(benches);
