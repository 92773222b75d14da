//! Micro-benchmark for the module decoder, run against a small synthetic
//! module with one of each common section kind.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use wasmdecode::io::SliceSource;
use wasmdecode::module::decode_module;

fn sample_module() -> Vec<u8> {
    let mut bytes = vec![0x00, 0x61, 0x73, 0x6D, 0x01, 0x00, 0x00, 0x00];
    // type section: (i32) -> (i32)
    bytes.extend([0x01, 0x06, 0x01, 0x60, 0x01, 0x7F, 0x01, 0x7F]);
    // function section: one function of type 0
    bytes.extend([0x03, 0x02, 0x01, 0x00]);
    // memory section: limits min=1, no max
    bytes.extend([0x05, 0x03, 0x01, 0x00, 0x01]);
    // export section: export function 0 as "main"
    bytes.extend([0x07, 0x08, 0x01, 0x04, b'm', b'a', b'i', b'n', 0x00, 0x00]);
    // code section: local.get 0
    bytes.extend([0x0A, 0x06, 0x01, 0x04, 0x00, 0x20, 0x00, 0x0B]);
    bytes
}

fn decode_benchmark(c: &mut Criterion) {
    let bytes = sample_module();
    c.bench_function("decode_module", |b| {
        b.iter(|| {
            let mut src = SliceSource::new(black_box(&bytes));
            decode_module(&mut src).unwrap()
        })
    });
}

criterion_group!(benches, decode_benchmark);
criterion_main!(benches);
