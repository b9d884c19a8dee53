use std::hint::black_box;
use std::io::Cursor;

use criterion::{Criterion, criterion_group, criterion_main};
use framegrab_protocol::Request;

fn request_encoding(c: &mut Criterion) {
    c.bench_function("write_request", |b| {
        let mut out = Vec::with_capacity(16);
        b.iter(|| {
            out.clear();
            black_box(Request::CaptureFrame).write_to(&mut out).unwrap();
            black_box(&out);
        })
    });

    c.bench_function("read_request", |b| {
        b.iter(|| {
            let mut cursor = Cursor::new(black_box(b"capture_frame\n".as_slice()));
            black_box(Request::from_reader(&mut cursor).unwrap())
        })
    });
}

criterion_group!(benches, request_encoding);
criterion_main!(benches);
