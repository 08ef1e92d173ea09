//! Interning benchmarks: hash-keyed vs. linear-scan tables.
//!
//! Run with: `cargo bench --bench intern`
//!
//! Measures per-call latency of `intern` for a skewed request stream over a
//! small set of distinct shared states (the regime interning is built for),
//! and the cost of building contexts through a factory.

use std::hint::black_box;
use std::time::Instant;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use internkit::ds::{InternTable, ScanInternTable};
use internkit::factory::ContextFactory;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const OPS: u64 = 100_000;
const SEED: u64 = 42;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Style {
    font: String,
    size_pt: u16,
    bold: bool,
}

/// `OPS` requests over `distinct` styles; 90% of requests hit the first tenth.
fn request_stream(distinct: usize) -> Vec<Style> {
    let mut rng = StdRng::seed_from_u64(SEED);
    let hot = (distinct / 10).max(1);
    (0..OPS)
        .map(|_| {
            let idx = if rng.gen_bool(0.9) {
                rng.gen_range(0..hot)
            } else {
                rng.gen_range(0..distinct)
            };
            Style {
                font: format!("font-{}", idx % 7),
                size_pt: 8 + idx as u16,
                bold: idx % 2 == 0,
            }
        })
        .collect()
}

fn bench_intern(c: &mut Criterion) {
    let mut group = c.benchmark_group("intern_ns");
    group.throughput(Throughput::Elements(OPS));

    for distinct in [4usize, 32, 256] {
        let stream = request_stream(distinct);

        group.bench_with_input(BenchmarkId::new("hash", distinct), &stream, |b, stream| {
            b.iter_custom(|iters| {
                let start = Instant::now();
                for _ in 0..iters {
                    let mut table = InternTable::new();
                    for style in stream {
                        black_box(table.intern_ref(style));
                    }
                    black_box(table.size());
                }
                start.elapsed()
            })
        });

        group.bench_with_input(BenchmarkId::new("scan", distinct), &stream, |b, stream| {
            b.iter_custom(|iters| {
                let start = Instant::now();
                for _ in 0..iters {
                    let mut table = ScanInternTable::new();
                    for style in stream {
                        black_box(table.intern(style.clone()));
                    }
                    black_box(table.size());
                }
                start.elapsed()
            })
        });
    }

    group.finish();
}

fn bench_make_context(c: &mut Criterion) {
    let mut group = c.benchmark_group("make_context_ns");
    group.throughput(Throughput::Elements(OPS));
    let stream = request_stream(32);

    group.bench_function("hash_factory", |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();
            for _ in 0..iters {
                let mut factory = ContextFactory::new();
                for (i, style) in stream.iter().enumerate() {
                    black_box(factory.make_context(i, style.clone()));
                }
                black_box(factory.created_count());
            }
            start.elapsed()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_intern, bench_make_context);
criterion_main!(benches);
