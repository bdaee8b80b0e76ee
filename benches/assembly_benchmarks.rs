#![allow(missing_docs)]
//! Benchmarks for record assembly, validation and extraction.
//!
//! Input is generated in memory so the suite needs no fixtures.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use marcseq::batch::extract_batch;
use marcseq::{extract, KeyPolicy, SchemaRegistry, SchemaVersion, SeqReader, Validator};
use std::fmt::Write;
use std::io::Cursor;
use std::sync::Arc;

/// Generate `n` Aleph sequential records of eight lines each.
fn generate(n: usize) -> Vec<u8> {
    let mut out = String::new();
    for i in 1..=n {
        let _ = writeln!(out, "{i:09} FMT   L BK");
        let _ = writeln!(out, "{i:09} LDR   L -----nam^a22-----^a^4500");
        let _ = writeln!(out, "{i:09} 001   L {i:09}");
        let _ = writeln!(out, "{i:09} 008   L 850506s1985^^^^nyu^^^^^^^^^^^000^0^eng^^");
        let _ = writeln!(out, "{i:09} 1001  L $$aAuthor {i},$$d1900-1980.");
        let _ = writeln!(out, "{i:09} 24510 L $$aTitle number {i} /$$cby Author {i}.");
        let _ = writeln!(out, "{i:09} 650 0 L $$aSubject$$xHistory$$vSources.");
        let _ = writeln!(out, "{i:09} 650 7 L $$aThema$$2gnd");
    }
    out.into_bytes()
}

fn benchmark_assembly(c: &mut Criterion) {
    let registry = Arc::new(SchemaRegistry::marc21());
    let data = generate(1_000);

    let mut group = c.benchmark_group("assembly");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("read_1k_records", |b| {
        b.iter(|| {
            let reader = SeqReader::new(Cursor::new(black_box(&data)), Arc::clone(&registry));
            reader.count()
        });
    });
    group.finish();
}

fn benchmark_validation(c: &mut Criterion) {
    let registry = Arc::new(SchemaRegistry::marc21());
    let records = SeqReader::new(Cursor::new(generate(1_000)), Arc::clone(&registry))
        .read_all()
        .unwrap_or_else(|e| panic!("generated input should read: {e}"));
    let validator = Validator::new(registry);

    c.bench_function("validate_1k_records", |b| {
        b.iter(|| {
            records
                .iter()
                .map(|r| validator.validate(black_box(r), SchemaVersion::new(1, 0)).len())
                .sum::<usize>()
        });
    });
}

fn benchmark_extraction(c: &mut Criterion) {
    let registry = Arc::new(SchemaRegistry::marc21());
    let records = SeqReader::new(Cursor::new(generate(1_000)), registry)
        .read_all()
        .unwrap_or_else(|e| panic!("generated input should read: {e}"));

    let mut group = c.benchmark_group("extraction");
    for policy in [KeyPolicy::Raw, KeyPolicy::Mixed] {
        group.bench_function(format!("sequential_{policy}"), |b| {
            b.iter(|| {
                records
                    .iter()
                    .map(|r| extract(black_box(r), policy).len())
                    .sum::<usize>()
            });
        });
    }
    group.bench_function("parallel_mixed", |b| {
        b.iter(|| extract_batch(black_box(&records), KeyPolicy::Mixed).len());
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_assembly,
    benchmark_validation,
    benchmark_extraction
);
criterion_main!(benches);
