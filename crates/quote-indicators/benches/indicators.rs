//! Benchmarks for chain indicator implementations.

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use quote_core::types::{Quote, QuoteChain, Symbol};
use quote_indicators::{ema, emad, hma, sma};

fn generate_test_chain(size: usize) -> QuoteChain {
    let start = NaiveDate::from_ymd_opt(2000, 1, 3)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    QuoteChain::from_quotes((0..size).map(|i| {
        let close = 100.0 + (i as f64 * 0.1).sin() * 10.0;
        Quote::new(
            Symbol::new("BENCH"),
            start + Duration::days(i as i64),
            close,
            close + 1.0,
            close - 1.0,
            close,
            1000,
        )
    }))
    .unwrap()
}

fn benchmark_windowed(c: &mut Criterion) {
    let mut group = c.benchmark_group("windowed");
    let chain = generate_test_chain(1000);
    let tail = chain.tail().unwrap();

    for period in [10, 40, 200].iter() {
        group.bench_with_input(BenchmarkId::new("sma", period), period, |b, &p| {
            b.iter(|| sma(black_box(tail), p))
        });
        group.bench_with_input(BenchmarkId::new("hma", period), period, |b, &p| {
            b.iter(|| hma(black_box(tail), p))
        });
    }

    group.finish();
}

fn benchmark_recursive(c: &mut Criterion) {
    let mut group = c.benchmark_group("recursive");

    for size in [1000, 10000].iter() {
        let chain = generate_test_chain(*size);
        let tail = chain.tail().unwrap();

        group.bench_with_input(BenchmarkId::new("ema", size), &tail, |b, &q| {
            b.iter(|| ema(black_box(q), 20))
        });
        group.bench_with_input(BenchmarkId::new("emad", size), &tail, |b, &q| {
            b.iter(|| emad(black_box(q), 20))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_windowed, benchmark_recursive);
criterion_main!(benches);
