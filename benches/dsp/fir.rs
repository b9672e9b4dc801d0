//! Benchmarks for the decimating FIR filter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use tract_dsp::dsp::fir::{FirFilter, FirSpec};

pub fn bench_fir(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/fir");

    for &ratio in &[2usize, 4, 8] {
        let mut filter = FirFilter::new(&FirSpec::for_ratio(ratio)).expect("valid filter");
        let input: Vec<f64> = (0..1024).map(|i| (i as f64 * 0.013).sin()).collect();

        group.bench_with_input(BenchmarkId::new("decimate", ratio), &ratio, |b, _| {
            b.iter(|| {
                let mut out = 0.0;
                for (i, &x) in input.iter().enumerate() {
                    if i % ratio == ratio - 1 {
                        out = filter.filter(black_box(x));
                    } else {
                        filter.advance(black_box(x));
                    }
                }
                out
            })
        });
    }

    group.finish();
}
