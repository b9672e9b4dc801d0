//! Benchmarks for the glottal wavetable oscillator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use tract_dsp::dsp::wavetable::{GlottalOscillator, GlottalPulse};

pub fn bench_wavetable(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/wavetable");

    for &breathiness in &[0.0, 0.05] {
        let mut osc = GlottalOscillator::new(&GlottalPulse::default(), 64_000.0, breathiness, 1)
            .expect("valid oscillator");
        osc.set_pitch(120.0);

        let label = if breathiness == 0.0 { "clean" } else { "breathy" };
        group.bench_with_input(BenchmarkId::new(label, 1024), &1024usize, |b, &n| {
            b.iter(|| {
                let mut acc = 0.0;
                for _ in 0..n {
                    acc += osc.next_sample();
                }
                black_box(acc)
            })
        });
    }

    group.finish();
}
