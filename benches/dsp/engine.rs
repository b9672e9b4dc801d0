//! Benchmarks for the full pull-based engine loop.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use tract_dsp::engine::SynthConfig;
use tract_dsp::tract::TractTopology;
use tract_dsp::{ControlFrame, Synthesizer};

use crate::BLOCK_SIZES;

pub fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine/synthesize");

    let config = SynthConfig {
        sample_rate: 16_000.0,
        control_rate: 100.0,
        oversampling: 4,
        topology: TractTopology::oral(8),
        ..SynthConfig::default()
    };
    let mut engine = Synthesizer::new(config).expect("valid engine");

    for &size in BLOCK_SIZES {
        let frames = vec![ControlFrame::uniform(8, 1.0, 120.0, 0.5); size / 160 + 2];
        group.bench_with_input(BenchmarkId::new("steady_vowel", size), &size, |b, &n| {
            b.iter(|| {
                engine
                    .synthesize(black_box(frames.clone()), n)
                    .expect("covered utterance")
            })
        });
    }

    group.finish();
}
