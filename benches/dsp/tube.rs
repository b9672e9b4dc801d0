//! Benchmarks for the tube waveguide network.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use tract_dsp::tract::{NasalTopology, TractTopology, TubeParams, TubeWaveguide};

fn params() -> TubeParams {
    TubeParams {
        damping: 0.995,
        glottal_reflection: 0.7,
        lip_reflection: -0.85,
        nose_reflection: -0.85,
        min_radius: 0.001,
    }
}

pub fn bench_tube(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/tube");

    for &sections in &[8usize, 16] {
        let mut tube =
            TubeWaveguide::new(&TractTopology::oral(sections), params()).expect("valid tube");
        tube.set_targets(&vec![1.0; sections], 0.0)
            .expect("valid targets");

        group.bench_with_input(BenchmarkId::new("oral", sections), &sections, |b, _| {
            b.iter(|| {
                let mut acc = 0.0;
                for i in 0..1024 {
                    acc += tube.tick(black_box((i as f64 * 0.01).sin()));
                }
                acc
            })
        });
    }

    let topology = TractTopology::oral(8).with_nasal(NasalTopology::default());
    let mut tube = TubeWaveguide::new(&topology, params()).expect("valid tube");
    tube.set_targets(&vec![1.0; 8], 0.5).expect("valid targets");
    group.bench_with_input(BenchmarkId::new("nasal", 8), &8usize, |b, _| {
        b.iter(|| {
            let mut acc = 0.0;
            for i in 0..1024 {
                acc += tube.tick(black_box((i as f64 * 0.01).sin()));
            }
            acc
        })
    });

    group.finish();
}
