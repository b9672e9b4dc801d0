//! Benchmarks for the synthesis building blocks.

mod engine;
mod fir;
mod tube;
mod wavetable;

pub use engine::bench_engine;
pub use fir::bench_fir;
pub use tube::bench_tube;
pub use wavetable::bench_wavetable;
