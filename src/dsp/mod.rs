//! Low-level DSP primitives used by the tube network and output stage.
//!
//! These components are allocation-free after construction and realtime-safe,
//! making them safe to run inside the per-tick simulation loop. They stay
//! focused on the signal-processing math so the engine can layer on
//! orchestration and control interpolation.

/// Windowed-sinc lowpass for oversampling and decimation.
pub mod fir;
/// Fixed-capacity circular delay-line store.
pub mod ring_buffer;
/// Shared numeric helpers.
pub mod util;
/// Glottal pulse wavetable oscillator.
pub mod wavetable;

pub use fir::{FirFilter, FirSpec};
pub use ring_buffer::RingBuffer;
pub use wavetable::{GlottalOscillator, GlottalPulse};
