//! Digital-waveguide vocal tract synthesis.
//!
//! A [`Synthesizer`] turns a stream of articulatory control frames (region
//! radii, velum opening, pitch, amplitude) into mono audio by simulating wave
//! propagation through a transmission-line model of the vocal tract. The
//! simulation runs at an oversampled internal rate and is decimated through a
//! windowed-sinc FIR on the way out.

pub mod control;
pub mod dsp; // Realtime-safe primitives: ring buffer, FIR, wavetable
pub mod engine;
pub mod error;
pub mod tract; // The waveguide network itself

pub use control::ControlFrame;
pub use engine::output::{CallbackSink, SampleSink};
pub use engine::{SynthConfig, Synthesizer};
pub use error::{SynthError, SynthResult};

/// Velar openings at or below this threshold leave the nasal branch
/// decoupled, keeping the three-port junction away from its ill-conditioned
/// near-zero region.
pub(crate) const MIN_VELUM_OPENING: f64 = 1.0e-4;
