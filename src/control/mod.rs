//! Articulatory parameter input.
//!
//! Callers describe an utterance as a sparse sequence of control frames at a
//! fixed control rate; this module densifies them into per-sample targets for
//! the tube network.

/// Control frames and their value ranges.
pub mod frame;
/// Sparse-to-dense linear interpolation over the frame timeline.
pub mod interpolate;

pub use frame::ControlFrame;
pub use interpolate::{FrameInterpolator, Targets};
