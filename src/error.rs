//! Error types for tube synthesis.

use thiserror::Error;

/// Result type for synthesis operations.
pub type SynthResult<T> = Result<T, SynthError>;

/// Errors that terminate the current utterance.
///
/// Every variant is fatal for the utterance that raised it. The engine itself
/// stays valid: starting a new utterance clears all delay-line and filter
/// state, so no retry logic exists inside the sample loop.
#[derive(Debug, Error)]
pub enum SynthError {
    /// Invalid construction parameters.
    #[error("invalid configuration: {message}")]
    Configuration {
        /// What was wrong with the configuration.
        message: String,
    },

    /// Control-frame stream exhausted mid-utterance.
    #[error("control stream underrun at sample {sample_index}")]
    Underrun {
        /// Index of the first output sample the frame stream could not cover.
        sample_index: usize,
    },

    /// A junction reflection coefficient left the open interval (-1, 1).
    ///
    /// The radius clamp makes this unreachable for well-formed topologies, so
    /// it indicates a topology or parameter defect. The coefficient is never
    /// silently re-clamped.
    #[error("unstable reflection coefficient {coefficient} at junction {junction}")]
    NumericInstability {
        /// Junction index counted from the glottal end.
        junction: usize,
        /// The offending coefficient value.
        coefficient: f64,
    },
}

impl SynthError {
    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}
