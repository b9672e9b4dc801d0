//! Articulatory control frames.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Pitch values below this floor are raised to it when a frame is accepted.
const MIN_PITCH_HZ: f64 = 1.0;

/// One point on the control timeline, tagged at the fixed control rate.
///
/// Radii are per *region*; a region covers one or more contiguous tube
/// sections. Values outside their documented ranges are clamped when the
/// frame enters an utterance.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ControlFrame {
    /// Target radius per region, in the tract's length units (> 0).
    pub radii: Vec<f64>,
    /// Velar opening: 0 (closed) to 1 (open).
    pub velum: f64,
    /// Glottal pitch in Hz (> 0).
    pub pitch: f64,
    /// Glottal amplitude: 0 to 1.
    pub amplitude: f64,
}

impl ControlFrame {
    /// Frame with the same radius in every region. Handy for steady vowels
    /// and tests.
    pub fn uniform(regions: usize, radius: f64, pitch: f64, amplitude: f64) -> Self {
        Self {
            radii: vec![radius; regions],
            velum: 0.0,
            pitch,
            amplitude,
        }
    }

    pub fn with_velum(mut self, velum: f64) -> Self {
        self.velum = velum;
        self
    }

    /// Pull out-of-range values back into their documented ranges. Radii are
    /// left untouched here; the tube applies its own minimum-radius clamp
    /// every sample.
    pub(crate) fn clamped(mut self) -> Self {
        self.velum = self.velum.clamp(0.0, 1.0);
        self.amplitude = self.amplitude.clamp(0.0, 1.0);
        self.pitch = self.pitch.max(MIN_PITCH_HZ);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamping_restores_documented_ranges() {
        let frame = ControlFrame {
            radii: vec![1.0; 4],
            velum: 1.7,
            pitch: -5.0,
            amplitude: -0.2,
        }
        .clamped();
        assert_eq!(frame.velum, 1.0);
        assert_eq!(frame.amplitude, 0.0);
        assert_eq!(frame.pitch, MIN_PITCH_HZ);
    }

    #[test]
    fn uniform_fills_every_region() {
        let frame = ControlFrame::uniform(8, 1.5, 120.0, 0.5);
        assert_eq!(frame.radii, vec![1.5; 8]);
        assert_eq!(frame.velum, 0.0);
    }
}
