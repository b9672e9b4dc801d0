//! Sparse control frames to dense per-sample targets.

use std::collections::VecDeque;

use crate::control::frame::ControlFrame;
use crate::dsp::util::lerp;
use crate::error::{SynthError, SynthResult};

/// Dense per-sample articulatory targets produced by interpolation.
#[derive(Debug, Clone)]
pub struct Targets {
    pub radii: Vec<f64>,
    pub velum: f64,
    pub pitch: f64,
    pub amplitude: f64,
}

/// Linear interpolator over the control-frame timeline.
///
/// Each pair of consecutive frames spans a fixed number of output samples
/// (`sample_rate / control_rate`, which must divide exactly; a fractional
/// ratio would accumulate phase drift between the control and audio
/// timelines). Frames are consumed and dropped once the timeline passes them.
#[derive(Debug)]
pub struct FrameInterpolator {
    frames: VecDeque<ControlFrame>,
    samples_per_frame: usize,
    regions: usize,
    segment_pos: usize,
    sample_index: usize,
    targets: Targets,
}

impl FrameInterpolator {
    pub fn new(sample_rate: f64, control_rate: f64, regions: usize) -> SynthResult<Self> {
        if !(sample_rate > 0.0) || !(control_rate > 0.0) {
            return Err(SynthError::configuration(
                "sample rate and control rate must be positive",
            ));
        }
        if regions == 0 {
            return Err(SynthError::configuration(
                "topology must define at least one region",
            ));
        }
        let ratio = sample_rate / control_rate;
        if (ratio - ratio.round()).abs() > 1e-9 || ratio < 1.0 {
            return Err(SynthError::configuration(format!(
                "control rate must divide the sample rate exactly (ratio {ratio})"
            )));
        }
        Ok(Self {
            frames: VecDeque::new(),
            samples_per_frame: ratio.round() as usize,
            regions,
            segment_pos: 0,
            sample_index: 0,
            targets: Targets {
                radii: vec![0.0; regions],
                velum: 0.0,
                pitch: 0.0,
                amplitude: 0.0,
            },
        })
    }

    /// Output samples covered by one inter-frame segment.
    pub fn samples_per_frame(&self) -> usize {
        self.samples_per_frame
    }

    /// Install the frame stream for a new utterance. m+1 frames cover
    /// exactly m × `samples_per_frame` output samples.
    pub fn begin(&mut self, frames: Vec<ControlFrame>) -> SynthResult<()> {
        for frame in &frames {
            if frame.radii.len() != self.regions {
                return Err(SynthError::configuration(format!(
                    "control frame has {} region radii, topology expects {}",
                    frame.radii.len(),
                    self.regions
                )));
            }
        }
        self.frames = frames.into_iter().map(ControlFrame::clamped).collect();
        self.segment_pos = 0;
        self.sample_index = 0;
        Ok(())
    }

    /// Produce the targets for the next output sample.
    ///
    /// Fails with [`SynthError::Underrun`] at exactly the first sample index
    /// the remaining frames cannot bracket.
    pub fn advance(&mut self) -> SynthResult<&Targets> {
        if self.frames.len() < 2 {
            return Err(SynthError::Underrun {
                sample_index: self.sample_index,
            });
        }

        let t = self.segment_pos as f64 / self.samples_per_frame as f64;
        let current = &self.frames[0];
        let next = &self.frames[1];
        for (slot, (&a, &b)) in self
            .targets
            .radii
            .iter_mut()
            .zip(current.radii.iter().zip(next.radii.iter()))
        {
            *slot = lerp(a, b, t);
        }
        self.targets.velum = lerp(current.velum, next.velum, t);
        self.targets.pitch = lerp(current.pitch, next.pitch, t);
        self.targets.amplitude = lerp(current.amplitude, next.amplitude, t);

        self.segment_pos += 1;
        self.sample_index += 1;
        if self.segment_pos == self.samples_per_frame {
            self.segment_pos = 0;
            self.frames.pop_front();
        }
        Ok(&self.targets)
    }
}
