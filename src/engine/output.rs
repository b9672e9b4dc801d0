//! Decimating output stage.

use crate::dsp::fir::{FirFilter, FirSpec};
use crate::dsp::util::db_to_amplitude;
use crate::error::{SynthError, SynthResult};

/// Receives finished output samples.
///
/// Writing to a file or device is the collaborator's business; the engine
/// only ever hands over one mono sample at a time.
pub trait SampleSink {
    fn write(&mut self, sample: f32);
}

impl SampleSink for Vec<f32> {
    fn write(&mut self, sample: f32) {
        self.push(sample);
    }
}

/// Adapter turning any closure into a sink.
pub struct CallbackSink<F: FnMut(f32)>(pub F);

impl<F: FnMut(f32)> SampleSink for CallbackSink<F> {
    fn write(&mut self, sample: f32) {
        (self.0)(sample);
    }
}

/// Turns the oversampled tube pressure stream into output-rate samples.
///
/// Every tick is pushed through the FIR history; only every `ratio`-th tick
/// pays for a convolution. The decimated value is scaled by the master gain
/// and clipped to [-1, 1].
#[derive(Debug)]
pub struct OutputStage {
    fir: FirFilter,
    ratio: usize,
    phase: usize,
    gain: f64,
}

impl OutputStage {
    pub fn new(spec: &FirSpec, ratio: usize, master_volume_db: f64) -> SynthResult<Self> {
        if ratio < 1 {
            return Err(SynthError::configuration(
                "oversampling ratio must be at least 1",
            ));
        }
        Ok(Self {
            fir: FirFilter::new(spec)?,
            ratio,
            phase: 0,
            gain: db_to_amplitude(master_volume_db),
        })
    }

    pub fn ratio(&self) -> usize {
        self.ratio
    }

    /// Feed one oversampled tick. Returns the finished output sample when the
    /// decimation phase wraps, once per `ratio` ticks.
    pub fn push_tick(&mut self, tick: f64) -> Option<f32> {
        self.phase += 1;
        if self.phase == self.ratio {
            self.phase = 0;
            let filtered = self.fir.filter(tick);
            Some((filtered * self.gain).clamp(-1.0, 1.0) as f32)
        } else {
            self.fir.advance(tick);
            None
        }
    }

    /// Clear the filter history and decimation phase for a new utterance.
    pub fn reset(&mut self) {
        self.fir.reset();
        self.phase = 0;
    }
}
