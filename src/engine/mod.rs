//! Engine orchestration: configuration, the pull-based sample loop, and the
//! decimating output stage.

/// FIR decimation, clipping, and the sample sink boundary.
pub mod output;

use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::control::{ControlFrame, FrameInterpolator};
use crate::dsp::fir::FirSpec;
use crate::dsp::wavetable::{GlottalOscillator, GlottalPulse};
use crate::error::{SynthError, SynthResult};
use crate::tract::{TractTopology, TubeParams, TubeWaveguide};

use self::output::{OutputStage, SampleSink};

/// Glottal source settings.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct GlottalConfig {
    /// Pulse shape of the wavetable.
    pub pulse: GlottalPulse,
    /// Fraction of the source replaced by noise, 0 to 1.
    pub breathiness: f64,
    /// Fraction of the backward wave reflected at the glottis, in [0, 1).
    pub reflection: f64,
    /// Seed for the deterministic breathiness noise.
    pub noise_seed: u64,
}

impl Default for GlottalConfig {
    fn default() -> Self {
        Self {
            pulse: GlottalPulse::default(),
            breathiness: 0.01,
            reflection: 0.7,
            noise_seed: 0,
        }
    }
}

/// Propagation loss settings.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct LossConfig {
    /// Wall loss per section traversal, as a percentage of unity gain.
    pub loss_factor: f64,
}

impl Default for LossConfig {
    fn default() -> Self {
        Self { loss_factor: 0.5 }
    }
}

impl LossConfig {
    /// Per-write damping gain derived from the loss percentage.
    pub fn damping(&self) -> f64 {
        1.0 - self.loss_factor / 100.0
    }
}

/// Radiation impedance approximation at the open ends.
///
/// A single reflection coefficient per aperture: `r` of the incident wave
/// reflects back (inverted), `1 + r` radiates out as output pressure.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct RadiationConfig {
    pub lip_reflection: f64,
    pub nose_reflection: f64,
}

impl Default for RadiationConfig {
    fn default() -> Self {
        Self {
            lip_reflection: -0.85,
            nose_reflection: -0.85,
        }
    }
}

/// Complete engine configuration.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct SynthConfig {
    /// Output sample rate in Hz.
    pub sample_rate: f64,
    /// Control frame rate in Hz; must divide the sample rate exactly.
    pub control_rate: f64,
    /// Integer factor between the internal tick rate and the output rate.
    pub oversampling: usize,
    pub topology: TractTopology,
    pub fir: FirSpec,
    pub glottis: GlottalConfig,
    pub loss: LossConfig,
    pub radiation: RadiationConfig,
    /// Smallest admissible section radius; full occlusions clamp here.
    pub min_radius: f64,
    /// Master output gain in dB (0 = unity).
    pub master_volume_db: f64,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100.0,
            control_rate: 10.0,
            oversampling: 4,
            topology: TractTopology::oral(8),
            fir: FirSpec::for_ratio(4),
            glottis: GlottalConfig::default(),
            loss: LossConfig::default(),
            radiation: RadiationConfig::default(),
            min_radius: 0.001,
            master_volume_db: 0.0,
        }
    }
}

/// The articulatory synthesis engine.
///
/// Strictly sequential and pull-based: each `next_sample` call interpolates
/// the control targets for one output sample, runs the tube for
/// `oversampling` ticks, and decimates. Stopping the calls stops all work;
/// nothing runs in the background. Separate engines share no state, so
/// independent utterances may run on separate workers.
pub struct Synthesizer {
    interpolator: FrameInterpolator,
    oscillator: GlottalOscillator,
    tube: TubeWaveguide,
    output: OutputStage,
    oversampling: usize,
}

impl Synthesizer {
    pub fn new(config: SynthConfig) -> SynthResult<Self> {
        if config.oversampling < 1 {
            return Err(SynthError::configuration(
                "oversampling ratio must be at least 1",
            ));
        }
        if !(config.sample_rate > 0.0) {
            return Err(SynthError::configuration("sample rate must be positive"));
        }
        if !(0.0..=1.0).contains(&config.glottis.breathiness) {
            return Err(SynthError::configuration("breathiness must be within [0, 1]"));
        }

        let tick_rate = config.sample_rate * config.oversampling as f64;
        let oscillator = GlottalOscillator::new(
            &config.glottis.pulse,
            tick_rate,
            config.glottis.breathiness,
            config.glottis.noise_seed,
        )?;
        let tube = TubeWaveguide::new(
            &config.topology,
            TubeParams {
                damping: config.loss.damping(),
                glottal_reflection: config.glottis.reflection,
                lip_reflection: config.radiation.lip_reflection,
                nose_reflection: config.radiation.nose_reflection,
                min_radius: config.min_radius,
            },
        )?;
        let interpolator = FrameInterpolator::new(
            config.sample_rate,
            config.control_rate,
            config.topology.regions,
        )?;
        let output = OutputStage::new(&config.fir, config.oversampling, config.master_volume_db)?;

        debug!(
            sample_rate = config.sample_rate,
            oversampling = config.oversampling,
            oral_sections = config.topology.oral_sections,
            nasal = tube.has_nasal_branch(),
            "synthesizer constructed"
        );

        Ok(Self {
            interpolator,
            oscillator,
            tube,
            output,
            oversampling: config.oversampling,
        })
    }

    /// Output samples covered by one control-frame interval.
    pub fn samples_per_frame(&self) -> usize {
        self.interpolator.samples_per_frame()
    }

    /// Install the control stream for a new utterance and clear all delay
    /// lines, filter history, and oscillator phase.
    ///
    /// This is also how the engine recovers after a terminal utterance error.
    pub fn begin_utterance(&mut self, frames: Vec<ControlFrame>) -> SynthResult<()> {
        let frame_count = frames.len();
        self.interpolator.begin(frames)?;
        self.tube.clear();
        self.output.reset();
        self.oscillator.reset();
        debug!(frames = frame_count, "utterance started");
        Ok(())
    }

    /// Pull one finished output sample.
    pub fn next_sample(&mut self) -> SynthResult<f32> {
        let targets = self.interpolator.advance()?;
        let pitch = targets.pitch;
        let amplitude = targets.amplitude;
        let velum = targets.velum;

        self.tube.set_targets(&targets.radii, velum)?;
        self.oscillator.set_pitch(pitch);

        let mut sample = 0.0;
        let mut produced = false;
        for _ in 0..self.oversampling {
            let excitation = self.oscillator.next_sample() * amplitude;
            let pressure = self.tube.tick(excitation);
            if let Some(out) = self.output.push_tick(pressure) {
                sample = out;
                produced = true;
            }
        }
        debug_assert!(produced, "decimator must yield once per output period");
        Ok(sample)
    }

    /// Render a whole utterance: begin with `frames`, pull `num_samples`.
    pub fn synthesize(
        &mut self,
        frames: Vec<ControlFrame>,
        num_samples: usize,
    ) -> SynthResult<Vec<f32>> {
        let mut samples = Vec::with_capacity(num_samples);
        self.run(frames, num_samples, &mut samples)?;
        Ok(samples)
    }

    /// Render an utterance, forwarding each finished sample to `sink`.
    pub fn run(
        &mut self,
        frames: Vec<ControlFrame>,
        num_samples: usize,
        sink: &mut impl SampleSink,
    ) -> SynthResult<()> {
        self.begin_utterance(frames)?;
        for _ in 0..num_samples {
            sink.write(self.next_sample()?);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SynthConfig {
        SynthConfig {
            sample_rate: 16_000.0,
            control_rate: 100.0,
            oversampling: 4,
            topology: TractTopology::oral(8),
            fir: FirSpec::for_ratio(4),
            ..SynthConfig::default()
        }
    }

    fn steady_frames(count: usize) -> Vec<ControlFrame> {
        vec![ControlFrame::uniform(8, 1.0, 120.0, 0.5); count]
    }

    #[test]
    fn zero_oversampling_is_rejected() {
        let config = SynthConfig {
            oversampling: 0,
            ..test_config()
        };
        assert!(matches!(
            Synthesizer::new(config),
            Err(SynthError::Configuration { .. })
        ));
    }

    #[test]
    fn default_config_constructs() {
        Synthesizer::new(SynthConfig::default()).expect("defaults should be valid");
    }

    #[test]
    fn steady_vowel_produces_sound() {
        let mut engine = Synthesizer::new(test_config()).expect("valid engine");
        let samples = engine
            .synthesize(steady_frames(5), 320)
            .expect("covered utterance");
        assert_eq!(samples.len(), 320);
        assert!(samples.iter().all(|s| s.is_finite()));
        assert!(samples.iter().all(|s| s.abs() <= 1.0));
        assert!(
            samples.iter().any(|s| s.abs() > 1e-6),
            "steady vowel should not be silent"
        );
    }

    #[test]
    fn engine_recovers_after_underrun() {
        let mut engine = Synthesizer::new(test_config()).expect("valid engine");
        // 160 samples per frame; 2 frames cover 160 samples.
        let err = engine.synthesize(steady_frames(2), 200).unwrap_err();
        assert!(matches!(err, SynthError::Underrun { sample_index: 160 }));

        let samples = engine
            .synthesize(steady_frames(5), 320)
            .expect("engine should be reusable after an error");
        assert_eq!(samples.len(), 320);
    }

    #[test]
    fn run_forwards_to_the_sink() {
        let mut engine = Synthesizer::new(test_config()).expect("valid engine");
        let mut count = 0usize;
        let mut sink = output::CallbackSink(|_s: f32| count += 1);
        engine
            .run(steady_frames(5), 100, &mut sink)
            .expect("covered utterance");
        assert_eq!(count, 100);
    }

    #[test]
    fn identical_configs_render_identical_audio() {
        let mut a = Synthesizer::new(test_config()).expect("valid engine");
        let mut b = Synthesizer::new(test_config()).expect("valid engine");
        let out_a = a.synthesize(steady_frames(5), 320).expect("covered");
        let out_b = b.synthesize(steady_frames(5), 320).expect("covered");
        assert_eq!(out_a, out_b, "engines share no state and must be deterministic");
    }
}
