//! Glottal pulse wavetable and phase-accumulator oscillator.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::util::lerp;
use crate::error::{SynthError, SynthResult};

/// Samples in the single-period glottal table.
pub const TABLE_LENGTH: usize = 512;

/// Parametric shape of the glottal pulse, as fractions of one period.
///
/// The pulse opens with a smoothstep rise (`3x² − 2x³`), closes with a
/// parabolic fall (`1 − x²`), and stays at zero for the remainder of the
/// period. Rise/fall asymmetry is what gives the source its harmonic tilt.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct GlottalPulse {
    /// Fraction of the period spent opening.
    pub rise: f64,
    /// Fraction of the period spent closing.
    pub fall: f64,
}

impl Default for GlottalPulse {
    fn default() -> Self {
        Self {
            rise: 0.40,
            fall: 0.24,
        }
    }
}

impl GlottalPulse {
    /// Generate the single-period table. Computed once; immutable afterward.
    pub fn table(&self) -> SynthResult<Vec<f64>> {
        if !(self.rise > 0.0 && self.fall > 0.0) {
            return Err(SynthError::configuration(
                "glottal pulse rise and fall must be positive",
            ));
        }
        if self.rise + self.fall > 1.0 {
            return Err(SynthError::configuration(
                "glottal pulse rise + fall must not exceed one period",
            ));
        }

        let rise_len = (TABLE_LENGTH as f64 * self.rise).round() as usize;
        let fall_len = (TABLE_LENGTH as f64 * self.fall).round() as usize;

        let mut table = vec![0.0; TABLE_LENGTH];
        for (i, slot) in table.iter_mut().take(rise_len).enumerate() {
            let x = i as f64 / rise_len as f64;
            *slot = (3.0 * x * x) - (2.0 * x * x * x);
        }
        for (j, slot) in table
            .iter_mut()
            .skip(rise_len)
            .take(fall_len)
            .enumerate()
        {
            let x = j as f64 / fall_len as f64;
            *slot = 1.0 - x * x;
        }
        Ok(table)
    }
}

/// Wavetable oscillator for the glottal source.
///
/// Holds the immutable pulse table, a fractional phase, and a phase
/// increment recomputed whenever the pitch changes. Breathiness replaces a
/// fixed fraction of the pulse with deterministic noise.
#[derive(Debug, Clone)]
pub struct GlottalOscillator {
    table: Vec<f64>,
    phase: f64,
    increment: f64,
    tick_rate: f64,
    breathiness: f64,
    noise_seed: u64,
    rng: Pcg32,
}

impl GlottalOscillator {
    /// `tick_rate` is the rate this oscillator is sampled at: the tube's
    /// oversampled tick rate, not the output rate.
    pub fn new(
        pulse: &GlottalPulse,
        tick_rate: f64,
        breathiness: f64,
        noise_seed: u64,
    ) -> SynthResult<Self> {
        if !(tick_rate > 0.0) {
            return Err(SynthError::configuration("oscillator tick rate must be positive"));
        }
        if !(0.0..=1.0).contains(&breathiness) {
            return Err(SynthError::configuration("breathiness must be within [0, 1]"));
        }
        Ok(Self {
            table: pulse.table()?,
            phase: 0.0,
            increment: 0.0,
            tick_rate,
            breathiness,
            noise_seed,
            rng: Pcg32::seed_from_u64(noise_seed),
        })
    }

    /// Recompute the per-tick phase increment for a new pitch.
    pub fn set_pitch(&mut self, frequency_hz: f64) {
        self.increment = self.table.len() as f64 * frequency_hz / self.tick_rate;
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Interpolated table value at the current phase; advances and wraps.
    pub fn next_sample(&mut self) -> f64 {
        let len = self.table.len();
        let index = self.phase as usize;
        let frac = self.phase - index as f64;
        let pulse = lerp(self.table[index], self.table[(index + 1) % len], frac);

        self.phase += self.increment;
        while self.phase >= len as f64 {
            self.phase -= len as f64;
        }

        if self.breathiness > 0.0 {
            let noise: f64 = self.rng.gen_range(-1.0..1.0);
            pulse * (1.0 - self.breathiness) + noise * self.breathiness
        } else {
            pulse
        }
    }

    /// Rewind the phase and reseed the noise source for a fresh utterance.
    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.rng = Pcg32::seed_from_u64(self.noise_seed);
    }
}
