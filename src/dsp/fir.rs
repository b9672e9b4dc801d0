//! Windowed-sinc lowpass used for oversampling and decimation.

use std::f64::consts::{PI, TAU};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{SynthError, SynthResult};

/// Design parameters for the anti-aliasing FIR lowpass.
///
/// All frequencies are normalized to the rate the filter runs at (cycles per
/// sample, Nyquist = 0.5). The transition band opens at
/// `transition_steepness` and spans `transition_width`; the coefficient table
/// is designed so stopband ripple stays below `stopband_threshold`. Tap count
/// follows from attenuation and width, so a lax threshold combined with a
/// wide band can collapse the design to zero taps, which is rejected at
/// construction.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct FirSpec {
    /// Normalized frequency where the passband ends and rolloff begins.
    pub transition_steepness: f64,
    /// Normalized width of the transition band.
    pub transition_width: f64,
    /// Maximum stopband ripple, linear (e.g. 1e-4 for 80 dB rejection).
    pub stopband_threshold: f64,
}

impl FirSpec {
    /// Stock anti-alias design for decimating by `ratio`: the transition band
    /// straddles the post-decimation Nyquist frequency. The factors keep the
    /// band below the full-rate Nyquist even at ratio 1.
    pub fn for_ratio(ratio: usize) -> Self {
        let nyquist = 0.5 / ratio.max(1) as f64;
        Self {
            transition_steepness: 0.7 * nyquist,
            transition_width: 0.25 * nyquist,
            stopband_threshold: 1.0e-4,
        }
    }

    /// Compute the symmetric coefficient table, normalized to unity DC gain.
    pub fn design(&self) -> SynthResult<Vec<f64>> {
        if !(self.transition_steepness > 0.0 && self.transition_width > 0.0) {
            return Err(SynthError::configuration(
                "FIR transition parameters must be positive",
            ));
        }
        if self.transition_steepness + self.transition_width >= 0.5 {
            return Err(SynthError::configuration(
                "FIR transition band must end below Nyquist",
            ));
        }
        if !(self.stopband_threshold > 0.0 && self.stopband_threshold < 1.0) {
            return Err(SynthError::configuration(
                "FIR stopband threshold must be in (0, 1)",
            ));
        }

        let attenuation_db = -20.0 * self.stopband_threshold.log10();
        // Kaiser tap-count estimate for the requested attenuation and width.
        let estimate = (attenuation_db - 8.0) / (2.285 * TAU * self.transition_width);
        let taps = estimate.ceil() as isize;
        if taps <= 0 {
            return Err(SynthError::configuration(format!(
                "FIR design yields non-positive tap count ({taps})"
            )));
        }
        let taps = (taps as usize) | 1; // odd length keeps the table symmetric

        let shape = kaiser_shape(attenuation_db);
        let cutoff = self.transition_steepness + 0.5 * self.transition_width;
        let mid = (taps / 2) as f64;
        let denom = bessel_i0(shape);

        let mut coefficients = Vec::with_capacity(taps);
        for n in 0..taps {
            let k = n as f64 - mid;
            let sinc = if k == 0.0 {
                2.0 * cutoff
            } else {
                (TAU * cutoff * k).sin() / (PI * k)
            };
            let window = if mid == 0.0 {
                1.0
            } else {
                bessel_i0(shape * (1.0 - (k / mid).powi(2)).max(0.0).sqrt()) / denom
            };
            coefficients.push(sinc * window);
        }

        let sum: f64 = coefficients.iter().sum();
        for c in &mut coefficients {
            *c /= sum;
        }
        Ok(coefficients)
    }
}

/// Kaiser window shape parameter for a given stopband attenuation.
fn kaiser_shape(attenuation_db: f64) -> f64 {
    if attenuation_db > 50.0 {
        0.1102 * (attenuation_db - 8.7)
    } else if attenuation_db >= 21.0 {
        0.5842 * (attenuation_db - 21.0).powf(0.4) + 0.07886 * (attenuation_db - 21.0)
    } else {
        0.0
    }
}

/// Zeroth-order modified Bessel function of the first kind (series form).
fn bessel_i0(x: f64) -> f64 {
    let half = x / 2.0;
    let mut term = 1.0;
    let mut sum = 1.0;
    for k in 1..32 {
        term *= (half / k as f64) * (half / k as f64);
        sum += term;
        if term < 1e-16 * sum {
            break;
        }
    }
    sum
}

/// FIR lowpass with a circular history buffer.
///
/// The coefficient table is immutable after construction. The history holds
/// exactly one sample per tap; samples are written in place at a moving
/// cursor, never shifted.
#[derive(Debug, Clone)]
pub struct FirFilter {
    coefficients: Vec<f64>,
    history: Vec<f64>,
    cursor: usize,
}

impl FirFilter {
    pub fn new(spec: &FirSpec) -> SynthResult<Self> {
        let coefficients = spec.design()?;
        let history = vec![0.0; coefficients.len()];
        Ok(Self {
            coefficients,
            history,
            cursor: 0,
        })
    }

    pub fn taps(&self) -> usize {
        self.coefficients.len()
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    #[inline]
    fn store(&mut self, input: f64) {
        self.history[self.cursor] = input;
        self.cursor = (self.cursor + 1) % self.history.len();
    }

    /// Push `input` without producing output.
    ///
    /// Keeps the history current on oversampled ticks whose output is
    /// decimated away.
    #[inline]
    pub fn advance(&mut self, input: f64) {
        self.store(input);
    }

    /// Push `input` and return the convolution of the history against the
    /// coefficient table, indexed circularly from the cursor.
    pub fn filter(&mut self, input: f64) -> f64 {
        self.store(input);
        let len = self.history.len();
        let mut acc = 0.0;
        for (i, c) in self.coefficients.iter().enumerate() {
            acc += c * self.history[(self.cursor + len - 1 - i) % len];
        }
        acc
    }

    /// Zero the history and rewind the cursor.
    pub fn reset(&mut self) {
        self.history.fill(0.0);
        self.cursor = 0;
    }
}
