//! Waveguide sections and junction reflection coefficients.

use crate::dsp::ring_buffer::RingBuffer;
use crate::error::{SynthError, SynthResult};

/// One atomic waveguide element.
///
/// A section owns a delay line per traveling direction plus its current
/// cross-section. Area is proportional to radius squared; the shared
/// proportionality constant cancels out of every coefficient, so it is
/// dropped.
#[derive(Debug, Clone)]
pub struct Section {
    forward: RingBuffer<f64>,
    backward: RingBuffer<f64>,
    radius: f64,
    area: f64,
}

impl Section {
    pub fn new(min_radius: f64) -> Self {
        let mut section = Self {
            forward: RingBuffer::new(2),
            backward: RingBuffer::new(2),
            radius: 0.0,
            area: 0.0,
        };
        section.set_radius(min_radius, min_radius);
        section
    }

    /// Update the cross-section, clamping to the configured minimum so a full
    /// occlusion never produces a zero area.
    pub fn set_radius(&mut self, radius: f64, min_radius: f64) {
        let clamped = radius.max(min_radius);
        self.radius = clamped;
        self.area = clamped * clamped;
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    /// Forward wave that arrived at this section's far junction during the
    /// previous tick.
    #[inline]
    pub fn forward_in(&self) -> f64 {
        self.forward.peek(1)
    }

    /// Backward wave from the previous tick.
    #[inline]
    pub fn backward_in(&self) -> f64 {
        self.backward.peek(1)
    }

    /// Store this tick's outgoing waves; they become next tick's inputs.
    #[inline]
    pub fn commit(&mut self, forward: f64, backward: f64) {
        self.forward.push(forward);
        self.backward.push(backward);
    }

    /// Zero both wave lines for a fresh utterance.
    pub fn clear(&mut self) {
        self.forward.reset();
        self.backward.reset();
    }
}

/// Reflection coefficient at the junction between two adjacent areas:
/// `k = (A_i − A_{i+1}) / (A_i + A_{i+1})`.
///
/// With positive clamped radii on both sides this is always strictly inside
/// (-1, 1); anything else indicates a topology or parameter defect and is
/// surfaced, never re-clamped.
pub fn reflection_coefficient(
    junction: usize,
    upstream_area: f64,
    downstream_area: f64,
) -> SynthResult<f64> {
    let coefficient = (upstream_area - downstream_area) / (upstream_area + downstream_area);
    if !coefficient.is_finite() || coefficient <= -1.0 || coefficient >= 1.0 {
        return Err(SynthError::NumericInstability {
            junction,
            coefficient,
        });
    }
    Ok(coefficient)
}
