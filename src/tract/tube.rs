//! The tube waveguide network.

use crate::error::{SynthError, SynthResult};
use crate::tract::section::{reflection_coefficient, Section};
use crate::tract::TractTopology;
use crate::MIN_VELUM_OPENING;

/// Boundary and loss settings for the tube network.
///
/// These were compile-time constants in older tube models; here they are
/// explicit configuration so independently tuned engines can coexist.
#[derive(Debug, Clone, Copy)]
pub struct TubeParams {
    /// Gain applied to every propagated wave value, in (0, 1]. 1.0 is a
    /// lossless tube.
    pub damping: f64,
    /// Fraction of the backward wave reflected at the glottis, in [0, 1).
    pub glottal_reflection: f64,
    /// Radiation reflection coefficient at the lips, in (-1, 0].
    pub lip_reflection: f64,
    /// Radiation reflection coefficient at the nostrils, in (-1, 0].
    pub nose_reflection: f64,
    /// Smallest admissible section radius.
    pub min_radius: f64,
}

/// Digital waveguide model of the vocal tract.
///
/// Sections hold forward- and backward-traveling wave amplitudes in
/// ring-buffer delay lines. Every tick reads all junction inputs as they
/// stood at the end of the previous tick, computes every outgoing wave into
/// scratch storage, and only then commits, so no junction can observe a
/// value already overwritten within the same tick.
#[derive(Debug)]
pub struct TubeWaveguide {
    oral: Vec<Section>,
    nasal: Vec<Section>,
    /// Reflection coefficient per oral junction i (between sections i, i+1).
    oral_k: Vec<f64>,
    /// Fixed coefficients for the nasal interior junctions.
    nasal_k: Vec<f64>,
    /// Sections covered by each control region, glottis to lips.
    region_spans: Vec<usize>,
    /// Oral junction index hosting the velar port (meaningful when nasal
    /// sections exist).
    velum_junction: usize,
    nasal_inlet_area: f64,
    /// Effective velar port area for the current targets; 0 while closed.
    velum_area: f64,
    params: TubeParams,

    // Previous-tick snapshots and this tick's outgoing waves.
    oral_f: Vec<f64>,
    oral_b: Vec<f64>,
    oral_new_f: Vec<f64>,
    oral_new_b: Vec<f64>,
    nasal_f: Vec<f64>,
    nasal_b: Vec<f64>,
    nasal_new_f: Vec<f64>,
    nasal_new_b: Vec<f64>,
}

impl TubeWaveguide {
    pub fn new(topology: &TractTopology, params: TubeParams) -> SynthResult<Self> {
        let n = topology.oral_sections;
        if n < 2 {
            return Err(SynthError::configuration(
                "tract needs at least two oral sections",
            ));
        }
        if topology.regions == 0 || topology.regions > n {
            return Err(SynthError::configuration(format!(
                "region count must be in 1..={n}"
            )));
        }
        if !(params.damping > 0.0 && params.damping <= 1.0) {
            return Err(SynthError::configuration("damping must be in (0, 1]"));
        }
        if !(0.0..1.0).contains(&params.glottal_reflection) {
            return Err(SynthError::configuration(
                "glottal reflection must be in [0, 1)",
            ));
        }
        for (name, r) in [
            ("lip", params.lip_reflection),
            ("nose", params.nose_reflection),
        ] {
            if !(r > -1.0 && r <= 0.0) {
                return Err(SynthError::configuration(format!(
                    "{name} radiation reflection must be in (-1, 0]"
                )));
            }
        }
        if !(params.min_radius > 0.0) {
            return Err(SynthError::configuration("minimum radius must be positive"));
        }

        // Spread sections evenly across regions; the lip-most region absorbs
        // the remainder.
        let mut region_spans = vec![n / topology.regions; topology.regions];
        if let Some(last) = region_spans.last_mut() {
            *last += n % topology.regions;
        }

        let oral = vec![Section::new(params.min_radius); n];

        let (nasal, nasal_k, velum_junction, nasal_inlet_area) = match &topology.nasal {
            None => (Vec::new(), Vec::new(), 0, 0.0),
            Some(branch) => {
                if branch.radii.is_empty() {
                    return Err(SynthError::configuration(
                        "nasal branch needs at least one section",
                    ));
                }
                if branch.radii.iter().any(|&r| !(r > 0.0)) {
                    return Err(SynthError::configuration(
                        "nasal section radii must be positive",
                    ));
                }
                if branch.coupling_section == 0 || branch.coupling_section >= n {
                    return Err(SynthError::configuration(format!(
                        "velum coupling section must be in 1..{n}"
                    )));
                }
                let mut sections = Vec::with_capacity(branch.radii.len());
                for &radius in &branch.radii {
                    let mut section = Section::new(params.min_radius);
                    section.set_radius(radius, params.min_radius);
                    sections.push(section);
                }
                let mut coefficients = Vec::with_capacity(sections.len().saturating_sub(1));
                for i in 0..sections.len().saturating_sub(1) {
                    coefficients.push(reflection_coefficient(
                        i,
                        sections[i].area(),
                        sections[i + 1].area(),
                    )?);
                }
                let inlet_area = sections[0].area();
                (
                    sections,
                    coefficients,
                    branch.coupling_section - 1,
                    inlet_area,
                )
            }
        };

        let m = nasal.len();
        Ok(Self {
            oral,
            nasal,
            oral_k: vec![0.0; n - 1],
            nasal_k,
            region_spans,
            velum_junction,
            nasal_inlet_area,
            velum_area: 0.0,
            params,
            oral_f: vec![0.0; n],
            oral_b: vec![0.0; n],
            oral_new_f: vec![0.0; n],
            oral_new_b: vec![0.0; n],
            nasal_f: vec![0.0; m],
            nasal_b: vec![0.0; m],
            nasal_new_f: vec![0.0; m],
            nasal_new_b: vec![0.0; m],
        })
    }

    pub fn oral_sections(&self) -> usize {
        self.oral.len()
    }

    pub fn has_nasal_branch(&self) -> bool {
        !self.nasal.is_empty()
    }

    /// Map per-region radii onto the sections and refresh every junction
    /// reflection coefficient, plus the effective velar port area.
    pub fn set_targets(&mut self, region_radii: &[f64], velum: f64) -> SynthResult<()> {
        debug_assert_eq!(region_radii.len(), self.region_spans.len());
        let mut section = 0;
        for (region, &span) in self.region_spans.iter().enumerate() {
            for _ in 0..span {
                self.oral[section].set_radius(region_radii[region], self.params.min_radius);
                section += 1;
            }
        }
        for i in 0..self.oral.len() - 1 {
            self.oral_k[i] =
                reflection_coefficient(i, self.oral[i].area(), self.oral[i + 1].area())?;
        }
        self.velum_area = if !self.nasal.is_empty() && velum > MIN_VELUM_OPENING {
            velum * self.nasal_inlet_area
        } else {
            0.0
        };
        Ok(())
    }

    /// Advance the network by one oversampled tick.
    ///
    /// `excitation` is the glottal source sample, already scaled by the
    /// frame amplitude. Returns the radiated pressure for this tick.
    pub fn tick(&mut self, excitation: f64) -> f64 {
        let n = self.oral.len();
        let m = self.nasal.len();
        let damping = self.params.damping;

        // Read phase: snapshot the previous tick before any write.
        for i in 0..n {
            self.oral_f[i] = self.oral[i].forward_in();
            self.oral_b[i] = self.oral[i].backward_in();
        }
        for i in 0..m {
            self.nasal_f[i] = self.nasal[i].forward_in();
            self.nasal_b[i] = self.nasal[i].backward_in();
        }

        // Glottal boundary: inject the source and reflect part of the
        // returning wave.
        self.oral_new_f[0] =
            damping * (excitation + self.params.glottal_reflection * self.oral_b[0]);

        // Interior scattering from previous-tick values.
        let velum_open = self.velum_area > 0.0;
        for i in 0..n - 1 {
            if velum_open && i == self.velum_junction {
                continue;
            }
            let delta = self.oral_k[i] * (self.oral_b[i + 1] - self.oral_f[i]);
            self.oral_new_f[i + 1] = damping * (self.oral_f[i] + delta);
            self.oral_new_b[i] = damping * (self.oral_b[i + 1] + delta);
        }

        // Velar three-port: area-weighted junction between the pharyngeal
        // side, the oral continuation, and the nasal inlet.
        if m > 0 {
            let j = self.velum_junction;
            if velum_open {
                let a1 = self.oral[j].area();
                let a2 = self.oral[j + 1].area();
                let a3 = self.velum_area;
                let w = 2.0 * (a1 * self.oral_f[j] + a2 * self.oral_b[j + 1] + a3 * self.nasal_b[0])
                    / (a1 + a2 + a3);
                self.oral_new_b[j] = damping * (w - self.oral_f[j]);
                self.oral_new_f[j + 1] = damping * (w - self.oral_b[j + 1]);
                self.nasal_new_f[0] = damping * (w - self.nasal_b[0]);
            } else {
                // Closed velum: the port absorbs; residual nasal energy
                // keeps decaying through the branch.
                self.nasal_new_f[0] = 0.0;
            }
            for i in 0..m - 1 {
                let delta = self.nasal_k[i] * (self.nasal_b[i + 1] - self.nasal_f[i]);
                self.nasal_new_f[i + 1] = damping * (self.nasal_f[i] + delta);
                self.nasal_new_b[i] = damping * (self.nasal_b[i + 1] + delta);
            }
        }

        // Radiation boundaries: part reflects back, the rest is this tick's
        // output pressure.
        let lip_r = self.params.lip_reflection;
        self.oral_new_b[n - 1] = damping * (lip_r * self.oral_f[n - 1]);
        let mut output = (1.0 + lip_r) * self.oral_f[n - 1];
        if m > 0 {
            let nose_r = self.params.nose_reflection;
            self.nasal_new_b[m - 1] = damping * (nose_r * self.nasal_f[m - 1]);
            output += (1.0 + nose_r) * self.nasal_f[m - 1];
        }

        // Commit phase: this tick's outputs become next tick's inputs.
        for i in 0..n {
            self.oral[i].commit(self.oral_new_f[i], self.oral_new_b[i]);
        }
        for i in 0..m {
            self.nasal[i].commit(self.nasal_new_f[i], self.nasal_new_b[i]);
        }

        output
    }

    /// Zero every delay line for a fresh utterance.
    pub fn clear(&mut self) {
        for section in self.oral.iter_mut().chain(self.nasal.iter_mut()) {
            section.clear();
        }
        self.velum_area = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tract::NasalTopology;

    fn params(damping: f64) -> TubeParams {
        TubeParams {
            damping,
            glottal_reflection: 0.7,
            lip_reflection: -0.85,
            nose_reflection: -0.85,
            min_radius: 0.001,
        }
    }

    fn oral_tube(sections: usize, damping: f64) -> TubeWaveguide {
        TubeWaveguide::new(&TractTopology::oral(sections), params(damping)).expect("valid tube")
    }

    #[test]
    fn single_section_topology_is_rejected() {
        let err = TubeWaveguide::new(&TractTopology::oral(1), params(0.995));
        assert!(matches!(err, Err(SynthError::Configuration { .. })));
    }

    #[test]
    fn zero_input_lossless_network_stays_silent() {
        let mut tube = oral_tube(8, 1.0);
        tube.set_targets(&vec![1.0; 8], 0.0).expect("valid targets");
        for tick in 0..2000 {
            let out = tube.tick(0.0);
            assert_eq!(out, 0.0, "spurious energy appeared at tick {tick}");
        }
    }

    #[test]
    fn impulse_energy_decays_with_damping() {
        let mut tube = oral_tube(8, 0.995);
        tube.set_targets(&vec![1.0; 8], 0.0).expect("valid targets");
        tube.tick(1.0);
        // Let the impulse circulate, then verify it has audibly decayed.
        let early: f64 = (0..200).map(|_| tube.tick(0.0).abs()).fold(0.0, f64::max);
        let late: f64 = (0..200)
            .map(|_| {
                for _ in 0..9 {
                    tube.tick(0.0);
                }
                tube.tick(0.0).abs()
            })
            .fold(0.0, f64::max);
        assert!(early > 0.0, "impulse should reach the lips");
        assert!(
            late < early * 0.5,
            "energy should decay: early peak {early}, late peak {late}"
        );
    }

    #[test]
    fn uniform_tube_has_zero_interior_reflection() {
        let mut tube = oral_tube(4, 0.995);
        tube.set_targets(&[1.5, 1.5, 1.5, 1.5], 0.0)
            .expect("valid targets");
        assert!(tube.oral_k.iter().all(|&k| k == 0.0));
    }

    #[test]
    fn full_occlusion_stays_bounded() {
        let mut tube = oral_tube(8, 0.995);
        let mut radii = vec![1.5; 8];
        radii[4] = 0.0; // clamps to min_radius: stop-consonant closure
        tube.set_targets(&radii, 0.0).expect("occlusion is legal");
        let mut peak: f64 = 0.0;
        for _ in 0..5000 {
            let out = tube.tick(0.5);
            assert!(out.is_finite(), "occluded tube produced a non-finite value");
            peak = peak.max(out.abs());
        }
        assert!(peak < 100.0, "occluded tube diverged, peak {peak}");
    }

    #[test]
    fn velum_below_epsilon_keeps_nasal_silent() {
        let topology =
            TractTopology::oral(8).with_nasal(NasalTopology::default());
        let mut tube = TubeWaveguide::new(&topology, params(0.995)).expect("valid tube");
        tube.set_targets(&vec![1.5; 8], 0.0).expect("valid targets");
        for _ in 0..500 {
            tube.tick(0.8);
        }
        assert!(
            tube.nasal_f.iter().chain(tube.nasal_b.iter()).all(|&v| v == 0.0),
            "closed velum must not leak into the nasal branch"
        );
    }

    #[test]
    fn open_velum_feeds_the_nasal_branch() {
        let topology =
            TractTopology::oral(8).with_nasal(NasalTopology::default());
        let mut tube = TubeWaveguide::new(&topology, params(0.995)).expect("valid tube");
        tube.set_targets(&vec![1.5; 8], 0.8).expect("valid targets");
        let mut energized = false;
        for _ in 0..500 {
            tube.tick(0.8);
            if tube.nasal_f.iter().any(|&v| v.abs() > 1e-6) {
                energized = true;
                break;
            }
        }
        assert!(energized, "open velum should divert energy nasally");
    }

    #[test]
    fn clear_resets_all_delay_lines() {
        let mut tube = oral_tube(4, 0.995);
        tube.set_targets(&[1.0; 4], 0.0).expect("valid targets");
        for _ in 0..64 {
            tube.tick(1.0);
        }
        tube.clear();
        assert_eq!(tube.tick(0.0), 0.0, "cleared tube should be silent");
    }
}
