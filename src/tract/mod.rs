//! The vocal-tract waveguide network.
//!
//! A tract is a chain of oral sections from glottis to lips, optionally
//! coupled to a parallel nasal chain at the velum. Topology is fixed at
//! construction; only radii, velum opening and the glottal source vary over
//! an utterance.

/// Sections and junction coefficient math.
pub mod section;
/// The scattering network itself.
pub mod tube;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use section::Section;
pub use tube::{TubeParams, TubeWaveguide};

/// Shape of the tract: how many oral sections, how control regions map onto
/// them, and whether a nasal branch exists.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct TractTopology {
    /// Oral sections, glottis to lips. At least two.
    pub oral_sections: usize,
    /// Control regions; each covers one or more contiguous sections.
    pub regions: usize,
    /// Optional nasal branch.
    pub nasal: Option<NasalTopology>,
}

impl TractTopology {
    /// Purely oral tract with one control region per section.
    pub fn oral(sections: usize) -> Self {
        Self {
            oral_sections: sections,
            regions: sections,
            nasal: None,
        }
    }

    /// Group the sections under `regions` control regions.
    pub fn with_regions(mut self, regions: usize) -> Self {
        self.regions = regions;
        self
    }

    pub fn with_nasal(mut self, nasal: NasalTopology) -> Self {
        self.nasal = Some(nasal);
        self
    }
}

/// Fixed geometry of the nasal branch.
///
/// Nasal radii do not vary during synthesis; only the velar opening in the
/// control stream gates how much energy the branch receives.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct NasalTopology {
    /// Rest radii of the nasal sections, velum to nostrils.
    pub radii: Vec<f64>,
    /// Oral section whose upstream junction hosts the velar port.
    pub coupling_section: usize,
}

impl Default for NasalTopology {
    fn default() -> Self {
        Self {
            radii: vec![1.5; 5],
            coupling_section: 4,
        }
    }
}
