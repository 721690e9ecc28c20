//! Species reference model.
//!
//! # Responsibility
//! - Define the immutable species record consumed by bio-load and
//!   compatibility calculations.
//! - Define the six behavior categories used for compatibility checks.
//!
//! # Invariants
//! - Species records are reference data and never mutated by core.
//! - `recommended_volume_per_fish` is expressed in liters.

use serde::{Deserialize, Serialize};

/// Stable catalog key of a species (for example `neon_tetra`).
pub type SpeciesId = String;

/// Temperament class used for pairwise compatibility checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Behavior {
    Peaceful,
    SemiAggressive,
    Aggressive,
    Predator,
    BottomDweller,
    Schooling,
}

impl Behavior {
    /// Stable string id used in storage and messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Peaceful => "peaceful",
            Self::SemiAggressive => "semi_aggressive",
            Self::Aggressive => "aggressive",
            Self::Predator => "predator",
            Self::BottomDweller => "bottom_dweller",
            Self::Schooling => "schooling",
        }
    }

    /// Parses a stable string id.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "peaceful" => Some(Self::Peaceful),
            "semi_aggressive" => Some(Self::SemiAggressive),
            "aggressive" => Some(Self::Aggressive),
            "predator" => Some(Self::Predator),
            "bottom_dweller" => Some(Self::BottomDweller),
            "schooling" => Some(Self::Schooling),
            _ => None,
        }
    }
}

/// Immutable species reference record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Species {
    pub id: SpeciesId,
    pub common_name: String,
    pub scientific_name: String,
    /// Liters of tank volume one adult fish needs.
    pub recommended_volume_per_fish: f64,
    pub behavior: Behavior,
    /// Carried through for display; bio-load math uses volume only.
    pub bio_load_factor: f64,
    pub is_schooling: bool,
}
