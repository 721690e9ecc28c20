//! Bio-load evaluation.
//!
//! # Invariants
//! - `required_volume_liters` is rounded to one decimal.
//! - Zero tank volume yields 0 percent instead of an error.
//! - `> 100` is critical, `61..=100` elevated, everything else comfort.

use crate::model::species::Species;
use crate::model::tank::TankStatus;

const ELEVATED_ABOVE_PERCENT: u32 = 60;
const CRITICAL_ABOVE_PERCENT: u32 = 100;

/// Result of one bio-load evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BioLoad {
    pub required_volume_liters: f64,
    pub percentage: u32,
    pub status: TankStatus,
}

/// Sums required volume of `(species, quantity)` pairs and classifies it
/// against `volume_liters`.
pub fn evaluate_bio_load<'a>(
    volume_liters: f64,
    stock: impl IntoIterator<Item = (&'a Species, u32)>,
) -> BioLoad {
    let total: f64 = stock
        .into_iter()
        .map(|(species, quantity)| f64::from(quantity) * species.recommended_volume_per_fish)
        .sum();
    let required_volume_liters = (total * 10.0).round() / 10.0;

    let percentage = if volume_liters > 0.0 {
        (required_volume_liters / volume_liters * 100.0)
            .round()
            .max(0.0) as u32
    } else {
        0
    };

    BioLoad {
        required_volume_liters,
        percentage,
        status: classify_percentage(percentage),
    }
}

/// Maps a bio-load percentage onto a status level.
pub fn classify_percentage(percentage: u32) -> TankStatus {
    if percentage > CRITICAL_ABOVE_PERCENT {
        TankStatus::Critical
    } else if percentage > ELEVATED_ABOVE_PERCENT {
        TankStatus::Elevated
    } else {
        TankStatus::Comfort
    }
}
