//! Aquarium insight engine.
//!
//! # Responsibility
//! - Derive bio-load, compatibility and the care schedule of one tank.
//! - Compose the calculators into a single recalculation pass.
//!
//! # Invariants
//! - Every calculator is a pure function of its inputs and `now`.
//! - The schedule always uses the status derived in the same pass.
//! - An unstocked tank has no care tasks.

pub mod bio_load;
pub mod compatibility;
pub mod scheduler;
pub mod templates;

use crate::catalog::SpeciesCatalog;
use crate::model::care_task::CareTask;
use crate::model::owner::NotificationSettings;
use crate::model::species::Species;
use crate::model::tank::{StockEntry, Tank};
use bio_load::evaluate_bio_load;
use chrono::{DateTime, Utc};
use compatibility::scan_compatibility;
use log::warn;
use scheduler::schedule_care_tasks;

/// Output of one recalculation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Recalculation {
    pub tank: Tank,
    pub care_tasks: Vec<CareTask>,
}

/// Recomputes the derived fields of `tank` and its care task list.
///
/// Stock entries whose species the catalog does not know are left out of
/// bio-load and compatibility but still count as stock, so such a tank keeps
/// its schedule. Writes the results onto the tank, stamps
/// `last_calculated_at = now`, then schedules tasks with the fresh status.
/// Empty stock clears the task list.
pub fn recalculate<S: SpeciesCatalog + ?Sized>(
    mut tank: Tank,
    stock: &[StockEntry],
    catalog: &S,
    existing_tasks: Vec<CareTask>,
    settings: &NotificationSettings,
    now: DateTime<Utc>,
) -> Recalculation {
    let resolved: Vec<(Species, u32)> = stock
        .iter()
        .filter_map(|entry| match catalog.lookup(&entry.species_id) {
            Some(species) => Some((species, entry.quantity)),
            None => {
                warn!(
                    "event=stock_resolve module=insight status=skipped tank_id={} species_id={}",
                    tank.id, entry.species_id
                );
                None
            }
        })
        .collect();

    let bio_load = evaluate_bio_load(
        tank.volume_liters,
        resolved.iter().map(|(species, quantity)| (species, *quantity)),
    );
    let species: Vec<&Species> = resolved.iter().map(|(species, _)| species).collect();
    let compatibility = scan_compatibility(&species);

    tank.status = bio_load.status;
    tank.bio_load_percentage = bio_load.percentage;
    tank.required_volume_liters = bio_load.required_volume_liters;
    tank.compatibility_status = compatibility.status;
    tank.warnings = compatibility.warnings;
    tank.last_calculated_at = Some(now);

    let care_tasks = if stock.is_empty() {
        Vec::new()
    } else {
        schedule_care_tasks(tank.id, tank.status, existing_tasks, settings, now)
    };

    Recalculation { tank, care_tasks }
}
