//! Behavior compatibility table and pairwise scanner.
//!
//! # Responsibility
//! - Declare which behavior categories conflict or warrant caution.
//! - Scan every unordered species pair of a tank and emit warnings.
//!
//! # Invariants
//! - Declarations are not symmetric; every pair is checked in both
//!   directions.
//! - A pair yields at most one warning; conflict shadows caution.
//! - Warning ids follow scan order (`species_a` is the earlier entry).

use crate::model::species::{Behavior, Species};
use crate::model::tank::{CompatibilityStatus, CompatibilityWarning};

/// Declared relations of one behavior category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BehaviorRules {
    pub incompatible: &'static [Behavior],
    pub caution: &'static [Behavior],
}

/// Returns the declared relations of `behavior`.
pub const fn behavior_rules(behavior: Behavior) -> BehaviorRules {
    match behavior {
        Behavior::Peaceful => BehaviorRules {
            incompatible: &[Behavior::Aggressive, Behavior::Predator],
            caution: &[Behavior::SemiAggressive],
        },
        Behavior::SemiAggressive => BehaviorRules {
            incompatible: &[Behavior::Predator],
            caution: &[Behavior::Peaceful, Behavior::Schooling],
        },
        Behavior::Aggressive => BehaviorRules {
            incompatible: &[
                Behavior::Peaceful,
                Behavior::Schooling,
                Behavior::BottomDweller,
            ],
            caution: &[Behavior::SemiAggressive],
        },
        Behavior::Predator => BehaviorRules {
            incompatible: &[
                Behavior::Peaceful,
                Behavior::Schooling,
                Behavior::BottomDweller,
            ],
            caution: &[Behavior::SemiAggressive],
        },
        Behavior::BottomDweller => BehaviorRules {
            incompatible: &[],
            caution: &[Behavior::Aggressive, Behavior::Predator],
        },
        Behavior::Schooling => BehaviorRules {
            incompatible: &[Behavior::Aggressive, Behavior::Predator],
            caution: &[Behavior::SemiAggressive],
        },
    }
}

/// Relation of two behavior categories after checking both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairVerdict {
    Conflict,
    Caution,
    Compatible,
}

/// Classifies one behavior pair.
pub fn pair_verdict(a: Behavior, b: Behavior) -> PairVerdict {
    let rules_a = behavior_rules(a);
    let rules_b = behavior_rules(b);

    if rules_a.incompatible.contains(&b) || rules_b.incompatible.contains(&a) {
        PairVerdict::Conflict
    } else if rules_a.caution.contains(&b) || rules_b.caution.contains(&a) {
        PairVerdict::Caution
    } else {
        PairVerdict::Compatible
    }
}

/// Result of a compatibility scan over one tank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compatibility {
    pub status: CompatibilityStatus,
    pub warnings: Vec<CompatibilityWarning>,
}

/// Scans every unordered pair of stocked species.
pub fn scan_compatibility(stocked: &[&Species]) -> Compatibility {
    let mut warnings = Vec::new();

    for (i, first) in stocked.iter().enumerate() {
        for second in &stocked[i + 1..] {
            let message = match pair_verdict(first.behavior, second.behavior) {
                PairVerdict::Conflict => conflict_message(first, second),
                PairVerdict::Caution => caution_message(first, second),
                PairVerdict::Compatible => continue,
            };
            warnings.push(CompatibilityWarning {
                species_a: first.id.clone(),
                species_b: second.id.clone(),
                message,
            });
        }
    }

    let status = if warnings.is_empty() {
        CompatibilityStatus::Ok
    } else {
        CompatibilityStatus::Warn
    };
    Compatibility { status, warnings }
}

fn conflict_message(a: &Species, b: &Species) -> String {
    format!(
        "{} ({}) and {} ({}) are incompatible and should not share a tank",
        a.common_name,
        a.behavior.as_str(),
        b.common_name,
        b.behavior.as_str()
    )
}

fn caution_message(a: &Species, b: &Species) -> String {
    format!(
        "{} ({}) and {} ({}) may clash; watch for stress or nipping",
        a.common_name,
        a.behavior.as_str(),
        b.common_name,
        b.behavior.as_str()
    )
}
