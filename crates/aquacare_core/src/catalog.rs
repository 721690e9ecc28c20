//! Read-only species reference catalog.
//!
//! # Responsibility
//! - Resolve species ids to immutable `Species` records.
//! - Ship a small built-in catalog so core works without an external source.
//!
//! # Invariants
//! - Catalog contents never change after construction.
//! - Lookup of an unknown id returns `None`, never an error.

use crate::model::species::{Behavior, Species};
use std::collections::BTreeMap;

/// Lookup contract for species reference data.
pub trait SpeciesCatalog {
    /// Resolves one species by catalog key.
    fn lookup(&self, species_id: &str) -> Option<Species>;
}

struct SpeciesSeed {
    id: &'static str,
    common_name: &'static str,
    scientific_name: &'static str,
    recommended_volume_per_fish: f64,
    behavior: Behavior,
    bio_load_factor: f64,
    is_schooling: bool,
}

const BUILTIN_SPECIES: &[SpeciesSeed] = &[
    SpeciesSeed {
        id: "neon_tetra",
        common_name: "Neon Tetra",
        scientific_name: "Paracheirodon innesi",
        recommended_volume_per_fish: 4.0,
        behavior: Behavior::Schooling,
        bio_load_factor: 0.5,
        is_schooling: true,
    },
    SpeciesSeed {
        id: "zebra_danio",
        common_name: "Zebra Danio",
        scientific_name: "Danio rerio",
        recommended_volume_per_fish: 5.0,
        behavior: Behavior::Schooling,
        bio_load_factor: 0.6,
        is_schooling: true,
    },
    SpeciesSeed {
        id: "guppy",
        common_name: "Guppy",
        scientific_name: "Poecilia reticulata",
        recommended_volume_per_fish: 4.0,
        behavior: Behavior::Peaceful,
        bio_load_factor: 0.5,
        is_schooling: false,
    },
    SpeciesSeed {
        id: "cherry_barb",
        common_name: "Cherry Barb",
        scientific_name: "Puntius titteya",
        recommended_volume_per_fish: 6.0,
        behavior: Behavior::Peaceful,
        bio_load_factor: 0.6,
        is_schooling: false,
    },
    SpeciesSeed {
        id: "dwarf_gourami",
        common_name: "Dwarf Gourami",
        scientific_name: "Trichogaster lalius",
        recommended_volume_per_fish: 20.0,
        behavior: Behavior::Peaceful,
        bio_load_factor: 1.0,
        is_schooling: false,
    },
    SpeciesSeed {
        id: "corydoras_paleatus",
        common_name: "Peppered Corydoras",
        scientific_name: "Corydoras paleatus",
        recommended_volume_per_fish: 8.0,
        behavior: Behavior::BottomDweller,
        bio_load_factor: 0.7,
        is_schooling: true,
    },
    SpeciesSeed {
        id: "bristlenose_pleco",
        common_name: "Bristlenose Pleco",
        scientific_name: "Ancistrus cirrhosus",
        recommended_volume_per_fish: 40.0,
        behavior: Behavior::BottomDweller,
        bio_load_factor: 1.5,
        is_schooling: false,
    },
    SpeciesSeed {
        id: "betta",
        common_name: "Betta",
        scientific_name: "Betta splendens",
        recommended_volume_per_fish: 20.0,
        behavior: Behavior::SemiAggressive,
        bio_load_factor: 0.8,
        is_schooling: false,
    },
    SpeciesSeed {
        id: "tiger_barb",
        common_name: "Tiger Barb",
        scientific_name: "Puntigrus tetrazona",
        recommended_volume_per_fish: 8.0,
        behavior: Behavior::SemiAggressive,
        bio_load_factor: 0.7,
        is_schooling: true,
    },
    SpeciesSeed {
        id: "angelfish",
        common_name: "Angelfish",
        scientific_name: "Pterophyllum scalare",
        recommended_volume_per_fish: 40.0,
        behavior: Behavior::SemiAggressive,
        bio_load_factor: 1.5,
        is_schooling: false,
    },
    SpeciesSeed {
        id: "jack_dempsey",
        common_name: "Jack Dempsey",
        scientific_name: "Rocio octofasciata",
        recommended_volume_per_fish: 150.0,
        behavior: Behavior::Aggressive,
        bio_load_factor: 3.0,
        is_schooling: false,
    },
    SpeciesSeed {
        id: "red_tailed_shark",
        common_name: "Red Tailed Shark",
        scientific_name: "Epalzeorhynchos bicolor",
        recommended_volume_per_fish: 60.0,
        behavior: Behavior::Aggressive,
        bio_load_factor: 1.5,
        is_schooling: false,
    },
    SpeciesSeed {
        id: "oscar",
        common_name: "Oscar",
        scientific_name: "Astronotus ocellatus",
        recommended_volume_per_fish: 280.0,
        behavior: Behavior::Predator,
        bio_load_factor: 4.0,
        is_schooling: false,
    },
];

/// In-memory catalog backed by an ordered map.
#[derive(Debug, Clone, Default)]
pub struct StaticSpeciesCatalog {
    species: BTreeMap<String, Species>,
}

impl StaticSpeciesCatalog {
    /// Builds the catalog shipped with core.
    pub fn builtin() -> Self {
        Self::from_species(BUILTIN_SPECIES.iter().map(|seed| Species {
            id: seed.id.to_string(),
            common_name: seed.common_name.to_string(),
            scientific_name: seed.scientific_name.to_string(),
            recommended_volume_per_fish: seed.recommended_volume_per_fish,
            behavior: seed.behavior,
            bio_load_factor: seed.bio_load_factor,
            is_schooling: seed.is_schooling,
        }))
    }

    /// Builds a catalog from caller-provided records. Later duplicates win.
    pub fn from_species(species: impl IntoIterator<Item = Species>) -> Self {
        let species = species
            .into_iter()
            .map(|record| (record.id.clone(), record))
            .collect();
        Self { species }
    }

    /// Lists all records ordered by id.
    pub fn list(&self) -> Vec<Species> {
        self.species.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }
}

impl SpeciesCatalog for StaticSpeciesCatalog {
    fn lookup(&self, species_id: &str) -> Option<Species> {
        self.species.get(species_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::{SpeciesCatalog, StaticSpeciesCatalog};
    use crate::model::species::Behavior;

    #[test]
    fn builtin_catalog_resolves_known_species() {
        let catalog = StaticSpeciesCatalog::builtin();
        let tetra = catalog.lookup("neon_tetra").expect("neon tetra is built in");
        assert_eq!(tetra.behavior, Behavior::Schooling);
        assert!(tetra.is_schooling);
        assert!(catalog.lookup("kraken").is_none());
    }

    #[test]
    fn builtin_catalog_covers_every_behavior() {
        let catalog = StaticSpeciesCatalog::builtin();
        for behavior in [
            Behavior::Peaceful,
            Behavior::SemiAggressive,
            Behavior::Aggressive,
            Behavior::Predator,
            Behavior::BottomDweller,
            Behavior::Schooling,
        ] {
            assert!(
                catalog.list().iter().any(|species| species.behavior == behavior),
                "missing behavior {}",
                behavior.as_str()
            );
        }
    }

    #[test]
    fn later_duplicates_replace_earlier_records() {
        let mut first = StaticSpeciesCatalog::builtin().lookup("guppy").unwrap();
        let mut second = first.clone();
        first.recommended_volume_per_fish = 3.0;
        second.recommended_volume_per_fish = 5.0;

        let catalog = StaticSpeciesCatalog::from_species([first, second]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.lookup("guppy").unwrap().recommended_volume_per_fish, 5.0);

        assert!(StaticSpeciesCatalog::default().is_empty());
        assert_eq!(StaticSpeciesCatalog::builtin().len(), 13);
    }
}
