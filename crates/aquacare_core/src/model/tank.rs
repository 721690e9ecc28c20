//! Tank and stock domain model.
//!
//! # Responsibility
//! - Define the tank record with its derived insight fields.
//! - Define stock entries owned by one tank.
//!
//! # Invariants
//! - `volume_liters` is finite and greater than zero for persisted tanks.
//! - Derived fields (`status`, `bio_load_percentage`, `required_volume_liters`,
//!   `compatibility_status`, `warnings`, `last_calculated_at`) are only
//!   written by the insight orchestrator.
//! - One tank holds at most one stock entry per species.

use crate::model::species::SpeciesId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable tank identifier.
pub type TankId = Uuid;
/// Stable stock entry identifier.
pub type StockEntryId = Uuid;
/// Stable owner identifier supplied by the caller's identity layer.
pub type OwnerId = Uuid;

/// Bio-load classification of a tank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TankStatus {
    Comfort,
    Elevated,
    Critical,
}

impl TankStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Comfort => "comfort",
            Self::Elevated => "elevated",
            Self::Critical => "critical",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "comfort" => Some(Self::Comfort),
            "elevated" => Some(Self::Elevated),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

/// Aggregate result of the pairwise compatibility scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompatibilityStatus {
    Ok,
    Warn,
}

impl CompatibilityStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warn => "warn",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ok" => Some(Self::Ok),
            "warn" => Some(Self::Warn),
            _ => None,
        }
    }
}

/// One pairwise compatibility finding.
///
/// `species_a`/`species_b` follow discovery order of the scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityWarning {
    pub species_a: SpeciesId,
    pub species_b: SpeciesId,
    pub message: String,
}

/// Optional size hint recorded with a stock entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeClass {
    Juvenile,
    Adult,
    Large,
}

impl SizeClass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Juvenile => "juvenile",
            Self::Adult => "adult",
            Self::Large => "large",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "juvenile" => Some(Self::Juvenile),
            "adult" => Some(Self::Adult),
            "large" => Some(Self::Large),
            _ => None,
        }
    }
}

/// Aquarium record with derived insight fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tank {
    pub id: TankId,
    pub owner_id: OwnerId,
    pub name: String,
    pub volume_liters: f64,
    pub status: TankStatus,
    pub bio_load_percentage: u32,
    pub required_volume_liters: f64,
    pub compatibility_status: CompatibilityStatus,
    pub warnings: Vec<CompatibilityWarning>,
    /// `None` until the first recalculation pass.
    pub last_calculated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tank {
    /// Creates an empty tank with comfort-level derived defaults.
    pub fn new(
        owner_id: OwnerId,
        name: impl Into<String>,
        volume_liters: f64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name: name.into(),
            volume_liters,
            status: TankStatus::Comfort,
            bio_load_percentage: 0,
            required_volume_liters: 0.0,
            compatibility_status: CompatibilityStatus::Ok,
            warnings: Vec::new(),
            last_calculated_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns whether the tank belongs to `owner_id`.
    pub fn is_owned_by(&self, owner_id: OwnerId) -> bool {
        self.owner_id == owner_id
    }
}

/// One (species, quantity) record inside a tank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockEntry {
    pub id: StockEntryId,
    pub tank_id: TankId,
    pub species_id: SpeciesId,
    /// Always positive.
    pub quantity: u32,
    pub size_class: Option<SizeClass>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StockEntry {
    pub fn new(
        tank_id: TankId,
        species_id: impl Into<SpeciesId>,
        quantity: u32,
        size_class: Option<SizeClass>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tank_id,
            species_id: species_id.into(),
            quantity,
            size_class,
            created_at: now,
            updated_at: now,
        }
    }
}
