//! Core domain logic for AquaCare.
//! Tank stocking analysis, care scheduling and their persistence.

pub mod catalog;
pub mod clock;
pub mod db;
pub mod insight;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use catalog::{SpeciesCatalog, StaticSpeciesCatalog};
pub use clock::{Clock, FixedClock, SystemClock};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::care_task::{CareTask, CareTaskId, CareTaskKind, CareTaskStatus, Measurement};
pub use model::owner::{
    NotificationChannel, NotificationSettings, OwnerProfile, PreferredTime, SubscriptionPlan,
};
pub use model::species::{Behavior, Species, SpeciesId};
pub use model::tank::{
    CompatibilityStatus, CompatibilityWarning, OwnerId, SizeClass, StockEntry, StockEntryId, Tank,
    TankId, TankStatus,
};
pub use repo::memory::InMemoryAquariumRepository;
pub use repo::sqlite::SqliteAquariumRepository;
pub use repo::{AquariumRepository, RepoError, RepoResult, UnitOfWork};
pub use service::{
    AddFish, AquariumService, NewTank, ServiceError, ServiceResult, TankInsight, TankUpdate,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
