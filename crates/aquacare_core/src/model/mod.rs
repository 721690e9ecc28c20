//! Domain model for tanks, stock, species and care tasks.
//!
//! # Responsibility
//! - Define canonical data structures used by the insight engine and
//!   repositories.
//! - Provide stable string ids for every persisted enum.
//!
//! # Invariants
//! - Every persisted record is identified by a stable `Uuid`, except species
//!   which use catalog keys.
//! - Timestamps are UTC.

pub mod care_task;
pub mod owner;
pub mod species;
pub mod tank;
