//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository, catalog and insight calls into use-case APIs.
//! - Keep the CLI and other front-ends decoupled from storage details.

pub mod aquarium_service;
mod locks;

pub use aquarium_service::{
    AddFish, AquariumService, NewTank, ServiceError, ServiceResult, TankInsight, TankUpdate,
};
