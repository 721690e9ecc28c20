//! Aquarium use-case service.
//!
//! # Responsibility
//! - Provide tank, stock, care task and owner profile use-cases.
//! - Run the insight engine after every stock or tank mutation and persist
//!   its output.
//!
//! # Invariants
//! - Tanks owned by someone else are reported exactly like missing ones.
//! - Rejections (quantity, volume, species, plan limit) happen before any
//!   write.
//! - Mutation plus recalculation of one tank runs under that tank's lock
//!   and inside one repository unit of work, so a failed write leaves the
//!   stored tank, stock and tasks as they were.
//! - The clock is read once per operation.

use crate::catalog::{SpeciesCatalog, StaticSpeciesCatalog};
use crate::clock::{Clock, SystemClock};
use crate::insight::recalculate;
use crate::insight::scheduler::complete_care_task;
use crate::model::care_task::{CareTask, CareTaskId};
use crate::model::owner::{OwnerProfile, SubscriptionPlan};
use crate::model::species::SpeciesId;
use crate::model::tank::{OwnerId, SizeClass, StockEntry, StockEntryId, Tank, TankId};
use crate::repo::{AquariumRepository, RepoError};
use crate::service::locks::KeyedLocks;
use chrono::{DateTime, Utc};
use log::{info, warn};
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::PoisonError;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for aquarium use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Tank, stock entry or task is missing or belongs to another owner.
    NotFound,
    /// Quantity is not a positive integer that fits a stock entry.
    InvalidQuantity(i64),
    /// Volume is not a finite positive number of liters.
    InvalidVolume(f64),
    /// Species id does not resolve in the catalog.
    UnknownSpecies(SpeciesId),
    /// Owner already has as many tanks as the plan allows.
    LimitExceeded {
        plan: SubscriptionPlan,
        limit: usize,
    },
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::InvalidQuantity(value) => {
                write!(f, "invalid quantity {value}: must be a positive integer")
            }
            Self::InvalidVolume(value) => {
                write!(f, "invalid volume {value}: must be greater than 0 liters")
            }
            Self::UnknownSpecies(species_id) => write!(f, "unknown species `{species_id}`"),
            Self::LimitExceeded { plan, limit } => write!(
                f,
                "tank limit reached: plan `{}` allows {limit} tanks",
                plan.as_str()
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { .. } => Self::NotFound,
            other => Self::Repo(other),
        }
    }
}

/// Input for tank creation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTank {
    pub name: String,
    pub volume_liters: f64,
}

/// Partial tank update; `None` fields stay unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TankUpdate {
    pub name: Option<String>,
    pub volume_liters: Option<f64>,
}

/// Input for stocking fish into a tank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddFish {
    pub species_id: SpeciesId,
    pub quantity: i64,
    pub size_class: Option<SizeClass>,
}

/// Tank read model with its stock and care schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct TankInsight {
    pub tank: Tank,
    pub stock: Vec<StockEntry>,
    pub care_tasks: Vec<CareTask>,
}

/// Aquarium service facade over repository, catalog and clock.
pub struct AquariumService<R, S = StaticSpeciesCatalog, C = SystemClock> {
    repo: R,
    catalog: S,
    clock: C,
    tank_locks: KeyedLocks,
    owner_locks: KeyedLocks,
}

impl<R: AquariumRepository, S: SpeciesCatalog> AquariumService<R, S, SystemClock> {
    /// Creates a service reading the system clock.
    pub fn new(repo: R, catalog: S) -> Self {
        Self::with_clock(repo, catalog, SystemClock)
    }
}

impl<R: AquariumRepository, S: SpeciesCatalog, C: Clock> AquariumService<R, S, C> {
    /// Creates a service with an explicit time source.
    pub fn with_clock(repo: R, catalog: S, clock: C) -> Self {
        Self {
            repo,
            catalog,
            clock,
            tank_locks: KeyedLocks::default(),
            owner_locks: KeyedLocks::default(),
        }
    }

    /// Returns the stored profile of `owner_id`, or the default profile.
    pub fn owner_profile(&self, owner_id: OwnerId) -> ServiceResult<OwnerProfile> {
        Ok(self
            .repo
            .get_owner_profile(owner_id)?
            .unwrap_or_else(|| OwnerProfile::default_for(owner_id)))
    }

    /// Stores `profile` and refreshes task channels on the owner's tanks.
    pub fn save_owner_profile(&self, profile: &OwnerProfile) -> ServiceResult<OwnerProfile> {
        let owner_slot = self.owner_locks.slot(profile.owner_id);
        let _owner_guard = owner_slot.lock().unwrap_or_else(PoisonError::into_inner);

        let now = self.clock.now();
        let tanks = self.repo.list_tanks(profile.owner_id)?;
        let slots: Vec<_> = tanks
            .iter()
            .map(|tank| self.tank_locks.slot(tank.id))
            .collect();
        let _guards: Vec<_> = slots
            .iter()
            .map(|slot| slot.lock().unwrap_or_else(PoisonError::into_inner))
            .collect();

        self.repo.atomically(|| -> ServiceResult<()> {
            self.repo.put_owner_profile(profile)?;
            for tank in &tanks {
                // Re-read under the lock; the listed copy may be stale.
                if let Some(current) = self.repo.get_tank(tank.id)? {
                    self.recalculate_and_store(current, now)?;
                }
            }
            Ok(())
        })?;

        info!(
            "event=owner_profile_save module=service status=ok owner_id={} plan={} channel={}",
            profile.owner_id,
            profile.plan.as_str(),
            profile.notifications.channel.as_str()
        );
        Ok(*profile)
    }

    /// Creates a tank for `owner_id` within the plan's tank limit.
    pub fn create_tank(&self, owner_id: OwnerId, request: &NewTank) -> ServiceResult<TankInsight> {
        validate_volume(request.volume_liters)?;

        let owner_slot = self.owner_locks.slot(owner_id);
        let _owner_guard = owner_slot.lock().unwrap_or_else(PoisonError::into_inner);

        let profile = self.owner_profile(owner_id)?;
        if let Some(limit) = profile.plan.tank_limit() {
            let owned = self.repo.list_tanks(owner_id)?.len();
            if owned >= limit {
                warn!(
                    "event=tank_create module=service status=rejected owner_id={} reason=limit_exceeded limit={}",
                    owner_id, limit
                );
                return Err(ServiceError::LimitExceeded {
                    plan: profile.plan,
                    limit,
                });
            }
        }

        let now = self.clock.now();
        let tank = Tank::new(owner_id, request.name.trim(), request.volume_liters, now);
        let tank_id = tank.id;
        let insight = self.repo.atomically(|| -> ServiceResult<TankInsight> {
            self.repo.put_tank(&tank)?;
            self.recalculate_and_store(tank, now)
        })?;

        info!(
            "event=tank_create module=service status=ok owner_id={} tank_id={}",
            owner_id, tank_id
        );
        Ok(insight)
    }

    /// Updates name and/or volume and recalculates derived fields.
    pub fn update_tank(
        &self,
        owner_id: OwnerId,
        tank_id: TankId,
        update: &TankUpdate,
    ) -> ServiceResult<TankInsight> {
        if let Some(volume) = update.volume_liters {
            validate_volume(volume)?;
        }

        self.mutate_tank(owner_id, tank_id, |tank, now| {
            if let Some(name) = update.name.as_deref() {
                tank.name = name.trim().to_string();
            }
            if let Some(volume) = update.volume_liters {
                tank.volume_liters = volume;
            }
            tank.updated_at = now;
            self.repo.put_tank(tank)?;
            Ok(())
        })
    }

    /// Deletes a tank with its stock and care tasks.
    pub fn delete_tank(&self, owner_id: OwnerId, tank_id: TankId) -> ServiceResult<()> {
        let slot = self.tank_locks.slot(tank_id);
        let _guard = slot.lock().unwrap_or_else(PoisonError::into_inner);

        self.owned_tank(owner_id, tank_id)?
            .ok_or(ServiceError::NotFound)?;
        self.repo.delete_tank(tank_id)?;
        self.tank_locks.forget(tank_id);

        info!(
            "event=tank_delete module=service status=ok owner_id={} tank_id={}",
            owner_id, tank_id
        );
        Ok(())
    }

    /// Gets one owned tank.
    pub fn get_tank(&self, owner_id: OwnerId, tank_id: TankId) -> ServiceResult<Option<Tank>> {
        self.owned_tank(owner_id, tank_id)
    }

    /// Lists the owner's tanks by creation time.
    pub fn list_tanks(&self, owner_id: OwnerId) -> ServiceResult<Vec<Tank>> {
        Ok(self.repo.list_tanks(owner_id)?)
    }

    /// Gets one owned tank with its stock and care tasks.
    pub fn tank_insight(
        &self,
        owner_id: OwnerId,
        tank_id: TankId,
    ) -> ServiceResult<Option<TankInsight>> {
        let Some(tank) = self.owned_tank(owner_id, tank_id)? else {
            return Ok(None);
        };
        Ok(Some(TankInsight {
            stock: self.repo.list_stock(tank_id)?,
            care_tasks: self.repo.list_care_tasks(tank_id)?,
            tank,
        }))
    }

    /// Lists the stock of one owned tank.
    pub fn list_stock(
        &self,
        owner_id: OwnerId,
        tank_id: TankId,
    ) -> ServiceResult<Option<Vec<StockEntry>>> {
        match self.owned_tank(owner_id, tank_id)? {
            Some(_) => Ok(Some(self.repo.list_stock(tank_id)?)),
            None => Ok(None),
        }
    }

    /// Lists the care tasks of one owned tank in canonical kind order.
    pub fn list_care_tasks(
        &self,
        owner_id: OwnerId,
        tank_id: TankId,
    ) -> ServiceResult<Option<Vec<CareTask>>> {
        match self.owned_tank(owner_id, tank_id)? {
            Some(_) => Ok(Some(self.repo.list_care_tasks(tank_id)?)),
            None => Ok(None),
        }
    }

    /// Stocks fish; repeated species accumulate into one entry.
    ///
    /// A supplied `size_class` replaces the stored one; `None` keeps it.
    pub fn add_fish(
        &self,
        owner_id: OwnerId,
        tank_id: TankId,
        request: &AddFish,
    ) -> ServiceResult<TankInsight> {
        let quantity = validate_quantity(request.quantity)?;

        self.mutate_tank(owner_id, tank_id, |tank, now| {
            if self.catalog.lookup(&request.species_id).is_none() {
                return Err(ServiceError::UnknownSpecies(request.species_id.clone()));
            }

            let existing = self
                .repo
                .list_stock(tank.id)?
                .into_iter()
                .find(|entry| entry.species_id == request.species_id);
            let entry = match existing {
                Some(mut entry) => {
                    entry.quantity = entry
                        .quantity
                        .checked_add(quantity)
                        .ok_or(ServiceError::InvalidQuantity(request.quantity))?;
                    if request.size_class.is_some() {
                        entry.size_class = request.size_class;
                    }
                    entry.updated_at = now;
                    entry
                }
                None => StockEntry::new(
                    tank.id,
                    request.species_id.clone(),
                    quantity,
                    request.size_class,
                    now,
                ),
            };
            self.repo.put_stock_entry(&entry)?;

            info!(
                "event=stock_add module=service status=ok tank_id={} species_id={} quantity={}",
                tank.id, entry.species_id, entry.quantity
            );
            Ok(())
        })
    }

    /// Replaces the quantity of one stock entry.
    pub fn update_stock_quantity(
        &self,
        owner_id: OwnerId,
        tank_id: TankId,
        stock_id: StockEntryId,
        quantity: i64,
    ) -> ServiceResult<TankInsight> {
        let quantity = validate_quantity(quantity)?;

        self.mutate_tank(owner_id, tank_id, |tank, now| {
            let mut entry = self.owned_stock_entry(tank, stock_id)?;
            entry.quantity = quantity;
            entry.updated_at = now;
            self.repo.put_stock_entry(&entry)?;
            Ok(())
        })
    }

    /// Removes one stock entry.
    pub fn remove_stock(
        &self,
        owner_id: OwnerId,
        tank_id: TankId,
        stock_id: StockEntryId,
    ) -> ServiceResult<TankInsight> {
        self.mutate_tank(owner_id, tank_id, |tank, _now| {
            let entry = self.owned_stock_entry(tank, stock_id)?;
            self.repo.delete_stock_entry(entry.id)?;
            Ok(())
        })
    }

    /// Re-runs the insight engine without mutating stock, advancing task
    /// status against the current time.
    pub fn recalculate_tank(
        &self,
        owner_id: OwnerId,
        tank_id: TankId,
    ) -> ServiceResult<TankInsight> {
        self.mutate_tank(owner_id, tank_id, |_tank, _now| Ok(()))
    }

    /// Marks one care task completed, storing supplied measurements.
    pub fn complete_task(
        &self,
        owner_id: OwnerId,
        tank_id: TankId,
        task_id: CareTaskId,
        measurements: &HashMap<String, f64>,
    ) -> ServiceResult<CareTask> {
        let slot = self.tank_locks.slot(tank_id);
        let _guard = slot.lock().unwrap_or_else(PoisonError::into_inner);

        self.owned_tank(owner_id, tank_id)?
            .ok_or(ServiceError::NotFound)?;
        let mut task = self
            .repo
            .get_care_task(task_id)?
            .filter(|task| task.tank_id == tank_id)
            .ok_or(ServiceError::NotFound)?;

        let now = self.clock.now();
        complete_care_task(&mut task, measurements, now);
        self.repo.atomically(|| self.repo.put_care_task(&task))?;

        info!(
            "event=task_complete module=service status=ok tank_id={} task_id={} kind={} measurements={}",
            tank_id,
            task.id,
            task.kind.as_str(),
            measurements.len()
        );
        Ok(task)
    }

    /// Runs `mutate` on an owned tank under its lock, then recalculates.
    fn mutate_tank<F>(
        &self,
        owner_id: OwnerId,
        tank_id: TankId,
        mutate: F,
    ) -> ServiceResult<TankInsight>
    where
        F: FnOnce(&mut Tank, DateTime<Utc>) -> ServiceResult<()>,
    {
        let slot = self.tank_locks.slot(tank_id);
        let _guard = slot.lock().unwrap_or_else(PoisonError::into_inner);

        let mut tank = self
            .owned_tank(owner_id, tank_id)?
            .ok_or(ServiceError::NotFound)?;
        let now = self.clock.now();
        self.repo.atomically(|| -> ServiceResult<TankInsight> {
            mutate(&mut tank, now)?;
            self.recalculate_and_store(tank, now)
        })
    }

    fn owned_tank(&self, owner_id: OwnerId, tank_id: TankId) -> ServiceResult<Option<Tank>> {
        Ok(self
            .repo
            .get_tank(tank_id)?
            .filter(|tank| tank.is_owned_by(owner_id)))
    }

    fn owned_stock_entry(&self, tank: &Tank, stock_id: StockEntryId) -> ServiceResult<StockEntry> {
        self.repo
            .get_stock_entry(stock_id)?
            .filter(|entry| entry.tank_id == tank.id)
            .ok_or(ServiceError::NotFound)
    }

    /// Caller must hold the tank lock and run this inside `atomically`.
    fn recalculate_and_store(&self, tank: Tank, now: DateTime<Utc>) -> ServiceResult<TankInsight> {
        let stock = self.repo.list_stock(tank.id)?;
        let existing = self.repo.list_care_tasks(tank.id)?;
        let settings = self.owner_profile(tank.owner_id)?.notifications;
        let result = recalculate(
            tank,
            &stock,
            &self.catalog,
            existing.clone(),
            &settings,
            now,
        );

        self.repo.put_tank(&result.tank)?;

        let kept: HashSet<CareTaskId> = result.care_tasks.iter().map(|task| task.id).collect();
        for stale in existing.iter().filter(|task| !kept.contains(&task.id)) {
            self.repo.delete_care_task(stale.id)?;
        }
        let previous: HashMap<CareTaskId, &CareTask> =
            existing.iter().map(|task| (task.id, task)).collect();
        for task in &result.care_tasks {
            if previous.get(&task.id).copied() != Some(task) {
                self.repo.put_care_task(task)?;
            }
        }

        info!(
            "event=tank_recalculate module=insight status=ok tank_id={} level={} bio_load={} compatibility={} warnings={} tasks={}",
            result.tank.id,
            result.tank.status.as_str(),
            result.tank.bio_load_percentage,
            result.tank.compatibility_status.as_str(),
            result.tank.warnings.len(),
            result.care_tasks.len()
        );

        Ok(TankInsight {
            tank: result.tank,
            stock,
            care_tasks: result.care_tasks,
        })
    }
}

fn validate_volume(volume_liters: f64) -> ServiceResult<()> {
    if volume_liters.is_finite() && volume_liters > 0.0 {
        Ok(())
    } else {
        Err(ServiceError::InvalidVolume(volume_liters))
    }
}

fn validate_quantity(quantity: i64) -> ServiceResult<u32> {
    u32::try_from(quantity)
        .ok()
        .filter(|value| *value > 0)
        .ok_or(ServiceError::InvalidQuantity(quantity))
}
