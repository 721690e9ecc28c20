//! Repository contracts and storage implementations.
//!
//! # Responsibility
//! - Define get/put/delete contracts per entity (tank, stock entry, care
//!   task, owner profile).
//! - Isolate SQLite details from the insight engine and service layer.
//!
//! # Invariants
//! - `put_*` is an upsert keyed by the record id.
//! - `delete_tank` removes the tank's stock entries and care tasks too.
//! - `delete_*` of a missing record returns `RepoError::NotFound`.
//! - Writes made inside `UnitOfWork::atomically` are all kept or all
//!   discarded.
//! - Listings are deterministic: tanks and stock by `created_at, id`, care
//!   tasks by canonical kind order.

use crate::db::DbError;
use crate::model::care_task::{CareTask, CareTaskId};
use crate::model::owner::OwnerProfile;
use crate::model::tank::{OwnerId, StockEntry, StockEntryId, Tank, TankId};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod memory;
pub mod sqlite;

pub type RepoResult<T> = Result<T, RepoError>;

/// Storage-level error shared by every repository implementation.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Delete target does not exist.
    NotFound { entity: &'static str, id: Uuid },
    /// Connection schema is not at the version this binary expects.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Persisted data cannot be converted to a valid domain record.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::UninitializedConnection { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Tank records keyed by tank id.
pub trait TankRepository {
    fn get_tank(&self, id: TankId) -> RepoResult<Option<Tank>>;
    fn list_tanks(&self, owner_id: OwnerId) -> RepoResult<Vec<Tank>>;
    fn put_tank(&self, tank: &Tank) -> RepoResult<()>;
    /// Deletes the tank with its stock entries and care tasks.
    fn delete_tank(&self, id: TankId) -> RepoResult<()>;
}

/// Stock entries keyed by entry id.
pub trait StockRepository {
    fn get_stock_entry(&self, id: StockEntryId) -> RepoResult<Option<StockEntry>>;
    fn list_stock(&self, tank_id: TankId) -> RepoResult<Vec<StockEntry>>;
    fn put_stock_entry(&self, entry: &StockEntry) -> RepoResult<()>;
    fn delete_stock_entry(&self, id: StockEntryId) -> RepoResult<()>;
}

/// Care tasks keyed by task id.
pub trait CareTaskRepository {
    fn get_care_task(&self, id: CareTaskId) -> RepoResult<Option<CareTask>>;
    fn list_care_tasks(&self, tank_id: TankId) -> RepoResult<Vec<CareTask>>;
    fn put_care_task(&self, task: &CareTask) -> RepoResult<()>;
    fn delete_care_task(&self, id: CareTaskId) -> RepoResult<()>;
}

/// Owner profiles keyed by owner id.
pub trait OwnerRepository {
    fn get_owner_profile(&self, owner_id: OwnerId) -> RepoResult<Option<OwnerProfile>>;
    fn put_owner_profile(&self, profile: &OwnerProfile) -> RepoResult<()>;
}

/// Groups several repository calls into one all-or-nothing unit.
pub trait UnitOfWork {
    /// Runs `work`; every write it made is kept only when it returns `Ok`.
    ///
    /// Calls must not nest.
    fn atomically<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<RepoError>;
}

/// Full storage surface required by `AquariumService`.
pub trait AquariumRepository:
    TankRepository + StockRepository + CareTaskRepository + OwnerRepository + UnitOfWork
{
}

impl<T> AquariumRepository for T where
    T: TankRepository + StockRepository + CareTaskRepository + OwnerRepository + UnitOfWork
{
}
