//! In-memory repository for tests and embedding without SQLite.
//!
//! Mirrors the SQLite repository semantics, including cascading tank
//! deletes, one stock entry per (tank, species) and one care task per
//! (tank, kind).
//!
//! Individual writes never fail halfway, but `atomically` does not roll
//! back earlier writes of a unit whose later step is rejected.

use crate::model::care_task::{CareTask, CareTaskId};
use crate::model::owner::OwnerProfile;
use crate::model::tank::{OwnerId, StockEntry, StockEntryId, Tank, TankId};
use crate::repo::{
    CareTaskRepository, OwnerRepository, RepoError, RepoResult, StockRepository, TankRepository,
    UnitOfWork,
};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct MemoryState {
    tanks: HashMap<TankId, Tank>,
    stock: HashMap<StockEntryId, StockEntry>,
    tasks: HashMap<CareTaskId, CareTask>,
    owners: HashMap<OwnerId, OwnerProfile>,
}

/// Thread-safe map-backed repository.
#[derive(Debug, Default)]
pub struct InMemoryAquariumRepository {
    state: Mutex<MemoryState>,
}

impl InMemoryAquariumRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TankRepository for InMemoryAquariumRepository {
    fn get_tank(&self, id: TankId) -> RepoResult<Option<Tank>> {
        Ok(self.state().tanks.get(&id).cloned())
    }

    fn list_tanks(&self, owner_id: OwnerId) -> RepoResult<Vec<Tank>> {
        let mut tanks: Vec<Tank> = self
            .state()
            .tanks
            .values()
            .filter(|tank| tank.owner_id == owner_id)
            .cloned()
            .collect();
        tanks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(tanks)
    }

    fn put_tank(&self, tank: &Tank) -> RepoResult<()> {
        self.state().tanks.insert(tank.id, tank.clone());
        Ok(())
    }

    fn delete_tank(&self, id: TankId) -> RepoResult<()> {
        let mut state = self.state();
        if state.tanks.remove(&id).is_none() {
            return Err(RepoError::NotFound { entity: "tank", id });
        }
        state.stock.retain(|_, entry| entry.tank_id != id);
        state.tasks.retain(|_, task| task.tank_id != id);
        Ok(())
    }
}

impl StockRepository for InMemoryAquariumRepository {
    fn get_stock_entry(&self, id: StockEntryId) -> RepoResult<Option<StockEntry>> {
        Ok(self.state().stock.get(&id).cloned())
    }

    fn list_stock(&self, tank_id: TankId) -> RepoResult<Vec<StockEntry>> {
        let mut entries: Vec<StockEntry> = self
            .state()
            .stock
            .values()
            .filter(|entry| entry.tank_id == tank_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(entries)
    }

    fn put_stock_entry(&self, entry: &StockEntry) -> RepoResult<()> {
        let mut state = self.state();
        if !state.tanks.contains_key(&entry.tank_id) {
            return Err(RepoError::InvalidData(format!(
                "stock entry {} references missing tank {}",
                entry.id, entry.tank_id
            )));
        }
        let clash = state.stock.values().any(|other| {
            other.id != entry.id
                && other.tank_id == entry.tank_id
                && other.species_id == entry.species_id
        });
        if clash {
            return Err(RepoError::InvalidData(format!(
                "tank {} already stocks species `{}`",
                entry.tank_id, entry.species_id
            )));
        }
        state.stock.insert(entry.id, entry.clone());
        Ok(())
    }

    fn delete_stock_entry(&self, id: StockEntryId) -> RepoResult<()> {
        match self.state().stock.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound {
                entity: "stock entry",
                id,
            }),
        }
    }
}

impl CareTaskRepository for InMemoryAquariumRepository {
    fn get_care_task(&self, id: CareTaskId) -> RepoResult<Option<CareTask>> {
        Ok(self.state().tasks.get(&id).cloned())
    }

    fn list_care_tasks(&self, tank_id: TankId) -> RepoResult<Vec<CareTask>> {
        let mut tasks: Vec<CareTask> = self
            .state()
            .tasks
            .values()
            .filter(|task| task.tank_id == tank_id)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| a.kind.cmp(&b.kind).then(a.id.cmp(&b.id)));
        Ok(tasks)
    }

    fn put_care_task(&self, task: &CareTask) -> RepoResult<()> {
        let mut state = self.state();
        if !state.tanks.contains_key(&task.tank_id) {
            return Err(RepoError::InvalidData(format!(
                "care task {} references missing tank {}",
                task.id, task.tank_id
            )));
        }
        let clash = state.tasks.values().any(|other| {
            other.id != task.id && other.tank_id == task.tank_id && other.kind == task.kind
        });
        if clash {
            return Err(RepoError::InvalidData(format!(
                "tank {} already has a `{}` task",
                task.tank_id,
                task.kind.as_str()
            )));
        }
        state.tasks.insert(task.id, task.clone());
        Ok(())
    }

    fn delete_care_task(&self, id: CareTaskId) -> RepoResult<()> {
        match self.state().tasks.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound {
                entity: "care task",
                id,
            }),
        }
    }
}

impl OwnerRepository for InMemoryAquariumRepository {
    fn get_owner_profile(&self, owner_id: OwnerId) -> RepoResult<Option<OwnerProfile>> {
        Ok(self.state().owners.get(&owner_id).copied())
    }

    fn put_owner_profile(&self, profile: &OwnerProfile) -> RepoResult<()> {
        self.state().owners.insert(profile.owner_id, *profile);
        Ok(())
    }
}

impl UnitOfWork for InMemoryAquariumRepository {
    fn atomically<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<RepoError>,
    {
        work()
    }
}
