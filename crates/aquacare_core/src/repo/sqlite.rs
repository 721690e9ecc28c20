//! SQLite-backed aquarium repository.
//!
//! # Responsibility
//! - Persist tanks, stock entries, care tasks and owner profiles.
//! - Keep SQL and column encoding inside the persistence boundary.
//!
//! # Invariants
//! - Timestamps are stored as epoch milliseconds.
//! - Warnings and measurements are stored as JSON text.
//! - `atomically` wraps its unit in one `BEGIN IMMEDIATE` transaction.
//! - Reads reject unknown enum values and malformed ids with `InvalidData`
//!   instead of masking them.

use crate::db::migrations::latest_version;
use crate::model::care_task::{CareTask, CareTaskId, CareTaskKind, CareTaskStatus};
use crate::model::owner::{
    NotificationChannel, NotificationSettings, OwnerProfile, PreferredTime, SubscriptionPlan,
};
use crate::model::tank::{
    CompatibilityStatus, OwnerId, SizeClass, StockEntry, StockEntryId, Tank, TankId, TankStatus,
};
use crate::repo::{
    CareTaskRepository, OwnerRepository, RepoError, RepoResult, StockRepository, TankRepository,
    UnitOfWork,
};
use chrono::{DateTime, Utc};
use log::warn;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

const TANK_SELECT_SQL: &str = "SELECT
    id,
    owner_id,
    name,
    volume_liters,
    status,
    bio_load_percentage,
    required_volume_liters,
    compatibility_status,
    warnings_json,
    last_calculated_at,
    created_at,
    updated_at
FROM tanks";

const STOCK_SELECT_SQL: &str = "SELECT
    id,
    tank_id,
    species_id,
    quantity,
    size_class,
    created_at,
    updated_at
FROM stock_entries";

const TASK_SELECT_SQL: &str = "SELECT
    id,
    tank_id,
    kind,
    title,
    description,
    interval_days,
    next_due_at,
    status,
    requires_measurement,
    measurements_json,
    channel,
    last_completed_at,
    created_at,
    updated_at
FROM care_tasks";

/// SQLite implementation of every aquarium repository contract.
pub struct SqliteAquariumRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAquariumRepository<'conn> {
    /// Wraps a connection opened through `db::open_db*`.
    ///
    /// # Errors
    /// - `RepoError::UninitializedConnection` when migrations are missing.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let actual_version: u32 =
            conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }
}

impl TankRepository for SqliteAquariumRepository<'_> {
    fn get_tank(&self, id: TankId) -> RepoResult<Option<Tank>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TANK_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_tank_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_tanks(&self, owner_id: OwnerId) -> RepoResult<Vec<Tank>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TANK_SELECT_SQL} WHERE owner_id = ?1 ORDER BY created_at ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([owner_id.to_string()])?;
        let mut tanks = Vec::new();
        while let Some(row) = rows.next()? {
            tanks.push(parse_tank_row(row)?);
        }
        Ok(tanks)
    }

    fn put_tank(&self, tank: &Tank) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO tanks (
                id,
                owner_id,
                name,
                volume_liters,
                status,
                bio_load_percentage,
                required_volume_liters,
                compatibility_status,
                warnings_json,
                last_calculated_at,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            ON CONFLICT(id) DO UPDATE SET
                owner_id = excluded.owner_id,
                name = excluded.name,
                volume_liters = excluded.volume_liters,
                status = excluded.status,
                bio_load_percentage = excluded.bio_load_percentage,
                required_volume_liters = excluded.required_volume_liters,
                compatibility_status = excluded.compatibility_status,
                warnings_json = excluded.warnings_json,
                last_calculated_at = excluded.last_calculated_at,
                updated_at = excluded.updated_at;",
            params![
                tank.id.to_string(),
                tank.owner_id.to_string(),
                tank.name.as_str(),
                tank.volume_liters,
                tank.status.as_str(),
                i64::from(tank.bio_load_percentage),
                tank.required_volume_liters,
                tank.compatibility_status.as_str(),
                to_json(&tank.warnings)?,
                tank.last_calculated_at.map(to_epoch_ms),
                to_epoch_ms(tank.created_at),
                to_epoch_ms(tank.updated_at),
            ],
        )?;
        Ok(())
    }

    fn delete_tank(&self, id: TankId) -> RepoResult<()> {
        // stock_entries and care_tasks cascade through foreign keys.
        let changed = self
            .conn
            .execute("DELETE FROM tanks WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "tank", id });
        }
        Ok(())
    }
}

impl StockRepository for SqliteAquariumRepository<'_> {
    fn get_stock_entry(&self, id: StockEntryId) -> RepoResult<Option<StockEntry>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STOCK_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_stock_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_stock(&self, tank_id: TankId) -> RepoResult<Vec<StockEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{STOCK_SELECT_SQL} WHERE tank_id = ?1 ORDER BY created_at ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([tank_id.to_string()])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_stock_row(row)?);
        }
        Ok(entries)
    }

    fn put_stock_entry(&self, entry: &StockEntry) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO stock_entries (
                id,
                tank_id,
                species_id,
                quantity,
                size_class,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                species_id = excluded.species_id,
                quantity = excluded.quantity,
                size_class = excluded.size_class,
                updated_at = excluded.updated_at;",
            params![
                entry.id.to_string(),
                entry.tank_id.to_string(),
                entry.species_id.as_str(),
                i64::from(entry.quantity),
                entry.size_class.map(SizeClass::as_str),
                to_epoch_ms(entry.created_at),
                to_epoch_ms(entry.updated_at),
            ],
        )?;
        Ok(())
    }

    fn delete_stock_entry(&self, id: StockEntryId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM stock_entries WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "stock entry",
                id,
            });
        }
        Ok(())
    }
}

impl CareTaskRepository for SqliteAquariumRepository<'_> {
    fn get_care_task(&self, id: CareTaskId) -> RepoResult<Option<CareTask>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_task_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_care_tasks(&self, tank_id: TankId) -> RepoResult<Vec<CareTask>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE tank_id = ?1;"))?;
        let mut rows = stmt.query([tank_id.to_string()])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        tasks.sort_by(|a, b| a.kind.cmp(&b.kind).then(a.id.cmp(&b.id)));
        Ok(tasks)
    }

    fn put_care_task(&self, task: &CareTask) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO care_tasks (
                id,
                tank_id,
                kind,
                title,
                description,
                interval_days,
                next_due_at,
                status,
                requires_measurement,
                measurements_json,
                channel,
                last_completed_at,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                interval_days = excluded.interval_days,
                next_due_at = excluded.next_due_at,
                status = excluded.status,
                requires_measurement = excluded.requires_measurement,
                measurements_json = excluded.measurements_json,
                channel = excluded.channel,
                last_completed_at = excluded.last_completed_at,
                updated_at = excluded.updated_at;",
            params![
                task.id.to_string(),
                task.tank_id.to_string(),
                task.kind.as_str(),
                task.title.as_str(),
                task.description.as_str(),
                i64::from(task.interval_days),
                to_epoch_ms(task.next_due_at),
                task.status.as_str(),
                bool_to_int(task.requires_measurement),
                to_json(&task.measurements)?,
                task.channel.as_str(),
                task.last_completed_at.map(to_epoch_ms),
                to_epoch_ms(task.created_at),
                to_epoch_ms(task.updated_at),
            ],
        )?;
        Ok(())
    }

    fn delete_care_task(&self, id: CareTaskId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM care_tasks WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "care task",
                id,
            });
        }
        Ok(())
    }
}

impl OwnerRepository for SqliteAquariumRepository<'_> {
    fn get_owner_profile(&self, owner_id: OwnerId) -> RepoResult<Option<OwnerProfile>> {
        let row = self
            .conn
            .query_row(
                "SELECT plan, channel, preferred_time, mute_feeding_reminders
                 FROM owner_profiles
                 WHERE owner_id = ?1;",
                [owner_id.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, i64>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((plan, channel, preferred_time, muted)) = row else {
            return Ok(None);
        };

        Ok(Some(OwnerProfile {
            owner_id,
            plan: parse_enum(&plan, "owner_profiles.plan", SubscriptionPlan::parse)?,
            notifications: NotificationSettings {
                channel: parse_enum(
                    &channel,
                    "owner_profiles.channel",
                    NotificationChannel::parse,
                )?,
                preferred_time: parse_enum(
                    &preferred_time,
                    "owner_profiles.preferred_time",
                    PreferredTime::parse,
                )?,
                mute_feeding_reminders: int_to_bool(
                    muted,
                    "owner_profiles.mute_feeding_reminders",
                )?,
            },
        }))
    }

    fn put_owner_profile(&self, profile: &OwnerProfile) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO owner_profiles (
                owner_id,
                plan,
                channel,
                preferred_time,
                mute_feeding_reminders
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(owner_id) DO UPDATE SET
                plan = excluded.plan,
                channel = excluded.channel,
                preferred_time = excluded.preferred_time,
                mute_feeding_reminders = excluded.mute_feeding_reminders;",
            params![
                profile.owner_id.to_string(),
                profile.plan.as_str(),
                profile.notifications.channel.as_str(),
                profile.notifications.preferred_time.as_str(),
                bool_to_int(profile.notifications.mute_feeding_reminders),
            ],
        )?;
        Ok(())
    }
}

impl UnitOfWork for SqliteAquariumRepository<'_> {
    fn atomically<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<RepoError>,
    {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)
            .map_err(RepoError::from)?;
        match work() {
            Ok(output) => {
                tx.commit().map_err(RepoError::from)?;
                Ok(output)
            }
            Err(err) => {
                // Dropping the transaction rolls it back.
                drop(tx);
                warn!("event=repo_transaction module=repo status=rolled_back");
                Err(err)
            }
        }
    }
}

fn parse_tank_row(row: &Row<'_>) -> RepoResult<Tank> {
    let status: String = row.get("status")?;
    let compatibility: String = row.get("compatibility_status")?;
    let warnings: String = row.get("warnings_json")?;
    let percentage: i64 = row.get("bio_load_percentage")?;

    Ok(Tank {
        id: parse_uuid(row, "id", "tanks.id")?,
        owner_id: parse_uuid(row, "owner_id", "tanks.owner_id")?,
        name: row.get("name")?,
        volume_liters: row.get("volume_liters")?,
        status: parse_enum(&status, "tanks.status", TankStatus::parse)?,
        bio_load_percentage: u32::try_from(percentage).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid percentage `{percentage}` in tanks.bio_load_percentage"
            ))
        })?,
        required_volume_liters: row.get("required_volume_liters")?,
        compatibility_status: parse_enum(
            &compatibility,
            "tanks.compatibility_status",
            CompatibilityStatus::parse,
        )?,
        warnings: from_json(&warnings, "tanks.warnings_json")?,
        last_calculated_at: row
            .get::<_, Option<i64>>("last_calculated_at")?
            .map(|ms| from_epoch_ms(ms, "tanks.last_calculated_at"))
            .transpose()?,
        created_at: from_epoch_ms(row.get("created_at")?, "tanks.created_at")?,
        updated_at: from_epoch_ms(row.get("updated_at")?, "tanks.updated_at")?,
    })
}

fn parse_stock_row(row: &Row<'_>) -> RepoResult<StockEntry> {
    let quantity: i64 = row.get("quantity")?;
    let size_class = match row.get::<_, Option<String>>("size_class")? {
        Some(value) => Some(parse_enum(
            &value,
            "stock_entries.size_class",
            SizeClass::parse,
        )?),
        None => None,
    };

    Ok(StockEntry {
        id: parse_uuid(row, "id", "stock_entries.id")?,
        tank_id: parse_uuid(row, "tank_id", "stock_entries.tank_id")?,
        species_id: row.get("species_id")?,
        quantity: u32::try_from(quantity)
            .ok()
            .filter(|value| *value > 0)
            .ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "invalid quantity `{quantity}` in stock_entries.quantity"
                ))
            })?,
        size_class,
        created_at: from_epoch_ms(row.get("created_at")?, "stock_entries.created_at")?,
        updated_at: from_epoch_ms(row.get("updated_at")?, "stock_entries.updated_at")?,
    })
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<CareTask> {
    let kind: String = row.get("kind")?;
    let status: String = row.get("status")?;
    let channel: String = row.get("channel")?;
    let measurements: String = row.get("measurements_json")?;
    let interval: i64 = row.get("interval_days")?;

    Ok(CareTask {
        id: parse_uuid(row, "id", "care_tasks.id")?,
        tank_id: parse_uuid(row, "tank_id", "care_tasks.tank_id")?,
        kind: parse_enum(&kind, "care_tasks.kind", CareTaskKind::parse)?,
        title: row.get("title")?,
        description: row.get("description")?,
        interval_days: u32::try_from(interval).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid interval `{interval}` in care_tasks.interval_days"
            ))
        })?,
        next_due_at: from_epoch_ms(row.get("next_due_at")?, "care_tasks.next_due_at")?,
        status: parse_enum(&status, "care_tasks.status", CareTaskStatus::parse)?,
        requires_measurement: int_to_bool(
            row.get("requires_measurement")?,
            "care_tasks.requires_measurement",
        )?,
        measurements: from_json(&measurements, "care_tasks.measurements_json")?,
        channel: parse_enum(&channel, "care_tasks.channel", NotificationChannel::parse)?,
        last_completed_at: row
            .get::<_, Option<i64>>("last_completed_at")?
            .map(|ms| from_epoch_ms(ms, "care_tasks.last_completed_at"))
            .transpose()?,
        created_at: from_epoch_ms(row.get("created_at")?, "care_tasks.created_at")?,
        updated_at: from_epoch_ms(row.get("updated_at")?, "care_tasks.updated_at")?,
    })
}

fn parse_uuid(row: &Row<'_>, column: &str, location: &str) -> RepoResult<Uuid> {
    let text: String = row.get(column)?;
    Uuid::parse_str(&text)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{text}` in {location}")))
}

fn parse_enum<T>(value: &str, location: &str, parse: fn(&str) -> Option<T>) -> RepoResult<T> {
    parse(value)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid value `{value}` in {location}")))
}

fn to_epoch_ms(value: DateTime<Utc>) -> i64 {
    value.timestamp_millis()
}

fn from_epoch_ms(value: i64, location: &str) -> RepoResult<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(value).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid timestamp `{value}` in {location}"))
    })
}

fn to_json<T: Serialize>(value: &T) -> RepoResult<String> {
    serde_json::to_string(value)
        .map_err(|err| RepoError::InvalidData(format!("failed to encode json column: {err}")))
}

fn from_json<T: DeserializeOwned>(value: &str, location: &str) -> RepoResult<T> {
    serde_json::from_str(value)
        .map_err(|err| RepoError::InvalidData(format!("invalid json in {location}: {err}")))
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn int_to_bool(value: i64, location: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {location}"
        ))),
    }
}
