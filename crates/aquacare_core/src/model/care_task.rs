//! Care task domain model.
//!
//! # Responsibility
//! - Define the ten recurring care-task kinds and task lifecycle state.
//! - Define measurement records carried by water-test tasks.
//!
//! # Invariants
//! - A tank holds at most one task per `CareTaskKind`.
//! - `id` and `created_at` never change once a task is materialized.
//! - `measurements` is empty unless `requires_measurement` is set.

use crate::model::owner::NotificationChannel;
use crate::model::tank::TankId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable care task identifier.
pub type CareTaskId = Uuid;

/// Fixed recurring care-task kinds.
///
/// Declaration order is the canonical listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CareTaskKind {
    Feeding,
    Observe,
    WaterChange,
    TestNo3,
    TestNo2,
    TestPh,
    TestGh,
    TestKh,
    TestTa,
    TestCl2,
}

impl CareTaskKind {
    /// All kinds in canonical order.
    pub const ALL: [CareTaskKind; 10] = [
        Self::Feeding,
        Self::Observe,
        Self::WaterChange,
        Self::TestNo3,
        Self::TestNo2,
        Self::TestPh,
        Self::TestGh,
        Self::TestKh,
        Self::TestTa,
        Self::TestCl2,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Feeding => "feeding",
            Self::Observe => "observe",
            Self::WaterChange => "water_change",
            Self::TestNo3 => "test_no3",
            Self::TestNo2 => "test_no2",
            Self::TestPh => "test_ph",
            Self::TestGh => "test_gh",
            Self::TestKh => "test_kh",
            Self::TestTa => "test_ta",
            Self::TestCl2 => "test_cl2",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }
}

/// Lifecycle state of a care task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CareTaskStatus {
    Active,
    Completed,
    Overdue,
}

impl CareTaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Overdue => "overdue",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            "overdue" => Some(Self::Overdue),
            _ => None,
        }
    }
}

/// Last recorded value of one water parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub parameter: String,
    pub value: f64,
}

/// Recurring care task materialized for one tank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareTask {
    pub id: CareTaskId,
    pub tank_id: TankId,
    #[serde(rename = "type")]
    pub kind: CareTaskKind,
    pub title: String,
    pub description: String,
    pub interval_days: u32,
    pub next_due_at: DateTime<Utc>,
    pub status: CareTaskStatus,
    pub requires_measurement: bool,
    pub measurements: Vec<Measurement>,
    pub channel: NotificationChannel,
    pub last_completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CareTask {
    /// Returns the stored value of `parameter`, if tracked by this task.
    pub fn measurement(&self, parameter: &str) -> Option<f64> {
        self.measurements
            .iter()
            .find(|measurement| measurement.parameter == parameter)
            .map(|measurement| measurement.value)
    }
}
