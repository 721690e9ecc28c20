//! Owner profile model: subscription plan and notification preferences.

use crate::model::tank::OwnerId;
use serde::{Deserialize, Serialize};

/// Delivery channel for care task reminders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    #[default]
    Push,
    Email,
    Off,
}

impl NotificationChannel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::Email => "email",
            Self::Off => "off",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "push" => Some(Self::Push),
            "email" => Some(Self::Email),
            "off" => Some(Self::Off),
            _ => None,
        }
    }
}

/// Preferred reminder slot, mapped to a fixed UTC hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferredTime {
    Morning,
    Evening,
    #[default]
    Any,
}

impl PreferredTime {
    /// UTC hour used when scheduling a freshly created task.
    pub fn utc_hour(self) -> u32 {
        match self {
            Self::Morning => 9,
            Self::Evening => 19,
            Self::Any => 12,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Evening => "evening",
            Self::Any => "any",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "morning" => Some(Self::Morning),
            "evening" => Some(Self::Evening),
            "any" => Some(Self::Any),
            _ => None,
        }
    }
}

/// Reminder preferences applied to every care task of an owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NotificationSettings {
    pub channel: NotificationChannel,
    pub preferred_time: PreferredTime,
    /// Forces feeding tasks to `NotificationChannel::Off`.
    pub mute_feeding_reminders: bool,
}

/// Subscription tier limiting how many tanks an owner may create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionPlan {
    #[default]
    Free,
    Hobbyist,
    Pro,
}

impl SubscriptionPlan {
    /// Maximum tank count, `None` meaning unlimited.
    pub fn tank_limit(self) -> Option<usize> {
        match self {
            Self::Free => Some(2),
            Self::Hobbyist => Some(10),
            Self::Pro => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Hobbyist => "hobbyist",
            Self::Pro => "pro",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "free" => Some(Self::Free),
            "hobbyist" => Some(Self::Hobbyist),
            "pro" => Some(Self::Pro),
            _ => None,
        }
    }
}

/// Per-owner settings record. Missing profiles resolve to `OwnerProfile::default_for`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerProfile {
    pub owner_id: OwnerId,
    pub plan: SubscriptionPlan,
    pub notifications: NotificationSettings,
}

impl OwnerProfile {
    /// Default profile: free plan, push reminders at any time, feeding unmuted.
    pub fn default_for(owner_id: OwnerId) -> Self {
        Self {
            owner_id,
            plan: SubscriptionPlan::default(),
            notifications: NotificationSettings::default(),
        }
    }
}
