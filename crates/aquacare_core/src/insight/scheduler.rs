//! Care task scheduler.
//!
//! # Responsibility
//! - Merge the template registry, interval matrix, existing task records and
//!   owner notification settings into the authoritative task list.
//! - Advance completed tasks and flag overdue ones.
//! - Apply user completions.
//!
//! # Invariants
//! - Output holds exactly one task per `CareTaskKind`, in canonical order.
//! - Existing tasks keep `id`, `created_at`, `next_due_at` and measurement
//!   history; only template text, interval and channel are refreshed.
//! - `now` is supplied by the caller; nothing here reads the wall clock.

use crate::insight::templates::{interval_days, TaskTemplate, TASK_TEMPLATES};
use crate::model::care_task::{CareTask, CareTaskKind, CareTaskStatus, Measurement};
use crate::model::owner::{NotificationChannel, NotificationSettings};
use crate::model::tank::{TankId, TankStatus};
use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

/// Produces the refreshed task list of one stocked tank.
///
/// Duplicate records of one kind in `existing` keep the first occurrence;
/// the rest are left out of the result.
pub fn schedule_care_tasks(
    tank_id: TankId,
    status: TankStatus,
    existing: Vec<CareTask>,
    settings: &NotificationSettings,
    now: DateTime<Utc>,
) -> Vec<CareTask> {
    let mut by_kind: BTreeMap<CareTaskKind, CareTask> = BTreeMap::new();
    for task in existing {
        by_kind.entry(task.kind).or_insert(task);
    }

    TASK_TEMPLATES
        .iter()
        .map(|template| {
            let interval = interval_days(status, template.kind);
            let channel = channel_for(template.kind, settings);
            let mut task = match by_kind.remove(&template.kind) {
                Some(mut task) => {
                    refresh_task(&mut task, template, interval, channel, now);
                    task
                }
                None => new_task(tank_id, template, interval, channel, settings, now),
            };
            if apply_status_transition(&mut task, now) {
                task.updated_at = now;
            }
            task
        })
        .collect()
}

/// Channel a task of `kind` is delivered on.
pub fn channel_for(kind: CareTaskKind, settings: &NotificationSettings) -> NotificationChannel {
    if kind == CareTaskKind::Feeding && settings.mute_feeding_reminders {
        NotificationChannel::Off
    } else {
        settings.channel
    }
}

/// Applies the time-based status rules to one task.
///
/// Returns whether the task changed.
pub fn apply_status_transition(task: &mut CareTask, now: DateTime<Utc>) -> bool {
    match task.status {
        CareTaskStatus::Completed => {
            let elapsed_days = (now.date_naive() - task.next_due_at.date_naive()).num_days();
            if elapsed_days >= i64::from(task.interval_days) {
                task.next_due_at = task.next_due_at + Duration::days(i64::from(task.interval_days));
                task.status = CareTaskStatus::Active;
                true
            } else {
                false
            }
        }
        CareTaskStatus::Active if now > task.next_due_at => {
            task.status = CareTaskStatus::Overdue;
            true
        }
        CareTaskStatus::Overdue if now <= task.next_due_at => {
            task.status = CareTaskStatus::Active;
            true
        }
        CareTaskStatus::Active | CareTaskStatus::Overdue => false,
    }
}

/// Marks `task` completed at `now`.
///
/// For measurement tasks each tracked parameter takes the supplied value
/// when present and keeps its previous value otherwise. Parameters the task
/// does not track are ignored.
pub fn complete_care_task(
    task: &mut CareTask,
    measurements: &HashMap<String, f64>,
    now: DateTime<Utc>,
) {
    task.status = CareTaskStatus::Completed;
    task.last_completed_at = Some(now);
    task.next_due_at = now + Duration::days(i64::from(task.interval_days));
    task.updated_at = now;

    if task.requires_measurement {
        for measurement in &mut task.measurements {
            if let Some(value) = measurements.get(&measurement.parameter) {
                measurement.value = *value;
            }
        }
    }
}

fn refresh_task(
    task: &mut CareTask,
    template: &TaskTemplate,
    interval: u32,
    channel: NotificationChannel,
    now: DateTime<Utc>,
) {
    let before = task.clone();

    task.title = template.title.to_string();
    task.description = template.description.to_string();
    task.interval_days = interval;
    task.channel = channel;
    task.requires_measurement = template.requires_measurement();
    if let Some(parameter) = template.measurement_parameter {
        if task.measurement(parameter).is_none() {
            task.measurements.push(placeholder(parameter));
        }
    }

    if *task != before {
        task.updated_at = now;
    }
}

fn new_task(
    tank_id: TankId,
    template: &TaskTemplate,
    interval: u32,
    channel: NotificationChannel,
    settings: &NotificationSettings,
    now: DateTime<Utc>,
) -> CareTask {
    CareTask {
        id: Uuid::new_v4(),
        tank_id,
        kind: template.kind,
        title: template.title.to_string(),
        description: template.description.to_string(),
        interval_days: interval,
        next_due_at: initial_due_at(template.kind, settings, now),
        status: CareTaskStatus::Active,
        requires_measurement: template.requires_measurement(),
        measurements: template
            .measurement_parameter
            .map(placeholder)
            .into_iter()
            .collect(),
        channel,
        last_completed_at: None,
        created_at: now,
        updated_at: now,
    }
}

/// Daily kinds are due right away; everything else tomorrow at the
/// owner's preferred UTC hour.
fn initial_due_at(
    kind: CareTaskKind,
    settings: &NotificationSettings,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    match kind {
        CareTaskKind::Feeding | CareTaskKind::Observe => now,
        _ => {
            let tomorrow = now + Duration::days(1);
            tomorrow
                .date_naive()
                .and_hms_opt(settings.preferred_time.utc_hour(), 0, 0)
                .map(|naive| naive.and_utc())
                .unwrap_or(tomorrow)
        }
    }
}

fn placeholder(parameter: &str) -> Measurement {
    Measurement {
        parameter: parameter.to_string(),
        value: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::{apply_status_transition, complete_care_task, schedule_care_tasks};
    use crate::model::care_task::{CareTaskKind, CareTaskStatus};
    use crate::model::owner::{NotificationChannel, NotificationSettings, PreferredTime};
    use crate::model::tank::TankStatus;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::collections::HashMap;
    use uuid::Uuid;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn settings() -> NotificationSettings {
        NotificationSettings {
            channel: NotificationChannel::Email,
            preferred_time: PreferredTime::Morning,
            mute_feeding_reminders: false,
        }
    }

    #[test]
    fn fresh_schedule_materializes_all_kinds_in_order() {
        let now = at(2026, 3, 10, 15);
        let tasks = schedule_care_tasks(
            Uuid::new_v4(),
            TankStatus::Comfort,
            Vec::new(),
            &settings(),
            now,
        );

        let kinds: Vec<CareTaskKind> = tasks.iter().map(|task| task.kind).collect();
        assert_eq!(kinds, CareTaskKind::ALL.to_vec());
        assert!(tasks.iter().all(|task| task.status == CareTaskStatus::Active));
        assert!(tasks.iter().all(|task| task.channel == NotificationChannel::Email));
    }

    #[test]
    fn fresh_daily_tasks_are_due_now_and_others_tomorrow_at_preferred_hour() {
        let now = at(2026, 3, 10, 15);
        let tasks = schedule_care_tasks(
            Uuid::new_v4(),
            TankStatus::Comfort,
            Vec::new(),
            &settings(),
            now,
        );

        for task in &tasks {
            match task.kind {
                CareTaskKind::Feeding | CareTaskKind::Observe => {
                    assert_eq!(task.next_due_at, now)
                }
                _ => assert_eq!(task.next_due_at, at(2026, 3, 11, 9)),
            }
        }
    }

    #[test]
    fn evening_and_any_preferences_map_to_fixed_hours() {
        let now = at(2026, 3, 10, 8);
        let mut prefs = settings();
        prefs.preferred_time = PreferredTime::Evening;
        let evening = schedule_care_tasks(Uuid::new_v4(), TankStatus::Comfort, Vec::new(), &prefs, now);
        assert_eq!(evening[2].next_due_at, at(2026, 3, 11, 19));

        prefs.preferred_time = PreferredTime::Any;
        let any = schedule_care_tasks(Uuid::new_v4(), TankStatus::Comfort, Vec::new(), &prefs, now);
        assert_eq!(any[2].next_due_at, at(2026, 3, 11, 12));
    }

    #[test]
    fn measurement_tasks_get_zero_placeholders() {
        let tasks = schedule_care_tasks(
            Uuid::new_v4(),
            TankStatus::Comfort,
            Vec::new(),
            &settings(),
            at(2026, 3, 10, 15),
        );
        let ph = tasks.iter().find(|t| t.kind == CareTaskKind::TestPh).unwrap();
        assert!(ph.requires_measurement);
        assert_eq!(ph.measurement("pH"), Some(0.0));

        let feeding = tasks.iter().find(|t| t.kind == CareTaskKind::Feeding).unwrap();
        assert!(!feeding.requires_measurement);
        assert!(feeding.measurements.is_empty());
    }

    #[test]
    fn muted_feeding_reminders_force_feeding_channel_off_only() {
        let mut prefs = settings();
        prefs.mute_feeding_reminders = true;
        let tasks = schedule_care_tasks(
            Uuid::new_v4(),
            TankStatus::Comfort,
            Vec::new(),
            &prefs,
            at(2026, 3, 10, 15),
        );
        for task in tasks {
            if task.kind == CareTaskKind::Feeding {
                assert_eq!(task.channel, NotificationChannel::Off);
            } else {
                assert_eq!(task.channel, NotificationChannel::Email);
            }
        }
    }

    #[test]
    fn rescheduling_preserves_identity_and_updates_interval() {
        let tank_id = Uuid::new_v4();
        let now = at(2026, 3, 10, 15);
        let first = schedule_care_tasks(tank_id, TankStatus::Comfort, Vec::new(), &settings(), now);
        let ids: Vec<Uuid> = first.iter().map(|t| t.id).collect();

        let second = schedule_care_tasks(tank_id, TankStatus::Critical, first, &settings(), now);
        assert_eq!(second.iter().map(|t| t.id).collect::<Vec<_>>(), ids);
        let water = second
            .iter()
            .find(|t| t.kind == CareTaskKind::WaterChange)
            .unwrap();
        assert_eq!(water.interval_days, 3);
        assert_eq!(water.created_at, now);
    }

    #[test]
    fn duplicate_existing_kinds_keep_the_first_record() {
        let tank_id = Uuid::new_v4();
        let now = at(2026, 3, 10, 15);
        let first = schedule_care_tasks(tank_id, TankStatus::Comfort, Vec::new(), &settings(), now);
        let mut duplicate = first[0].clone();
        duplicate.id = Uuid::new_v4();
        let kept_id = first[0].id;

        let mut existing = first;
        existing.push(duplicate);
        let merged = schedule_care_tasks(tank_id, TankStatus::Comfort, existing, &settings(), now);
        assert_eq!(merged.len(), 10);
        assert_eq!(merged[0].id, kept_id);
    }

    #[test]
    fn completed_task_rolls_forward_from_prior_due_date() {
        let tank_id = Uuid::new_v4();
        let created = at(2026, 3, 1, 12);
        let mut tasks = schedule_care_tasks(tank_id, TankStatus::Comfort, Vec::new(), &settings(), created);
        let water = tasks
            .iter_mut()
            .find(|t| t.kind == CareTaskKind::WaterChange)
            .unwrap();
        water.status = CareTaskStatus::Completed;
        water.next_due_at = at(2026, 3, 2, 9);

        // 14 calendar days after the due date.
        let now = at(2026, 3, 16, 8);
        assert!(apply_status_transition(water, now));
        assert_eq!(water.status, CareTaskStatus::Active);
        assert_eq!(water.next_due_at, at(2026, 3, 16, 9));
    }

    #[test]
    fn completed_task_within_interval_stays_completed() {
        let mut tasks = schedule_care_tasks(
            Uuid::new_v4(),
            TankStatus::Comfort,
            Vec::new(),
            &settings(),
            at(2026, 3, 1, 12),
        );
        let water = &mut tasks[2];
        water.status = CareTaskStatus::Completed;
        water.next_due_at = at(2026, 3, 2, 9);

        assert!(!apply_status_transition(water, at(2026, 3, 15, 23)));
        assert_eq!(water.status, CareTaskStatus::Completed);
        assert_eq!(water.next_due_at, at(2026, 3, 2, 9));
    }

    #[test]
    fn active_task_past_due_becomes_overdue_and_recovers_when_due_moves_out() {
        let mut tasks = schedule_care_tasks(
            Uuid::new_v4(),
            TankStatus::Comfort,
            Vec::new(),
            &settings(),
            at(2026, 3, 1, 12),
        );
        let task = &mut tasks[3];
        assert!(apply_status_transition(task, at(2026, 3, 2, 10)));
        assert_eq!(task.status, CareTaskStatus::Overdue);
        assert!(!apply_status_transition(task, at(2026, 3, 3, 10)));

        task.next_due_at = at(2026, 3, 5, 9);
        assert!(apply_status_transition(task, at(2026, 3, 3, 10)));
        assert_eq!(task.status, CareTaskStatus::Active);
    }

    #[test]
    fn interval_change_alone_does_not_clear_overdue() {
        let tank_id = Uuid::new_v4();
        let start = at(2026, 3, 1, 12);
        let tasks = schedule_care_tasks(tank_id, TankStatus::Critical, Vec::new(), &settings(), start);

        let later = at(2026, 3, 4, 12);
        let overdue = schedule_care_tasks(tank_id, TankStatus::Critical, tasks, &settings(), later);
        let water_due = overdue[2].next_due_at;
        assert_eq!(overdue[2].status, CareTaskStatus::Overdue);

        let improved = schedule_care_tasks(tank_id, TankStatus::Comfort, overdue, &settings(), later);
        assert_eq!(improved[2].interval_days, 14);
        assert_eq!(improved[2].next_due_at, water_due);
        assert_eq!(improved[2].status, CareTaskStatus::Overdue);
    }

    #[test]
    fn completion_records_measurements_and_reschedules_from_now() {
        let mut tasks = schedule_care_tasks(
            Uuid::new_v4(),
            TankStatus::Comfort,
            Vec::new(),
            &settings(),
            at(2026, 3, 1, 12),
        );
        let ph = tasks
            .iter_mut()
            .find(|t| t.kind == CareTaskKind::TestPh)
            .unwrap();
        let done_at = at(2026, 3, 3, 18);
        let values = HashMap::from([("pH".to_string(), 7.2), ("GH".to_string(), 9.0)]);

        complete_care_task(ph, &values, done_at);
        assert_eq!(ph.status, CareTaskStatus::Completed);
        assert_eq!(ph.last_completed_at, Some(done_at));
        assert_eq!(ph.next_due_at, done_at + Duration::days(7));
        assert_eq!(ph.measurement("pH"), Some(7.2));
        assert_eq!(ph.measurement("GH"), None);

        complete_care_task(ph, &HashMap::new(), at(2026, 3, 10, 18));
        assert_eq!(ph.measurement("pH"), Some(7.2));
    }
}
