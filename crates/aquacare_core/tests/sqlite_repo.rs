use aquacare_core::db::open_db_in_memory;
use aquacare_core::repo::{
    CareTaskRepository, OwnerRepository, StockRepository, TankRepository, UnitOfWork,
};
use aquacare_core::{
    CareTask, CareTaskKind, CareTaskStatus, CompatibilityStatus, CompatibilityWarning,
    Measurement, NotificationChannel, NotificationSettings, OwnerProfile, PreferredTime,
    RepoError, SizeClass, SqliteAquariumRepository, StockEntry, SubscriptionPlan, Tank,
    TankStatus,
};
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::Connection;
use uuid::Uuid;

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
}

fn task(tank: &Tank, kind: CareTaskKind, now: DateTime<Utc>) -> CareTask {
    CareTask {
        id: Uuid::new_v4(),
        tank_id: tank.id,
        kind,
        title: "Test pH".to_string(),
        description: "Measure pH".to_string(),
        interval_days: 7,
        next_due_at: now,
        status: CareTaskStatus::Active,
        requires_measurement: true,
        measurements: vec![Measurement {
            parameter: "pH".to_string(),
            value: 7.2,
        }],
        channel: NotificationChannel::Email,
        last_completed_at: None,
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn try_new_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    match SqliteAquariumRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection { actual_version, .. }) => {
            assert_eq!(actual_version, 0)
        }
        other => panic!("unexpected result: {:?}", other.err()),
    }
}

#[test]
fn tank_roundtrip_keeps_derived_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAquariumRepository::try_new(&conn).unwrap();

    let mut tank = Tank::new(Uuid::new_v4(), "Reef corner", 54.5, at(1, 9));
    tank.status = TankStatus::Elevated;
    tank.bio_load_percentage = 73;
    tank.required_volume_liters = 39.8;
    tank.compatibility_status = CompatibilityStatus::Warn;
    tank.warnings = vec![CompatibilityWarning {
        species_a: "betta".to_string(),
        species_b: "guppy".to_string(),
        message: "Betta and Guppy may clash; watch for stress or nipping".to_string(),
    }];
    tank.last_calculated_at = Some(at(1, 9));
    repo.put_tank(&tank).unwrap();

    assert_eq!(repo.get_tank(tank.id).unwrap(), Some(tank.clone()));
    assert_eq!(repo.list_tanks(tank.owner_id).unwrap(), vec![tank]);
    assert!(repo.get_tank(Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn tanks_list_by_owner_in_creation_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAquariumRepository::try_new(&conn).unwrap();
    let owner = Uuid::new_v4();

    let later = Tank::new(owner, "Second", 60.0, at(2, 9));
    let earlier = Tank::new(owner, "First", 60.0, at(1, 9));
    let foreign = Tank::new(Uuid::new_v4(), "Other", 60.0, at(1, 8));
    for tank in [&later, &earlier, &foreign] {
        repo.put_tank(tank).unwrap();
    }

    let names: Vec<String> = repo
        .list_tanks(owner)
        .unwrap()
        .into_iter()
        .map(|tank| tank.name)
        .collect();
    assert_eq!(names, vec!["First", "Second"]);
}

#[test]
fn stock_is_unique_per_species_and_upserts_by_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAquariumRepository::try_new(&conn).unwrap();
    let tank = Tank::new(Uuid::new_v4(), "Community", 100.0, at(1, 9));
    repo.put_tank(&tank).unwrap();

    let mut entry = StockEntry::new(tank.id, "guppy", 3, Some(SizeClass::Adult), at(1, 9));
    repo.put_stock_entry(&entry).unwrap();
    entry.quantity = 5;
    repo.put_stock_entry(&entry).unwrap();
    assert_eq!(repo.get_stock_entry(entry.id).unwrap(), Some(entry.clone()));

    let duplicate = StockEntry::new(tank.id, "guppy", 1, None, at(1, 10));
    assert!(repo.put_stock_entry(&duplicate).is_err());
    assert_eq!(repo.list_stock(tank.id).unwrap().len(), 1);
}

#[test]
fn task_roundtrip_keeps_measurements_and_channel() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAquariumRepository::try_new(&conn).unwrap();
    let tank = Tank::new(Uuid::new_v4(), "Community", 100.0, at(1, 9));
    repo.put_tank(&tank).unwrap();

    let mut stored = task(&tank, CareTaskKind::TestPh, at(2, 12));
    stored.last_completed_at = Some(at(1, 12));
    repo.put_care_task(&stored).unwrap();

    let loaded = repo.get_care_task(stored.id).unwrap().unwrap();
    assert_eq!(loaded, stored);
    assert_eq!(loaded.measurement("pH"), Some(7.2));
}

#[test]
fn tasks_list_in_canonical_kind_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAquariumRepository::try_new(&conn).unwrap();
    let tank = Tank::new(Uuid::new_v4(), "Community", 100.0, at(1, 9));
    repo.put_tank(&tank).unwrap();

    for kind in [CareTaskKind::TestCl2, CareTaskKind::Feeding, CareTaskKind::TestPh] {
        repo.put_care_task(&task(&tank, kind, at(1, 9))).unwrap();
    }

    let kinds: Vec<CareTaskKind> = repo
        .list_care_tasks(tank.id)
        .unwrap()
        .into_iter()
        .map(|task| task.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            CareTaskKind::Feeding,
            CareTaskKind::TestPh,
            CareTaskKind::TestCl2
        ]
    );
}

#[test]
fn deleting_tank_cascades_and_missing_delete_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAquariumRepository::try_new(&conn).unwrap();
    let tank = Tank::new(Uuid::new_v4(), "Community", 100.0, at(1, 9));
    repo.put_tank(&tank).unwrap();
    let entry = StockEntry::new(tank.id, "guppy", 3, None, at(1, 9));
    repo.put_stock_entry(&entry).unwrap();
    let feeding = task(&tank, CareTaskKind::Feeding, at(1, 9));
    repo.put_care_task(&feeding).unwrap();

    repo.delete_tank(tank.id).unwrap();

    assert!(repo.get_stock_entry(entry.id).unwrap().is_none());
    assert!(repo.get_care_task(feeding.id).unwrap().is_none());
    assert!(matches!(
        repo.delete_tank(tank.id),
        Err(RepoError::NotFound { entity: "tank", .. })
    ));
    assert!(matches!(
        repo.delete_care_task(feeding.id),
        Err(RepoError::NotFound { .. })
    ));
}

#[test]
fn owner_profile_upserts() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAquariumRepository::try_new(&conn).unwrap();
    let owner = Uuid::new_v4();
    assert!(repo.get_owner_profile(owner).unwrap().is_none());

    let mut profile = OwnerProfile::default_for(owner);
    repo.put_owner_profile(&profile).unwrap();
    profile.plan = SubscriptionPlan::Pro;
    profile.notifications = NotificationSettings {
        channel: NotificationChannel::Email,
        preferred_time: PreferredTime::Evening,
        mute_feeding_reminders: true,
    };
    repo.put_owner_profile(&profile).unwrap();

    assert_eq!(repo.get_owner_profile(owner).unwrap(), Some(profile));
}

#[test]
fn unknown_persisted_kind_is_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAquariumRepository::try_new(&conn).unwrap();
    let tank = Tank::new(Uuid::new_v4(), "Community", 100.0, at(1, 9));
    repo.put_tank(&tank).unwrap();
    let stored = task(&tank, CareTaskKind::Observe, at(1, 9));
    repo.put_care_task(&stored).unwrap();

    conn.execute(
        "UPDATE care_tasks SET kind = 'test_o2' WHERE id = ?1;",
        [stored.id.to_string()],
    )
    .unwrap();

    assert!(matches!(
        repo.get_care_task(stored.id),
        Err(RepoError::InvalidData(_))
    ));
}

#[test]
fn atomically_rolls_back_every_write_of_a_failed_unit() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAquariumRepository::try_new(&conn).unwrap();
    let tank = Tank::new(Uuid::new_v4(), "Community", 100.0, at(1, 9));
    let entry = StockEntry::new(tank.id, "guppy", 3, None, at(1, 9));

    let result: Result<(), RepoError> = repo.atomically(|| {
        repo.put_tank(&tank)?;
        repo.put_stock_entry(&entry)?;
        Err(RepoError::InvalidData("abort".to_string()))
    });
    assert!(matches!(result, Err(RepoError::InvalidData(_))));
    assert!(repo.get_tank(tank.id).unwrap().is_none());
    assert!(repo.get_stock_entry(entry.id).unwrap().is_none());

    let stored = repo
        .atomically(|| -> Result<usize, RepoError> {
            repo.put_tank(&tank)?;
            repo.put_stock_entry(&entry)?;
            Ok(repo.list_stock(tank.id)?.len())
        })
        .unwrap();
    assert_eq!(stored, 1);
    assert_eq!(repo.get_tank(tank.id).unwrap(), Some(tank));
}
