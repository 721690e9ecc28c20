//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `aquacare_core` linkage with deterministic ping/version output.
//! - With a database path argument, stock a demo tank and print the derived
//!   insight.
//!
//! Environment:
//! - `AQUACARE_LOG_DIR`: absolute directory; enables file logging when set.
//! - `AQUACARE_LOG_LEVEL`: log level, defaults per build mode.

use aquacare_core::db::open_db;
use aquacare_core::{
    AddFish, AquariumService, NewTank, SqliteAquariumRepository, StaticSpeciesCatalog, TankInsight,
};
use std::error::Error;
use std::process::ExitCode;
use uuid::Uuid;

const DEMO_STOCK: &[(&str, i64)] = &[
    ("neon_tetra", 10),
    ("corydoras_paleatus", 6),
    ("tiger_barb", 5),
];

fn main() -> ExitCode {
    println!("aquacare_core ping={}", aquacare_core::ping());
    println!("aquacare_core version={}", aquacare_core::core_version());

    if let Ok(log_dir) = std::env::var("AQUACARE_LOG_DIR") {
        let level = std::env::var("AQUACARE_LOG_LEVEL")
            .unwrap_or_else(|_| aquacare_core::default_log_level().to_string());
        if let Err(err) = aquacare_core::init_logging(&level, &log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    let Some(db_path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    match run_demo(&db_path) {
        Ok(insight) => {
            print_insight(&insight);
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("event=cli_demo module=cli status=error error={err}");
            eprintln!("demo failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_demo(db_path: &str) -> Result<TankInsight, Box<dyn Error>> {
    let conn = open_db(db_path)?;
    let repo = SqliteAquariumRepository::try_new(&conn)?;
    let service = AquariumService::new(repo, StaticSpeciesCatalog::builtin());

    let owner_id = Uuid::new_v4();
    let tank = service.create_tank(
        owner_id,
        &NewTank {
            name: "Demo community".to_string(),
            volume_liters: 120.0,
        },
    )?;

    let mut insight = tank;
    for (species_id, quantity) in DEMO_STOCK {
        insight = service.add_fish(
            owner_id,
            insight.tank.id,
            &AddFish {
                species_id: (*species_id).to_string(),
                quantity: *quantity,
                size_class: None,
            },
        )?;
    }
    log::info!(
        "event=cli_demo module=cli status=ok tank_id={} stock_entries={}",
        insight.tank.id,
        insight.stock.len()
    );
    Ok(insight)
}

fn print_insight(insight: &TankInsight) {
    let tank = &insight.tank;
    println!(
        "tank id={} volume_liters={} status={} bio_load={}% required_liters={}",
        tank.id,
        tank.volume_liters,
        tank.status.as_str(),
        tank.bio_load_percentage,
        tank.required_volume_liters
    );
    println!(
        "compatibility={} warnings={}",
        tank.compatibility_status.as_str(),
        tank.warnings.len()
    );
    for warning in &tank.warnings {
        println!("  warn {}", warning.message);
    }
    for entry in &insight.stock {
        println!("stock species={} quantity={}", entry.species_id, entry.quantity);
    }
    for task in &insight.care_tasks {
        println!(
            "task kind={} every={}d next_due={} status={} channel={}",
            task.kind.as_str(),
            task.interval_days,
            task.next_due_at.to_rfc3339(),
            task.status.as_str(),
            task.channel.as_str()
        );
    }
}
