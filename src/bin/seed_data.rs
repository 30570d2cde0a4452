//! Seed data script - populates the database with reproducible demo data
//!
//! Run with: cargo run --bin seed-data -- --days 90 --seed 42
//!
//! This creates:
//! - 2 mining sites and 4 departments
//! - chemical and explosives inventory, a small machinery fleet
//! - one energy, production and environmental row per day
//! - per-shift labor rows, usage, maintenance, status changes and incidents

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::Parser;
use tracing::info;

use mymine_api::{
    analytics::period::parse_date,
    db::{self, DbConfig},
    logging::init_tracing,
    seed::SeedGenerator,
};

#[derive(Parser, Debug)]
#[command(name = "seed-data", about = "Populate the MyMine database with demo data")]
struct Args {
    /// Number of days of history to generate
    #[arg(long, default_value_t = 90)]
    days: u32,

    /// RNG seed; the same seed always yields the same rows
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Last day to generate (YYYY-MM-DD), defaults to today
    #[arg(long)]
    end_date: Option<String>,

    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://mymine.db?mode=rwc")]
    database_url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("info", false);
    let args = Args::parse();

    let end: NaiveDate = match args.end_date.as_deref() {
        Some(raw) => parse_date("end_date", raw)?,
        None => Utc::now().date_naive(),
    };

    info!("=== MyMine Seed Data ===");
    info!(days = args.days, seed = args.seed, %end, "Generating plan");
    let plan = SeedGenerator::from_seed(args.seed).plan(end, args.days);
    info!("  Planned {} fact rows", plan.fact_rows());

    info!("Connecting to database: {}", args.database_url);
    let pool = db::establish_connection_with_config(&DbConfig {
        url: args.database_url.clone(),
        max_connections: 5,
        ..Default::default()
    })
    .await
    .context("failed to connect to the database")?;
    db::run_migrations(&pool).await.context("failed running migrations")?;

    let written = plan.insert(&pool).await.context("failed writing seed rows")?;
    info!("Done: {} fact rows written", written);
    Ok(())
}
