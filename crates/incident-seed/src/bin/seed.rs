//! Resets the database and fills it with synthetic users and reports.
//!
//! Run with:
//! ```
//! DATABASE_URI=mongodb://localhost:27017/incidents cargo run -p incident-seed --bin seed
//! ```

use clap::Parser;
use std::path::Path;

use incident_seed::config::{ConfigOverrides, SeedConfig};
use incident_seed::db::MemoryStore;
use incident_seed::runner::SeedRun;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "seed", about = "Populate the incident database with fake users and reports")]
struct Args {
    /// Number of users to generate (overrides SEED_NUM_USERS)
    #[arg(long)]
    users: Option<usize>,

    /// Number of reports to generate (overrides SEED_NUM_REPORTS)
    #[arg(long)]
    reports: Option<usize>,

    /// Random seed for reproducible data (overrides SEED_RNG_SEED)
    #[arg(long)]
    seed: Option<u64>,

    /// MongoDB connection string (overrides DATABASE_URI)
    #[arg(long)]
    database_uri: Option<String>,

    /// Generate into memory instead of MongoDB and log the documents
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = SeedConfig::from_env_and_files(Path::new("."))?;
    config.apply_overrides(ConfigOverrides {
        user_count: args.users,
        report_count: args.reports,
        rng_seed: args.seed,
        database_uri: args.database_uri,
    });

    let run = SeedRun::new(config);

    let report = if args.dry_run {
        let store = MemoryStore::new();
        let report = run.run_in_memory(&store).await;
        for user in store.users() {
            debug!("user: {}", serde_json::to_string(&user)?);
        }
        for report in store.reports() {
            debug!("report: {}", serde_json::to_string(&report)?);
        }
        report
    } else {
        match run.run_mongo().await {
            Ok(report) => report,
            Err(e) => {
                error!("MongoDB connection error: {e}");
                std::process::exit(1);
            }
        }
    };

    // Summary output
    info!("Seed finished");
    info!("  Users: {}", report.users_inserted);
    info!("  Reports: {}", report.reports_inserted());
    if let Some(failure) = &report.failure {
        info!("  Failed while {}: {}", failure.phase, failure.message);
    }

    Ok(())
}
