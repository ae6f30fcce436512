//! Sequencing of a full seeding run.
//!
//! A run moves through [`Phase`]s in a fixed order. Failures after the
//! connection is established are logged and recorded in the [`RunReport`];
//! the store is disconnected whether or not seeding succeeded.

use std::fmt;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, error, info};

use crate::config::SeedConfig;
use crate::db::{MemoryStore, MongoStore, ReportSeeding, SeedError, SeedStore, Seeder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Connecting,
    Resetting,
    SeedingUsers,
    SeedingReports,
    Disconnecting,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Connecting => "connecting",
            Phase::Resetting => "resetting",
            Phase::SeedingUsers => "seeding users",
            Phase::SeedingReports => "seeding reports",
            Phase::Disconnecting => "disconnecting",
            Phase::Done => "done",
        };
        f.write_str(name)
    }
}

/// An error caught inside the guarded part of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFailure {
    pub phase: Phase,
    pub message: String,
}

/// Outcome of a run that got as far as connecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub users_inserted: usize,
    /// `None` when the run failed before reaching the report step.
    pub reports: Option<ReportSeeding>,
    pub failure: Option<RunFailure>,
    /// Name of the store the run wrote to.
    pub backend: &'static str,
    pub disconnected: bool,
}

impl RunReport {
    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }

    pub fn reports_inserted(&self) -> usize {
        match self.reports {
            Some(ReportSeeding::Inserted(count)) => count,
            _ => 0,
        }
    }
}

/// Drives one seeding run from an explicit configuration.
pub struct SeedRun {
    config: SeedConfig,
}

impl SeedRun {
    pub fn new(config: SeedConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SeedConfig {
        &self.config
    }

    /// Connects to MongoDB and runs every step.
    ///
    /// Only a connection failure is returned as an error; nothing has been
    /// modified in that case.
    pub async fn run_mongo(&self) -> Result<RunReport, SeedError> {
        info!("Starting database seeding process...");
        enter(Phase::Connecting);
        let store = MongoStore::connect(&self.config).await?;
        Ok(self.execute(&store).await)
    }

    /// Runs every step against an in-memory store.
    pub async fn run_in_memory(&self, store: &MemoryStore) -> RunReport {
        info!("Starting database seeding process (dry run)...");
        enter(Phase::Connecting);
        self.execute(store).await
    }

    /// Resets and seeds an already connected store, then disconnects it.
    pub async fn execute(&self, store: &dyn SeedStore) -> RunReport {
        let mut rng = match self.config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut report = RunReport {
            users_inserted: 0,
            reports: None,
            failure: None,
            backend: store.backend(),
            disconnected: false,
        };

        match self.seed(store, &mut rng, &mut report).await {
            Ok(()) => info!("Database seeding completed successfully"),
            Err((phase, e)) => {
                error!("An error occurred during seeding ({phase}): {e}");
                report.failure = Some(RunFailure {
                    phase,
                    message: e.to_string(),
                });
            }
        }

        enter(Phase::Disconnecting);
        store.disconnect().await;
        report.disconnected = true;
        info!("{} disconnected", report.backend);

        enter(Phase::Done);
        report
    }

    async fn seed(
        &self,
        store: &dyn SeedStore,
        rng: &mut StdRng,
        report: &mut RunReport,
    ) -> Result<(), (Phase, SeedError)> {
        let seeder = Seeder::new(store, &self.config);

        enter(Phase::Resetting);
        seeder
            .clear_all()
            .await
            .map_err(|e| (Phase::Resetting, e))?;

        enter(Phase::SeedingUsers);
        report.users_inserted = seeder
            .seed_users(self.config.user_count, rng)
            .await
            .map_err(|e| (Phase::SeedingUsers, e))?;

        enter(Phase::SeedingReports);
        report.reports = Some(
            seeder
                .seed_reports(self.config.report_count, rng)
                .await
                .map_err(|e| (Phase::SeedingReports, e))?,
        );

        Ok(())
    }
}

fn enter(phase: Phase) {
    debug!("Entering phase: {phase}");
}
