//! Database seeding utilities.

use incidents::{ModelError, Role, auth};
use rand::Rng;
use thiserror::Error;
use tracing::{debug, error, info};

use super::SeedStore;
use crate::config::SeedConfig;
use crate::generators::{ReportAuthors, ReportGenConfig, ReportGenerator, UserGenConfig, UserGenerator};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),
    #[error("Invalid generated document: {0}")]
    Model(#[from] ModelError),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Stored document is missing its _id")]
    MissingId,
    #[error("Blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Result of the report seeding step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportSeeding {
    Inserted(usize),
    /// No citizen users existed, so nothing was inserted.
    SkippedNoCitizens,
}

/// Clears and fills the `users` and `reports` collections of a store.
pub struct Seeder<'a> {
    store: &'a dyn SeedStore,
    users: UserGenerator,
    reports: ReportGenerator,
    password: String,
    password_cost: u32,
}

impl<'a> Seeder<'a> {
    /// Creates a seeder writing to `store`, configured from `config`.
    pub fn new(store: &'a dyn SeedStore, config: &SeedConfig) -> Self {
        Self {
            store,
            users: UserGenerator::with_config(UserGenConfig {
                analyst_threshold: config.analyst_threshold,
                ..UserGenConfig::default()
            }),
            reports: ReportGenerator::with_config(ReportGenConfig {
                region: config.region,
                ..ReportGenConfig::default()
            }),
            password: config.default_password.clone(),
            password_cost: config.password_cost,
        }
    }

    /// Deletes every user, then every report.
    ///
    /// **WARNING**: no filter is applied; both collections end up empty.
    pub async fn clear_all(&self) -> Result<(), SeedError> {
        info!("Clearing existing data...");

        let users = self.store.clear_users().await?;
        let reports = self.store.clear_reports().await?;
        debug!("Removed {users} users and {reports} reports");

        info!("Data cleared");
        Ok(())
    }

    /// Generates `count` users sharing one password hash and inserts them in
    /// one batch. Returns the number inserted.
    pub async fn seed_users(&self, count: usize, rng: &mut impl Rng) -> Result<usize, SeedError> {
        let password = self.password.clone();
        let cost = self.password_cost;
        let password_hash =
            tokio::task::spawn_blocking(move || auth::hash_password(&password, cost)).await??;
        let users = self.users.generate_batch(count, &password_hash, rng)?;

        let inserted = if users.is_empty() {
            0
        } else {
            self.store.insert_users(&users).await?
        };

        info!("Seeded {inserted} users");
        Ok(inserted)
    }

    /// Generates `count` reports attributed to stored citizens (and, for
    /// verified reports, analysts) and inserts them in one batch.
    ///
    /// Without any citizen the step is skipped and nothing is written.
    pub async fn seed_reports(
        &self,
        count: usize,
        rng: &mut impl Rng,
    ) -> Result<ReportSeeding, SeedError> {
        let citizens = self.store.user_ids_with_role(Role::Citizen).await?;
        let analysts = self.store.user_ids_with_role(Role::Analyst).await?;

        let Some(authors) = ReportAuthors::new(&citizens, &analysts) else {
            error!("Cannot seed reports: no citizen users found");
            return Ok(ReportSeeding::SkippedNoCitizens);
        };
        debug!(
            "Attributing reports to {} citizens and {} analysts",
            citizens.len(),
            analysts.len()
        );

        let reports = self.reports.generate_batch(count, &authors, rng)?;
        let inserted = if reports.is_empty() {
            0
        } else {
            self.store.insert_reports(&reports).await?
        };

        info!("Seeded {inserted} reports");
        Ok(ReportSeeding::Inserted(inserted))
    }
}
