//! Configuration types for seeding.

use std::collections::HashMap;
use std::env;
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::db::SeedError;

pub use incidents::BoundingBox;

/// Pre-defined geographic regions for report locations.
#[derive(Debug, Clone, Copy)]
pub struct Region;

impl Region {
    /// Chennai and the surrounding coast, where the app is piloted.
    pub const SERVICE_AREA: BoundingBox = incidents::models::SERVICE_AREA;
}

pub const DEFAULT_USER_COUNT: usize = 1;
pub const DEFAULT_REPORT_COUNT: usize = 5;
pub const DEFAULT_ANALYST_THRESHOLD: usize = 5;
pub const DEFAULT_PASSWORD: &str = "password123";
/// Database used when the URI names none, matching the driver's usual fallback.
pub const DEFAULT_DATABASE_NAME: &str = "test";

/// Configuration for a seeding run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    /// MongoDB connection string. Only required for the MongoDB backend.
    pub database_uri: Option<String>,

    /// Database to use when the URI does not name one.
    pub database_name: String,

    /// Number of users to generate.
    pub user_count: usize,

    /// Number of reports to generate.
    pub report_count: usize,

    /// Users generated at an index below this become Analysts, the rest Citizens.
    pub analyst_threshold: usize,

    /// Plain-text password shared by every generated user.
    pub default_password: String,

    /// bcrypt work factor.
    pub password_cost: u32,

    /// Area report locations are drawn from.
    pub region: BoundingBox,

    /// Seed for reproducible runs; entropy is used when unset.
    pub rng_seed: Option<u64>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            database_uri: None,
            database_name: DEFAULT_DATABASE_NAME.to_string(),
            user_count: DEFAULT_USER_COUNT,
            report_count: DEFAULT_REPORT_COUNT,
            analyst_threshold: DEFAULT_ANALYST_THRESHOLD,
            default_password: DEFAULT_PASSWORD.to_string(),
            password_cost: incidents::auth::PASSWORD_COST,
            region: Region::SERVICE_AREA,
            rng_seed: None,
        }
    }
}

impl SeedConfig {
    /// Builds the configuration from process environment variables.
    pub fn from_env() -> Result<Self, SeedError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from process environment variables, falling
    /// back to the dotenv files found under `dir` (see [`dotenv_values`]).
    pub fn from_env_and_files(dir: &Path) -> Result<Self, SeedError> {
        Self::from_layers(|key| env::var(key).ok(), &dotenv_values(dir))
    }

    /// `process` values win over `files` values.
    pub fn from_layers(
        process: impl Fn(&str) -> Option<String>,
        files: &HashMap<String, String>,
    ) -> Result<Self, SeedError> {
        Self::from_lookup(|key| process(key).or_else(|| files.get(key).cloned()))
    }

    /// Builds the configuration from an arbitrary key lookup, falling back to
    /// defaults for absent keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SeedError> {
        let defaults = Self::default();

        let config = Self {
            database_uri: lookup("DATABASE_URI").filter(|uri| !uri.is_empty()),
            database_name: lookup("DATABASE_NAME").unwrap_or(defaults.database_name),
            user_count: parse_var(&lookup, "SEED_NUM_USERS")?.unwrap_or(defaults.user_count),
            report_count: parse_var(&lookup, "SEED_NUM_REPORTS")?
                .unwrap_or(defaults.report_count),
            analyst_threshold: defaults.analyst_threshold,
            default_password: lookup("SEED_PASSWORD").unwrap_or(defaults.default_password),
            password_cost: parse_var(&lookup, "SEED_BCRYPT_COST")?
                .unwrap_or(defaults.password_cost),
            region: defaults.region,
            rng_seed: parse_var(&lookup, "SEED_RNG_SEED")?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Applies command-line values on top of the environment-derived ones.
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(users) = overrides.user_count {
            self.user_count = users;
        }
        if let Some(reports) = overrides.report_count {
            self.report_count = reports;
        }
        if overrides.rng_seed.is_some() {
            self.rng_seed = overrides.rng_seed;
        }
        if let Some(uri) = overrides.database_uri.filter(|uri| !uri.is_empty()) {
            self.database_uri = Some(uri);
        }
    }

    pub fn validate(&self) -> Result<(), SeedError> {
        if !(4..=31).contains(&self.password_cost) {
            return Err(SeedError::Config(format!(
                "bcrypt cost must be between 4 and 31, got {}",
                self.password_cost
            )));
        }
        if self.default_password.is_empty() {
            return Err(SeedError::Config("seed password must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn require_database_uri(&self) -> Result<&str, SeedError> {
        self.database_uri
            .as_deref()
            .ok_or_else(|| SeedError::Config("DATABASE_URI is not set".to_string()))
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, SeedError>
where
    T: FromStr,
    T::Err: Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| SeedError::Config(format!("{key}={raw:?}: {e}")))
        })
        .transpose()
}

/// Values set explicitly for a single invocation, typically from the CLI.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub user_count: Option<usize>,
    pub report_count: Option<usize>,
    pub rng_seed: Option<u64>,
    pub database_uri: Option<String>,
}

/// Dotenv files read relative to the working directory, highest priority first.
pub const DOTENV_FILES: [&str; 2] = ["config/config.env", ".env"];

/// Reads the [`DOTENV_FILES`] under `dir` without touching the process
/// environment. A key defined in several files keeps its first value; missing
/// or unreadable files are skipped.
pub fn dotenv_values(dir: &Path) -> HashMap<String, String> {
    let mut values = HashMap::new();

    for file in DOTENV_FILES {
        let path = dir.join(file);
        if !path.exists() {
            continue;
        }
        let entries = match dotenvy::from_path_iter(&path) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Skipping {}: {e}", path.display());
                continue;
            }
        };
        for entry in entries {
            match entry {
                Ok((key, value)) => {
                    values.entry(key).or_insert(value);
                }
                Err(e) => debug!("Skipping line in {}: {e}", path.display()),
            }
        }
        debug!("Loaded environment from {}", path.display());
    }

    values
}
