//! Test data generation for the incident-reporting backend.
//!
//! Wipes the `users` and `reports` collections and refills them with
//! synthetic citizens, analysts, and geo-tagged reports.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use incident_seed::prelude::*;
//!
//! let config = SeedConfig {
//!     user_count: 20,
//!     report_count: 50,
//!     rng_seed: Some(42),
//!     ..SeedConfig::default()
//! };
//!
//! let report = SeedRun::new(config).run_mongo().await?;
//! assert!(report.succeeded());
//! ```

pub mod config;
pub mod db;
pub mod generators;
pub mod runner;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::config::{BoundingBox, Region, SeedConfig};
    pub use crate::db::{MemoryStore, MongoStore, ReportSeeding, SeedError, SeedStore, Seeder};
    pub use crate::generators::{ReportAuthors, ReportGenerator, UserGenerator};
    pub use crate::runner::{Phase, RunFailure, RunReport, SeedRun};
}
