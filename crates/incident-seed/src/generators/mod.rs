//! Document generators.
//!
//! - [`UserGenerator`]: users with roles, phones, and avatars
//! - [`ReportGenerator`]: geo-tagged reports linked to citizens and analysts

pub mod report;
pub mod user;

pub use report::{ReportAuthors, ReportGenConfig, ReportGenerator};
pub use user::{UserGenConfig, UserGenerator};

use rand::Rng;
use uuid::Uuid;

/// A v4 UUID drawn from `rng`, so seeded runs stay reproducible.
pub fn random_uuid(rng: &mut impl Rng) -> Uuid {
    uuid::Builder::from_random_bytes(rng.r#gen()).into_uuid()
}
