use async_trait::async_trait;
use incidents::{ObjectId, Report, Role, User};

use super::SeedError;

/// The storage operations a seeding run needs.
///
/// Calls are issued one at a time and awaited in order; implementations do
/// not need to handle concurrent use.
#[async_trait]
pub trait SeedStore: Send + Sync {
    /// Deletes every user document, returning how many were removed.
    async fn clear_users(&self) -> Result<u64, SeedError>;

    /// Deletes every report document, returning how many were removed.
    async fn clear_reports(&self) -> Result<u64, SeedError>;

    /// Inserts all users in a single bulk operation.
    async fn insert_users(&self, users: &[User]) -> Result<usize, SeedError>;

    /// Inserts all reports in a single bulk operation.
    async fn insert_reports(&self, reports: &[Report]) -> Result<usize, SeedError>;

    /// Ids of every stored user holding `role`.
    async fn user_ids_with_role(&self, role: Role) -> Result<Vec<ObjectId>, SeedError>;

    /// Human-readable backend name used in log lines.
    fn backend(&self) -> &'static str;

    /// Releases the underlying connection.
    async fn disconnect(&self);
}
