//! In-process backend used for dry runs and tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use incidents::{ObjectId, Report, Role, User};

use super::{SeedError, SeedStore};

/// Holds documents in memory, assigning ids on insert like the database would.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: Mutex<Vec<User>>,
    reports: Mutex<Vec<Report>>,
    disconnected: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds documents, as a database left over
    /// from an earlier run would.
    pub fn with_documents(users: Vec<User>, reports: Vec<Report>) -> Self {
        let store = Self::new();
        *lock(&store.users) = users
            .into_iter()
            .map(|user| match user.id() {
                Some(_) => user,
                None => user.with_id(ObjectId::new()),
            })
            .collect();
        *lock(&store.reports) = reports
            .into_iter()
            .map(|report| match report.id() {
                Some(_) => report,
                None => report.with_id(ObjectId::new()),
            })
            .collect();
        store
    }

    /// Snapshot of the stored users.
    pub fn users(&self) -> Vec<User> {
        lock(&self.users).clone()
    }

    /// Snapshot of the stored reports.
    pub fn reports(&self) -> Vec<Report> {
        lock(&self.reports).clone()
    }

    pub fn is_disconnected(&self) -> bool {
        self.disconnected.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SeedStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "in-memory store"
    }

    async fn clear_users(&self) -> Result<u64, SeedError> {
        let mut users = lock(&self.users);
        let removed = users.len() as u64;
        users.clear();
        Ok(removed)
    }

    async fn clear_reports(&self) -> Result<u64, SeedError> {
        let mut reports = lock(&self.reports);
        let removed = reports.len() as u64;
        reports.clear();
        Ok(removed)
    }

    async fn insert_users(&self, users: &[User]) -> Result<usize, SeedError> {
        lock(&self.users).extend(users.iter().cloned().map(|u| u.with_id(ObjectId::new())));
        Ok(users.len())
    }

    async fn insert_reports(&self, reports: &[Report]) -> Result<usize, SeedError> {
        lock(&self.reports).extend(reports.iter().cloned().map(|r| r.with_id(ObjectId::new())));
        Ok(reports.len())
    }

    async fn user_ids_with_role(&self, role: Role) -> Result<Vec<ObjectId>, SeedError> {
        Ok(lock(&self.users)
            .iter()
            .filter(|user| user.role() == role)
            .filter_map(User::id)
            .collect())
    }

    async fn disconnect(&self) {
        self.disconnected.store(true, Ordering::SeqCst);
    }
}
