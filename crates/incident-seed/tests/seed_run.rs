//! End-to-end seeding runs against the in-memory store.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use incident_seed::prelude::*;
use incidents::{
    Asset, GeoPoint, NewReport, NewUser, ObjectId, Report, ReportLabel, ReportSource,
    ReportStatus, Role, User,
};

fn test_config(users: usize, reports: usize) -> SeedConfig {
    SeedConfig {
        user_count: users,
        report_count: reports,
        password_cost: 4,
        rng_seed: Some(2024),
        ..SeedConfig::default()
    }
}

fn stale_user() -> User {
    User::new(NewUser {
        firstname: "Old".to_string(),
        lastname: "Record".to_string(),
        email: "old.record@example.com".to_string(),
        phone: "8000000000".to_string(),
        password_hash: "stale".to_string(),
        role: Role::Citizen,
        is_verified: true,
        credibility_score: 99,
        avatar: Asset {
            public_id: "stale".to_string(),
            url: "https://avatars.githubusercontent.com/u/3".to_string(),
        },
    })
    .unwrap()
}

fn stale_report(submitted_by: ObjectId) -> Report {
    Report::new(NewReport {
        text: "An old report that should not survive reseeding.".to_string(),
        location: GeoPoint::new(80.0, 13.0).unwrap(),
        source: ReportSource::Citizen,
        media: None,
        status: ReportStatus::Pending,
        label: ReportLabel::Panic,
        confidence: 0.5,
        submitted_by,
        verified_by: None,
    })
    .unwrap()
}

#[tokio::test]
async fn test_default_config_seeds_single_analyst_and_no_reports() {
    let store = MemoryStore::new();
    let report = SeedRun::new(test_config(1, 5)).run_in_memory(&store).await;

    assert!(report.succeeded());
    assert!(report.disconnected);
    assert_eq!(report.backend, "in-memory store");
    assert_eq!(report.users_inserted, 1);
    assert_eq!(report.reports, Some(ReportSeeding::SkippedNoCitizens));

    let users = store.users();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].role(), Role::Analyst);
    assert!(store.reports().is_empty());
    assert!(store.is_disconnected());
}

#[tokio::test]
async fn test_larger_run_links_reports_to_users() {
    let store = MemoryStore::new();
    let report = SeedRun::new(test_config(12, 40)).run_in_memory(&store).await;

    assert!(report.succeeded());
    assert_eq!(report.users_inserted, 12);
    assert_eq!(report.reports_inserted(), 40);

    let users = store.users();
    let citizens: Vec<ObjectId> = users
        .iter()
        .filter(|u| u.role() == Role::Citizen)
        .filter_map(User::id)
        .collect();
    let analysts: Vec<ObjectId> = users
        .iter()
        .filter(|u| u.role() == Role::Analyst)
        .filter_map(User::id)
        .collect();
    assert_eq!(analysts.len(), 5);
    assert_eq!(citizens.len(), 7);

    for r in store.reports() {
        assert!(citizens.contains(&r.submitted_by()));
        match r.verified_by() {
            Some(verifier) => {
                assert_eq!(r.status(), ReportStatus::Verified);
                assert!(analysts.contains(&verifier));
            }
            None => assert_ne!(r.status(), ReportStatus::Verified),
        }
    }
}

#[tokio::test]
async fn test_existing_documents_are_replaced() {
    let old_user = stale_user();
    let old_report = stale_report(ObjectId::new());
    let store = MemoryStore::with_documents(vec![old_user; 3], vec![old_report; 4]);

    let report = SeedRun::new(test_config(6, 3)).run_in_memory(&store).await;
    assert!(report.succeeded());

    let users = store.users();
    assert_eq!(users.len(), 6);
    assert!(users.iter().all(|u| u.password_hash() != "stale"));

    let reports = store.reports();
    assert_eq!(reports.len(), 3);
    let user_ids: Vec<ObjectId> = users.iter().filter_map(User::id).collect();
    assert!(reports.iter().all(|r| user_ids.contains(&r.submitted_by())));
}

#[tokio::test]
async fn test_same_seed_reproduces_documents() {
    let first = MemoryStore::new();
    let second = MemoryStore::new();
    SeedRun::new(test_config(8, 10)).run_in_memory(&first).await;
    SeedRun::new(test_config(8, 10)).run_in_memory(&second).await;

    let emails = |store: &MemoryStore| -> Vec<String> {
        store.users().iter().map(|u| u.email().to_string()).collect()
    };
    let texts = |store: &MemoryStore| -> Vec<String> {
        store.reports().iter().map(|r| r.text().to_string()).collect()
    };
    assert_eq!(emails(&first), emails(&second));
    assert_eq!(texts(&first), texts(&second));
}

/// Store whose report insert always fails.
#[derive(Default)]
struct FailingReportStore {
    inner: MemoryStore,
    disconnected: AtomicBool,
}

#[async_trait]
impl SeedStore for FailingReportStore {
    fn backend(&self) -> &'static str {
        "failing store"
    }

    async fn clear_users(&self) -> Result<u64, SeedError> {
        self.inner.clear_users().await
    }

    async fn clear_reports(&self) -> Result<u64, SeedError> {
        self.inner.clear_reports().await
    }

    async fn insert_users(&self, users: &[User]) -> Result<usize, SeedError> {
        self.inner.insert_users(users).await
    }

    async fn insert_reports(&self, _reports: &[Report]) -> Result<usize, SeedError> {
        Err(SeedError::Config("reports collection rejected the batch".to_string()))
    }

    async fn user_ids_with_role(&self, role: Role) -> Result<Vec<ObjectId>, SeedError> {
        self.inner.user_ids_with_role(role).await
    }

    async fn disconnect(&self) {
        self.disconnected.store(true, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn test_failure_is_recorded_and_store_still_disconnected() {
    let store = FailingReportStore::default();
    let report = SeedRun::new(test_config(10, 5)).execute(&store).await;

    assert!(!report.succeeded());
    let failure = report.failure.as_ref().unwrap();
    assert_eq!(failure.phase, Phase::SeedingReports);
    assert!(failure.message.contains("rejected"));

    assert_eq!(report.users_inserted, 10);
    assert_eq!(store.inner.users().len(), 10);
    assert!(report.reports.is_none());
    assert!(report.disconnected);
    assert_eq!(report.backend, "failing store");
    assert!(store.disconnected.load(Ordering::SeqCst));
}
