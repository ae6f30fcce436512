//! MongoDB backend.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use incidents::models::{REPORTS_COLLECTION, USERS_COLLECTION};
use incidents::{ObjectId, Report, Role, User};
use mongodb::bson::{Document, doc};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};
use tracing::{debug, info};

use super::{SeedError, SeedStore};
use crate::config::SeedConfig;

const APP_NAME: &str = "incident-seed";

pub struct MongoStore {
    client: Client,
    database: Database,
}

impl MongoStore {
    /// Opens a client and pings the server so an unreachable database is
    /// reported here rather than at the first write.
    pub async fn connect(config: &SeedConfig) -> Result<Self, SeedError> {
        let uri = config.require_database_uri()?;

        let mut options = ClientOptions::parse(uri).await?;
        options.app_name = Some(APP_NAME.to_string());
        let database_name = options
            .default_database
            .clone()
            .unwrap_or_else(|| config.database_name.clone());

        let client = Client::with_options(options)?;
        let database = client.database(&database_name);
        database.run_command(doc! { "ping": 1 }).await?;

        info!("MongoDB connected (database: {database_name})");
        Ok(Self { client, database })
    }

    fn users(&self) -> Collection<User> {
        self.database.collection(USERS_COLLECTION)
    }

    fn reports(&self) -> Collection<Report> {
        self.database.collection(REPORTS_COLLECTION)
    }
}

#[async_trait]
impl SeedStore for MongoStore {
    fn backend(&self) -> &'static str {
        "MongoDB"
    }

    async fn clear_users(&self) -> Result<u64, SeedError> {
        let result = self.users().delete_many(doc! {}).await?;
        debug!("Deleted {} users", result.deleted_count);
        Ok(result.deleted_count)
    }

    async fn clear_reports(&self) -> Result<u64, SeedError> {
        let result = self.reports().delete_many(doc! {}).await?;
        debug!("Deleted {} reports", result.deleted_count);
        Ok(result.deleted_count)
    }

    async fn insert_users(&self, users: &[User]) -> Result<usize, SeedError> {
        if users.is_empty() {
            return Ok(0);
        }
        let result = self.users().insert_many(users).await?;
        Ok(result.inserted_ids.len())
    }

    async fn insert_reports(&self, reports: &[Report]) -> Result<usize, SeedError> {
        if reports.is_empty() {
            return Ok(0);
        }
        let result = self.reports().insert_many(reports).await?;
        Ok(result.inserted_ids.len())
    }

    async fn user_ids_with_role(&self, role: Role) -> Result<Vec<ObjectId>, SeedError> {
        let cursor = self
            .users()
            .clone_with_type::<Document>()
            .find(doc! { "role": role.as_str() })
            .projection(doc! { "_id": 1 })
            .await?;
        let documents: Vec<Document> = cursor.try_collect().await?;

        documents
            .iter()
            .map(|document| {
                document
                    .get_object_id("_id")
                    .map_err(|_| SeedError::MissingId)
            })
            .collect()
    }

    async fn disconnect(&self) {
        self.client.clone().shutdown().await;
    }
}
