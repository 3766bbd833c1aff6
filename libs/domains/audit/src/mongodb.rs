//! MongoDB implementation of AuditRecorder

use async_trait::async_trait;
use mongodb::{Collection, Database, IndexModel, bson::doc};
use tracing::instrument;
use uuid::Uuid;

use crate::error::AuditResult;
use crate::models::{AuditAction, AuditLog};
use crate::recorder::AuditRecorder;

/// MongoDB-backed audit recorder
#[derive(Clone)]
pub struct MongoAuditRecorder {
    collection: Collection<AuditLog>,
}

impl MongoAuditRecorder {
    /// Create a new MongoAuditRecorder writing to the `audit_logs` collection
    pub fn new(db: Database) -> Self {
        let collection = db.collection::<AuditLog>("audit_logs");
        Self { collection }
    }

    /// Create a new MongoAuditRecorder with a custom collection name
    pub fn with_collection(db: Database, collection_name: &str) -> Self {
        let collection = db.collection::<AuditLog>(collection_name);
        Self { collection }
    }

    /// Create indexes for time-ordered and per-entity lookups
    pub async fn create_indexes(&self) -> AuditResult<()> {
        let indexes = vec![
            IndexModel::builder().keys(doc! { "timestamp": -1 }).build(),
            IndexModel::builder()
                .keys(doc! { "entityType": 1, "entityId": 1, "timestamp": -1 })
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        Ok(())
    }
}

#[async_trait]
impl AuditRecorder for MongoAuditRecorder {
    #[instrument(skip(self, details), fields(action = %action, entity_type = %entity_type))]
    async fn append(
        &self,
        action: AuditAction,
        entity_type: &str,
        entity_id: Uuid,
        user_id: Uuid,
        details: String,
    ) -> AuditResult<()> {
        let entry = AuditLog::new(action, entity_type, entity_id, user_id, details);

        self.collection.insert_one(&entry).await?;

        tracing::debug!(audit_id = %entry.id, "Audit entry appended");
        Ok(())
    }
}
