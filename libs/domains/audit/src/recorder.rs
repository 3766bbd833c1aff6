use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AuditResult;
use crate::models::AuditAction;

/// Append-only sink for audit entries
///
/// There is no read API; entries are written for operators to inspect
/// directly in the store. Callers decide whether an append failure is
/// fatal for the surrounding operation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditRecorder: Send + Sync {
    /// Append one entry describing a mutation performed by `user_id`
    async fn append(
        &self,
        action: AuditAction,
        entity_type: &str,
        entity_id: Uuid,
        user_id: Uuid,
        details: String,
    ) -> AuditResult<()>;
}
