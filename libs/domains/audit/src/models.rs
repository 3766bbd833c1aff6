use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Kind of mutation an audit entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Assign,
}

/// Audit log entry - one row per recorded mutation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    /// Unique identifier (stored as _id in MongoDB)
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    /// What happened to the entity
    pub action: AuditAction,
    /// Entity kind the entry refers to, e.g. "Task"
    pub entity_type: String,
    /// Identifier of the affected entity
    pub entity_id: Uuid,
    /// User who performed the action
    pub user_id: Uuid,
    /// Free-text summary of the change
    pub details: String,
    /// When the action happened
    pub timestamp: DateTime<Utc>,
}

impl AuditLog {
    /// Build a new entry with a fresh id and the current time
    pub fn new(
        action: AuditAction,
        entity_type: impl Into<String>,
        entity_id: Uuid,
        user_id: Uuid,
        details: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            action,
            entity_type: entity_type.into(),
            entity_id,
            user_id,
            details: details.into(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_serializes_uppercase() {
        let value = serde_json::to_value(AuditAction::Update).unwrap();
        assert_eq!(value, serde_json::json!("UPDATE"));

        let parsed: AuditAction = serde_json::from_value(serde_json::json!("ASSIGN")).unwrap();
        assert_eq!(parsed, AuditAction::Assign);
    }

    #[test]
    fn test_entry_wire_shape() {
        let entry = AuditLog::new(
            AuditAction::Create,
            "Task",
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Created task: Write report",
        );

        let value = serde_json::to_value(&entry).unwrap();
        let obj = value.as_object().unwrap();

        assert!(obj.contains_key("_id"));
        assert!(obj.contains_key("entityType"));
        assert!(obj.contains_key("entityId"));
        assert!(obj.contains_key("userId"));
        assert_eq!(value["action"], "CREATE");
        assert_eq!(value["details"], "Created task: Write report");
    }

    #[test]
    fn test_entry_deserializes_id_alias() {
        let entry = AuditLog::new(
            AuditAction::Delete,
            "Task",
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Deleted task: Old draft",
        );

        let mut value = serde_json::to_value(&entry).unwrap();
        let obj = value.as_object_mut().unwrap();
        let id = obj.remove("_id").unwrap();
        obj.insert("id".to_string(), id);

        let parsed: AuditLog = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.id, entry.id);
    }
}
