use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Task status, stored and serialized as display strings
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    ToSchema,
)]
pub enum TaskStatus {
    /// Task not started
    #[default]
    #[serde(rename = "To Do")]
    #[strum(serialize = "To Do")]
    ToDo,
    /// Task in progress
    #[serde(rename = "In Progress")]
    #[strum(serialize = "In Progress")]
    InProgress,
    /// Task awaiting review
    Review,
    /// Task completed
    Completed,
}

/// Task priority levels
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    ToSchema,
)]
pub enum TaskPriority {
    Low,
    /// Default priority
    #[default]
    Medium,
    High,
    Urgent,
}

/// Task entity - represents a task stored in MongoDB
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier (stored as _id in MongoDB)
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    /// Task title
    pub title: String,
    /// Task description
    pub description: String,
    /// When the task is due
    pub due_date: DateTime<Utc>,
    /// Priority level
    pub priority: TaskPriority,
    /// Current status
    pub status: TaskStatus,
    /// User who created the task; immutable after creation
    pub creator_id: Uuid,
    /// User the task is assigned to, if any
    #[serde(default)]
    pub assigned_to_id: Option<Uuid>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Reference to a user, as embedded in expanded task views
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserRef {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Task projection with user references expanded
///
/// `creatorId` and `assignedToId` carry `{ _id, name, email }` objects
/// instead of bare ids; references to users that no longer exist
/// serialize as null.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    #[serde(rename = "creatorId")]
    pub creator: Option<UserRef>,
    #[serde(rename = "assignedToId")]
    pub assignee: Option<UserRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a new task
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTask {
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    pub due_date: DateTime<Utc>,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub assigned_to_id: Option<Uuid>,
}

/// DTO for partially updating an existing task
///
/// Absent fields are left untouched by the merge; `creatorId` cannot be
/// changed at all.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTask {
    #[validate(length(min = 1, max = 100))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub assigned_to_id: Option<Uuid>,
}

/// Query parameters for listing tasks
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct TaskQuery {
    /// Filter by exact status
    pub status: Option<TaskStatus>,
    /// Filter by exact priority
    pub priority: Option<TaskPriority>,
    /// Sort key; only "dueDate" is recognized, anything else falls back
    /// to newest-first by creation time
    pub sort_by: Option<String>,
    /// Sort direction for dueDate: "asc" (default) or "desc"
    pub sort_order: Option<String>,
}

impl Task {
    /// Create a new task from a CreateTask DTO and the creating user
    pub fn new(input: CreateTask, creator_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            title: input.title,
            description: input.description,
            due_date: input.due_date,
            priority: input.priority,
            status: input.status,
            creator_id,
            assigned_to_id: input.assigned_to_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply updates from an UpdateTask DTO
    ///
    /// Only supplied fields are merged; `updated_at` is refreshed even
    /// when the payload is empty.
    pub fn apply_update(&mut self, update: UpdateTask) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(due_date) = update.due_date {
            self.due_date = due_date;
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(assigned_to_id) = update.assigned_to_id {
            self.assigned_to_id = Some(assigned_to_id);
        }
        self.updated_at = Utc::now();
    }
}

impl UpdateTask {
    /// Wire-format names of the fields present in the payload, in
    /// declaration order
    pub fn supplied_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.title.is_some() {
            fields.push("title");
        }
        if self.description.is_some() {
            fields.push("description");
        }
        if self.due_date.is_some() {
            fields.push("dueDate");
        }
        if self.priority.is_some() {
            fields.push("priority");
        }
        if self.status.is_some() {
            fields.push("status");
        }
        if self.assigned_to_id.is_some() {
            fields.push("assignedToId");
        }
        fields
    }
}

impl TaskView {
    /// Build the expanded projection for a task from preloaded user refs
    pub fn from_task(task: Task, users: &HashMap<Uuid, UserRef>) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            due_date: task.due_date,
            priority: task.priority,
            status: task.status,
            creator: users.get(&task.creator_id).cloned(),
            assignee: task
                .assigned_to_id
                .and_then(|id| users.get(&id).cloned()),
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_create() -> CreateTask {
        CreateTask {
            title: "Write report".to_string(),
            description: "Quarterly numbers".to_string(),
            due_date: Utc::now(),
            priority: TaskPriority::default(),
            status: TaskStatus::default(),
            assigned_to_id: None,
        }
    }

    #[test]
    fn test_status_serializes_display_strings() {
        assert_eq!(
            serde_json::to_value(TaskStatus::ToDo).unwrap(),
            json!("To Do")
        );
        assert_eq!(
            serde_json::to_value(TaskStatus::InProgress).unwrap(),
            json!("In Progress")
        );
        assert_eq!(
            serde_json::to_value(TaskStatus::Review).unwrap(),
            json!("Review")
        );

        let parsed: TaskStatus = serde_json::from_value(json!("In Progress")).unwrap();
        assert_eq!(parsed, TaskStatus::InProgress);
        assert_eq!(TaskStatus::ToDo.to_string(), "To Do");
    }

    #[test]
    fn test_priority_defaults_to_medium() {
        let input: CreateTask = serde_json::from_value(json!({
            "title": "Write report",
            "description": "Quarterly numbers",
            "dueDate": "2025-06-01T12:00:00Z"
        }))
        .unwrap();

        assert_eq!(input.priority, TaskPriority::Medium);
        assert_eq!(input.status, TaskStatus::ToDo);
        assert!(input.assigned_to_id.is_none());
    }

    #[test]
    fn test_task_wire_shape_is_camel_case() {
        let task = Task::new(sample_create(), Uuid::new_v4());
        let value = serde_json::to_value(&task).unwrap();
        let obj = value.as_object().unwrap();

        assert!(obj.contains_key("_id"));
        assert!(obj.contains_key("dueDate"));
        assert!(obj.contains_key("creatorId"));
        assert!(obj.contains_key("assignedToId"));
        assert!(obj.contains_key("createdAt"));
        assert!(obj.contains_key("updatedAt"));
        assert!(!obj.contains_key("due_date"));
        assert_eq!(value["status"], "To Do");
        assert_eq!(value["priority"], "Medium");
    }

    #[test]
    fn test_apply_update_merges_only_supplied_fields() {
        let mut task = Task::new(sample_create(), Uuid::new_v4());
        let original_title = task.title.clone();
        let original_due = task.due_date;
        let before = task.updated_at;

        task.apply_update(UpdateTask {
            status: Some(TaskStatus::InProgress),
            ..Default::default()
        });

        assert_eq!(task.title, original_title);
        assert_eq!(task.due_date, original_due);
        assert_eq!(task.status, TaskStatus::InProgress);
        assert!(task.updated_at >= before);
    }

    #[test]
    fn test_apply_empty_update_refreshes_timestamp_only() {
        let mut task = Task::new(sample_create(), Uuid::new_v4());
        let snapshot = task.clone();

        task.apply_update(UpdateTask::default());

        assert_eq!(task.title, snapshot.title);
        assert_eq!(task.description, snapshot.description);
        assert_eq!(task.status, snapshot.status);
        assert_eq!(task.priority, snapshot.priority);
        assert_eq!(task.assigned_to_id, snapshot.assigned_to_id);
        assert!(task.updated_at >= snapshot.updated_at);
    }

    #[test]
    fn test_supplied_fields_in_declaration_order() {
        let update = UpdateTask {
            title: Some("New title".to_string()),
            due_date: Some(Utc::now()),
            assigned_to_id: Some(Uuid::new_v4()),
            ..Default::default()
        };

        assert_eq!(
            update.supplied_fields(),
            vec!["title", "dueDate", "assignedToId"]
        );
        assert!(UpdateTask::default().supplied_fields().is_empty());
    }

    #[test]
    fn test_view_serializes_dangling_refs_as_null() {
        let task = Task::new(
            CreateTask {
                assigned_to_id: Some(Uuid::new_v4()),
                ..sample_create()
            },
            Uuid::new_v4(),
        );

        let view = TaskView::from_task(task, &HashMap::new());
        let value = serde_json::to_value(&view).unwrap();

        assert!(value["creatorId"].is_null());
        assert!(value["assignedToId"].is_null());
    }

    #[test]
    fn test_view_embeds_user_refs() {
        let creator = UserRef {
            id: Uuid::new_v4(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
        };
        let task = Task::new(sample_create(), creator.id);

        let mut users = HashMap::new();
        users.insert(creator.id, creator.clone());

        let view = TaskView::from_task(task, &users);
        let value = serde_json::to_value(&view).unwrap();

        assert_eq!(value["creatorId"]["_id"], json!(creator.id));
        assert_eq!(value["creatorId"]["name"], "Alice");
        assert_eq!(value["creatorId"]["email"], "alice@example.com");
        assert!(value["assignedToId"].is_null());
    }
}
