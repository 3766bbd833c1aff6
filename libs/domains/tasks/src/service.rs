//! Task Service - mutation pipeline with realtime events and audit trail
//!
//! Every successful mutation follows the same ordering: persist first,
//! then emit realtime events, then append the audit record. Event and
//! audit failures are logged and never fail the mutation itself.

use std::sync::Arc;

use domain_audit::{AuditAction, AuditRecorder};
use realtime::RealtimeHub;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{TaskError, TaskResult};
use crate::models::{CreateTask, Task, TaskQuery, TaskView, UpdateTask};
use crate::repository::TaskRepository;

/// Broadcast to every connection when a task is created
pub const TASK_CREATED_EVENT: &str = "taskCreated";
/// Broadcast to every connection when a task is updated
pub const TASK_UPDATED_EVENT: &str = "taskUpdated";
/// Broadcast to every connection when a task is deleted
pub const TASK_DELETED_EVENT: &str = "taskDeleted";
/// Targeted event delivered to a user's room on assignment
pub const NOTIFICATION_EVENT: &str = "notification";

/// Task service providing the create/read/update/delete pipeline
///
/// The hub and audit recorder are injected at construction; there is no
/// global registry to initialize.
pub struct TaskService<R: TaskRepository> {
    repository: Arc<R>,
    hub: Arc<RealtimeHub>,
    audit: Arc<dyn AuditRecorder>,
}

impl<R: TaskRepository> TaskService<R> {
    /// Create a new TaskService
    pub fn new(repository: R, hub: Arc<RealtimeHub>, audit: Arc<dyn AuditRecorder>) -> Self {
        Self {
            repository: Arc::new(repository),
            hub,
            audit,
        }
    }

    /// Create a new task owned by `creator_id`
    ///
    /// Broadcasts `taskCreated` with the expanded view and notifies the
    /// assignee's room unless the creator assigned the task to themself.
    #[instrument(skip(self, input), fields(title = %input.title, creator_id = %creator_id))]
    pub async fn create_task(&self, input: CreateTask, creator_id: Uuid) -> TaskResult<Task> {
        input
            .validate()
            .map_err(|e| TaskError::Validation(e.to_string()))?;

        let task = self.repository.insert(Task::new(input, creator_id)).await?;

        // Every create broadcasts; a failed view lookup falls back to the
        // stored shape rather than dropping the event
        match self.repository.get_view(task.id).await {
            Ok(Some(view)) => self.broadcast_event(TASK_CREATED_EVENT, &view).await,
            Ok(None) => {
                tracing::warn!(task_id = %task.id, "Created task missing from view lookup, broadcasting stored shape");
                self.broadcast_event(TASK_CREATED_EVENT, &task).await;
            }
            Err(err) => {
                tracing::warn!(task_id = %task.id, error = %err, "Failed to load task view, broadcasting stored shape");
                self.broadcast_event(TASK_CREATED_EVENT, &task).await;
            }
        }

        if let Some(assignee) = task.assigned_to_id {
            if assignee != creator_id {
                self.notify_assignment(assignee, &task).await;
            }
        }

        self.record_audit(
            AuditAction::Create,
            task.id,
            creator_id,
            format!("Created task: {}", task.title),
        )
        .await;

        Ok(task)
    }

    /// List expanded task views matching the query
    #[instrument(skip(self))]
    pub async fn list_tasks(&self, query: TaskQuery) -> TaskResult<Vec<TaskView>> {
        self.repository.list_views(query).await
    }

    /// Get a task by its id, expanded with the same user references as
    /// the list
    #[instrument(skip(self))]
    pub async fn get_task(&self, id: &str) -> TaskResult<TaskView> {
        let task_id = Self::parse_id(id)?;
        self.repository
            .get_view(task_id)
            .await?
            .ok_or_else(|| TaskError::NotFound(id.to_string()))
    }

    /// Apply a partial update as `actor_id`
    ///
    /// Broadcasts `taskUpdated` with the expanded view on every
    /// successful update, notifies a newly assigned user (unless they are
    /// the previous assignee or the actor), and appends exactly one
    /// UPDATE audit record listing the supplied field names.
    #[instrument(skip(self, input), fields(task_id = %id, actor_id = %actor_id))]
    pub async fn update_task(
        &self,
        id: &str,
        input: UpdateTask,
        actor_id: Uuid,
    ) -> TaskResult<TaskView> {
        input
            .validate()
            .map_err(|e| TaskError::Validation(e.to_string()))?;

        let task_id = Self::parse_id(id)?;
        let existing = self
            .repository
            .get_by_id(task_id)
            .await?
            .ok_or_else(|| TaskError::NotFound(id.to_string()))?;

        let previous_assignee = existing.assigned_to_id;
        let supplied = input.supplied_fields();

        let mut task = existing;
        task.apply_update(input);
        let task = self.repository.replace(task).await?;

        let view = self
            .repository
            .get_view(task.id)
            .await?
            .ok_or_else(|| TaskError::Internal(format!("Task {} missing after update", task.id)))?;

        self.broadcast_event(TASK_UPDATED_EVENT, &view).await;

        if let Some(assignee) = task.assigned_to_id {
            if Some(assignee) != previous_assignee && assignee != actor_id {
                self.notify_assignment(assignee, &task).await;
            }
        }

        self.record_audit(
            AuditAction::Update,
            task.id,
            actor_id,
            format!("Updated fields: {}", supplied.join(", ")),
        )
        .await;

        Ok(view)
    }

    /// Delete a task as `actor_id`
    ///
    /// Broadcasts `taskDeleted` carrying the bare task id; a missing task
    /// emits nothing.
    #[instrument(skip(self), fields(task_id = %id, actor_id = %actor_id))]
    pub async fn delete_task(&self, id: &str, actor_id: Uuid) -> TaskResult<bool> {
        let task_id = Self::parse_id(id)?;
        let existing = self
            .repository
            .get_by_id(task_id)
            .await?
            .ok_or_else(|| TaskError::NotFound(id.to_string()))?;

        let deleted = self.repository.delete(task_id).await?;
        if !deleted {
            return Err(TaskError::NotFound(id.to_string()));
        }

        self.hub
            .broadcast(TASK_DELETED_EVENT, serde_json::json!(task_id))
            .await;

        self.record_audit(
            AuditAction::Delete,
            task_id,
            actor_id,
            format!("Deleted task: {}", existing.title),
        )
        .await;

        Ok(true)
    }

    /// Malformed ids are reported as not-found, same as unknown ids
    fn parse_id(id: &str) -> TaskResult<Uuid> {
        id.parse().map_err(|_| TaskError::NotFound(id.to_string()))
    }

    async fn broadcast_event<T: serde::Serialize>(&self, event: &str, payload: &T) {
        match serde_json::to_value(payload) {
            Ok(payload) => self.hub.broadcast(event, payload).await,
            Err(err) => {
                tracing::warn!(error = %err, "Failed to serialize task event payload")
            }
        }
    }

    async fn notify_assignment(&self, assignee: Uuid, task: &Task) {
        let payload = serde_json::json!({
            "type": "assignment",
            "message": format!("You have been assigned to task: {}", task.title),
            "taskId": task.id,
        });
        self.hub
            .emit_to_room(&assignee.to_string(), NOTIFICATION_EVENT, payload)
            .await;
    }

    async fn record_audit(&self, action: AuditAction, task_id: Uuid, actor_id: Uuid, details: String) {
        if let Err(err) = self
            .audit
            .append(action, "Task", task_id, actor_id, details)
            .await
        {
            tracing::warn!(task_id = %task_id, error = %err, "Failed to append audit entry");
        }
    }
}

impl<R: TaskRepository> Clone for TaskService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            hub: Arc::clone(&self.hub),
            audit: Arc::clone(&self.audit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TaskPriority, TaskStatus};
    use crate::repository::MockTaskRepository;
    use axum::extract::ws::Message;
    use chrono::Utc;
    use domain_audit::{AuditError, AuditResult};
    use mockall::predicate::eq;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    /// Audit double recording appended entries in memory
    #[derive(Default)]
    struct RecordingRecorder {
        entries: Mutex<Vec<(AuditAction, String, Uuid, Uuid, String)>>,
        fail: bool,
    }

    impl RecordingRecorder {
        fn failing() -> Self {
            Self {
                entries: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        fn entries(&self) -> Vec<(AuditAction, String, Uuid, Uuid, String)> {
            self.entries.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl AuditRecorder for RecordingRecorder {
        async fn append(
            &self,
            action: AuditAction,
            entity_type: &str,
            entity_id: Uuid,
            user_id: Uuid,
            details: String,
        ) -> AuditResult<()> {
            if self.fail {
                return Err(AuditError::Database("audit store offline".to_string()));
            }
            self.entries.lock().unwrap().push((
                action,
                entity_type.to_string(),
                entity_id,
                user_id,
                details,
            ));
            Ok(())
        }
    }

    fn sample_create(assignee: Option<Uuid>) -> CreateTask {
        CreateTask {
            title: "Write report".to_string(),
            description: "Quarterly numbers".to_string(),
            due_date: Utc::now(),
            priority: TaskPriority::Medium,
            status: TaskStatus::ToDo,
            assigned_to_id: assignee,
        }
    }

    /// Mock wired so insert echoes its argument and get_view serves the
    /// last inserted/replaced task as an unexpanded view
    fn creating_repo() -> MockTaskRepository {
        let stored: Arc<Mutex<Option<Task>>> = Arc::new(Mutex::new(None));
        let mut repo = MockTaskRepository::new();

        let slot = stored.clone();
        repo.expect_insert().returning(move |task| {
            *slot.lock().unwrap() = Some(task.clone());
            Ok(task)
        });

        let slot = stored.clone();
        repo.expect_get_view().returning(move |_| {
            let task = slot.lock().unwrap().clone().expect("task inserted");
            Ok(Some(TaskView::from_task(task, &HashMap::new())))
        });

        repo
    }

    /// Mock serving `existing` for loads, echoing replace, and serving
    /// the replaced task as the view
    fn updating_repo(existing: Task) -> MockTaskRepository {
        let stored: Arc<Mutex<Option<Task>>> = Arc::new(Mutex::new(None));
        let mut repo = MockTaskRepository::new();

        let loaded = existing.clone();
        repo.expect_get_by_id()
            .with(eq(existing.id))
            .returning(move |_| Ok(Some(loaded.clone())));

        let slot = stored.clone();
        repo.expect_replace().returning(move |task| {
            *slot.lock().unwrap() = Some(task.clone());
            Ok(task)
        });

        let slot = stored.clone();
        repo.expect_get_view().returning(move |_| {
            let task = slot.lock().unwrap().clone().expect("task replaced");
            Ok(Some(TaskView::from_task(task, &HashMap::new())))
        });

        repo
    }

    async fn connect(hub: &RealtimeHub) -> (Uuid, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn_id = Uuid::new_v4();
        hub.register(conn_id, tx).await;
        (conn_id, rx)
    }

    fn next_frame(rx: &mut mpsc::UnboundedReceiver<Message>) -> serde_json::Value {
        match rx.try_recv().expect("expected a frame") {
            Message::Text(text) => serde_json::from_str(&text).expect("frame is json"),
            other => panic!("unexpected frame: {other:?}"),
        }
    }

    fn assert_no_frames(rx: &mut mpsc::UnboundedReceiver<Message>) {
        assert!(rx.try_recv().is_err(), "expected no further frames");
    }

    #[tokio::test]
    async fn test_create_broadcasts_to_all_connections() {
        let hub = Arc::new(RealtimeHub::new());
        let (_, mut rx_a) = connect(&hub).await;
        let (_, mut rx_b) = connect(&hub).await;
        let recorder = Arc::new(RecordingRecorder::default());
        let creator = Uuid::new_v4();

        let service = TaskService::new(creating_repo(), hub.clone(), recorder.clone());
        let task = service
            .create_task(sample_create(None), creator)
            .await
            .unwrap();

        for rx in [&mut rx_a, &mut rx_b] {
            let frame = next_frame(rx);
            assert_eq!(frame["event"], TASK_CREATED_EVENT);
            assert_eq!(frame["data"]["title"], "Write report");
            assert_eq!(frame["data"]["_id"], serde_json::json!(task.id));
            assert_no_frames(rx);
        }

        let entries = recorder.entries();
        assert_eq!(entries.len(), 1);
        let (action, entity_type, entity_id, user_id, details) = &entries[0];
        assert_eq!(*action, AuditAction::Create);
        assert_eq!(entity_type, "Task");
        assert_eq!(*entity_id, task.id);
        assert_eq!(*user_id, creator);
        assert_eq!(details, "Created task: Write report");
    }

    #[tokio::test]
    async fn test_create_notifies_assignee_room_after_broadcast() {
        let hub = Arc::new(RealtimeHub::new());
        let creator = Uuid::new_v4();
        let assignee = Uuid::new_v4();

        let (assignee_conn, mut assignee_rx) = connect(&hub).await;
        hub.join_room(assignee_conn, &assignee.to_string()).await;
        let (_, mut other_rx) = connect(&hub).await;

        let recorder = Arc::new(RecordingRecorder::default());
        let service = TaskService::new(creating_repo(), hub.clone(), recorder.clone());

        let task = service
            .create_task(sample_create(Some(assignee)), creator)
            .await
            .unwrap();

        let first = next_frame(&mut assignee_rx);
        assert_eq!(first["event"], TASK_CREATED_EVENT);

        let second = next_frame(&mut assignee_rx);
        assert_eq!(second["event"], NOTIFICATION_EVENT);
        assert_eq!(second["data"]["type"], "assignment");
        assert_eq!(
            second["data"]["message"],
            "You have been assigned to task: Write report"
        );
        assert_eq!(second["data"]["taskId"], serde_json::json!(task.id));
        assert_no_frames(&mut assignee_rx);

        let frame = next_frame(&mut other_rx);
        assert_eq!(frame["event"], TASK_CREATED_EVENT);
        assert_no_frames(&mut other_rx);
    }

    #[tokio::test]
    async fn test_create_self_assignment_sends_no_notification() {
        let hub = Arc::new(RealtimeHub::new());
        let creator = Uuid::new_v4();

        let (conn, mut rx) = connect(&hub).await;
        hub.join_room(conn, &creator.to_string()).await;

        let recorder = Arc::new(RecordingRecorder::default());
        let service = TaskService::new(creating_repo(), hub.clone(), recorder);

        service
            .create_task(sample_create(Some(creator)), creator)
            .await
            .unwrap();

        let frame = next_frame(&mut rx);
        assert_eq!(frame["event"], TASK_CREATED_EVENT);
        assert_no_frames(&mut rx);
    }

    #[tokio::test]
    async fn test_create_broadcasts_stored_shape_when_view_unavailable() {
        let hub = Arc::new(RealtimeHub::new());
        let (_, mut rx) = connect(&hub).await;
        let recorder = Arc::new(RecordingRecorder::default());
        let creator = Uuid::new_v4();

        let mut repo = MockTaskRepository::new();
        repo.expect_insert().returning(|task| Ok(task));
        repo.expect_get_view()
            .returning(|_| Err(TaskError::Database("view lookup offline".to_string())));

        let service = TaskService::new(repo, hub.clone(), recorder.clone());
        let task = service
            .create_task(sample_create(None), creator)
            .await
            .unwrap();

        // The creation still reaches clients, carrying the stored shape
        // with bare user ids
        let frame = next_frame(&mut rx);
        assert_eq!(frame["event"], TASK_CREATED_EVENT);
        assert_eq!(frame["data"]["_id"], serde_json::json!(task.id));
        assert_eq!(frame["data"]["creatorId"], serde_json::json!(creator));
        assert_no_frames(&mut rx);

        assert_eq!(recorder.entries().len(), 1);
    }

    #[tokio::test]
    async fn test_get_task_returns_expanded_view() {
        let hub = Arc::new(RealtimeHub::new());
        let recorder = Arc::new(RecordingRecorder::default());
        let creator_ref = crate::models::UserRef {
            id: Uuid::new_v4(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
        };
        let task = Task::new(sample_create(None), creator_ref.id);

        let mut users = HashMap::new();
        users.insert(creator_ref.id, creator_ref.clone());
        let view = TaskView::from_task(task.clone(), &users);

        let mut repo = MockTaskRepository::new();
        repo.expect_get_view()
            .with(eq(task.id))
            .returning(move |_| Ok(Some(view.clone())));

        let service = TaskService::new(repo, hub, recorder);

        let fetched = service.get_task(&task.id.to_string()).await.unwrap();
        let value = serde_json::to_value(&fetched).unwrap();

        // Single lookup carries the same reference expansion as the list
        assert_eq!(value["creatorId"]["_id"], serde_json::json!(creator_ref.id));
        assert_eq!(value["creatorId"]["name"], "Alice");
        assert_eq!(value["creatorId"]["email"], "alice@example.com");
    }

    #[tokio::test]
    async fn test_create_validation_rejects_bad_titles() {
        let hub = Arc::new(RealtimeHub::new());
        let (_, mut rx) = connect(&hub).await;
        let recorder = Arc::new(RecordingRecorder::default());
        let service = TaskService::new(MockTaskRepository::new(), hub.clone(), recorder.clone());

        let empty = CreateTask {
            title: String::new(),
            ..sample_create(None)
        };
        let result = service.create_task(empty, Uuid::new_v4()).await;
        assert!(matches!(result, Err(TaskError::Validation(_))));

        let too_long = CreateTask {
            title: "a".repeat(101),
            ..sample_create(None)
        };
        let result = service.create_task(too_long, Uuid::new_v4()).await;
        assert!(matches!(result, Err(TaskError::Validation(_))));

        assert_no_frames(&mut rx);
        assert!(recorder.entries().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_ids_are_not_found() {
        let hub = Arc::new(RealtimeHub::new());
        let recorder = Arc::new(RecordingRecorder::default());
        let service = TaskService::new(MockTaskRepository::new(), hub, recorder);
        let actor = Uuid::new_v4();

        let result = service.get_task("not-a-uuid").await;
        assert!(matches!(result, Err(TaskError::NotFound(_))));

        let result = service
            .update_task("not-a-uuid", UpdateTask::default(), actor)
            .await;
        assert!(matches!(result, Err(TaskError::NotFound(_))));

        let result = service.delete_task("not-a-uuid", actor).await;
        assert!(matches!(result, Err(TaskError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_merges_only_supplied_fields() {
        let hub = Arc::new(RealtimeHub::new());
        let recorder = Arc::new(RecordingRecorder::default());
        let existing = Task::new(sample_create(None), Uuid::new_v4());
        let actor = existing.creator_id;

        let service = TaskService::new(updating_repo(existing.clone()), hub, recorder.clone());

        let view = service
            .update_task(
                &existing.id.to_string(),
                UpdateTask {
                    status: Some(TaskStatus::InProgress),
                    ..Default::default()
                },
                actor,
            )
            .await
            .unwrap();

        assert_eq!(view.status, TaskStatus::InProgress);
        assert_eq!(view.title, existing.title);
        assert_eq!(view.due_date, existing.due_date);

        let entries = recorder.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, AuditAction::Update);
        assert_eq!(entries[0].4, "Updated fields: status");
    }

    #[tokio::test]
    async fn test_update_audit_lists_fields_in_declaration_order() {
        let hub = Arc::new(RealtimeHub::new());
        let recorder = Arc::new(RecordingRecorder::default());
        let existing = Task::new(sample_create(None), Uuid::new_v4());
        let actor = existing.creator_id;

        let service = TaskService::new(updating_repo(existing.clone()), hub, recorder.clone());

        service
            .update_task(
                &existing.id.to_string(),
                UpdateTask {
                    assigned_to_id: Some(actor),
                    title: Some("New title".to_string()),
                    due_date: Some(Utc::now()),
                    ..Default::default()
                },
                actor,
            )
            .await
            .unwrap();

        let entries = recorder.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].4, "Updated fields: title, dueDate, assignedToId");
    }

    #[tokio::test]
    async fn test_update_empty_payload_still_broadcasts() {
        let hub = Arc::new(RealtimeHub::new());
        let (_, mut rx) = connect(&hub).await;
        let recorder = Arc::new(RecordingRecorder::default());
        let existing = Task::new(sample_create(None), Uuid::new_v4());
        let actor = existing.creator_id;

        let service =
            TaskService::new(updating_repo(existing.clone()), hub.clone(), recorder.clone());

        let view = service
            .update_task(&existing.id.to_string(), UpdateTask::default(), actor)
            .await
            .unwrap();

        assert_eq!(view.title, existing.title);
        assert!(view.updated_at >= existing.updated_at);

        let frame = next_frame(&mut rx);
        assert_eq!(frame["event"], TASK_UPDATED_EVENT);
        assert_no_frames(&mut rx);

        let entries = recorder.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].4, "Updated fields: ");
    }

    #[tokio::test]
    async fn test_update_notifies_new_assignee_room_in_order() {
        let hub = Arc::new(RealtimeHub::new());
        let recorder = Arc::new(RecordingRecorder::default());
        let existing = Task::new(sample_create(None), Uuid::new_v4());
        let actor = existing.creator_id;
        let assignee = Uuid::new_v4();

        let (assignee_conn, mut assignee_rx) = connect(&hub).await;
        hub.join_room(assignee_conn, &assignee.to_string()).await;
        let (other_conn, mut other_rx) = connect(&hub).await;
        hub.join_room(other_conn, &Uuid::new_v4().to_string()).await;

        let service = TaskService::new(updating_repo(existing.clone()), hub.clone(), recorder);

        service
            .update_task(
                &existing.id.to_string(),
                UpdateTask {
                    assigned_to_id: Some(assignee),
                    ..Default::default()
                },
                actor,
            )
            .await
            .unwrap();

        let first = next_frame(&mut assignee_rx);
        assert_eq!(first["event"], TASK_UPDATED_EVENT);
        let second = next_frame(&mut assignee_rx);
        assert_eq!(second["event"], NOTIFICATION_EVENT);
        assert_eq!(
            second["data"]["message"],
            "You have been assigned to task: Write report"
        );
        assert_no_frames(&mut assignee_rx);

        let frame = next_frame(&mut other_rx);
        assert_eq!(frame["event"], TASK_UPDATED_EVENT);
        assert_no_frames(&mut other_rx);
    }

    #[tokio::test]
    async fn test_update_keeping_assignee_sends_no_notification() {
        let hub = Arc::new(RealtimeHub::new());
        let recorder = Arc::new(RecordingRecorder::default());
        let assignee = Uuid::new_v4();
        let existing = Task::new(sample_create(Some(assignee)), Uuid::new_v4());
        let actor = existing.creator_id;

        let (conn, mut rx) = connect(&hub).await;
        hub.join_room(conn, &assignee.to_string()).await;

        let service = TaskService::new(updating_repo(existing.clone()), hub.clone(), recorder);

        service
            .update_task(
                &existing.id.to_string(),
                UpdateTask {
                    assigned_to_id: Some(assignee),
                    status: Some(TaskStatus::Review),
                    ..Default::default()
                },
                actor,
            )
            .await
            .unwrap();

        let frame = next_frame(&mut rx);
        assert_eq!(frame["event"], TASK_UPDATED_EVENT);
        assert_no_frames(&mut rx);
    }

    #[tokio::test]
    async fn test_update_self_assignment_sends_no_notification() {
        let hub = Arc::new(RealtimeHub::new());
        let recorder = Arc::new(RecordingRecorder::default());
        let existing = Task::new(sample_create(None), Uuid::new_v4());
        let actor = Uuid::new_v4();

        let (conn, mut rx) = connect(&hub).await;
        hub.join_room(conn, &actor.to_string()).await;

        let service = TaskService::new(updating_repo(existing.clone()), hub.clone(), recorder);

        service
            .update_task(
                &existing.id.to_string(),
                UpdateTask {
                    assigned_to_id: Some(actor),
                    ..Default::default()
                },
                actor,
            )
            .await
            .unwrap();

        let frame = next_frame(&mut rx);
        assert_eq!(frame["event"], TASK_UPDATED_EVENT);
        assert_no_frames(&mut rx);
    }

    #[tokio::test]
    async fn test_update_audit_failure_is_swallowed() {
        let hub = Arc::new(RealtimeHub::new());
        let recorder = Arc::new(RecordingRecorder::failing());
        let existing = Task::new(sample_create(None), Uuid::new_v4());
        let actor = existing.creator_id;

        let service = TaskService::new(updating_repo(existing.clone()), hub, recorder);

        let result = service
            .update_task(
                &existing.id.to_string(),
                UpdateTask {
                    status: Some(TaskStatus::Completed),
                    ..Default::default()
                },
                actor,
            )
            .await;

        assert!(result.is_ok(), "audit failure must not fail the update");
    }

    #[tokio::test]
    async fn test_delete_broadcasts_bare_id() {
        let hub = Arc::new(RealtimeHub::new());
        let (_, mut rx) = connect(&hub).await;
        let recorder = Arc::new(RecordingRecorder::default());
        let existing = Task::new(sample_create(None), Uuid::new_v4());
        let actor = existing.creator_id;

        let mut repo = MockTaskRepository::new();
        let loaded = existing.clone();
        repo.expect_get_by_id()
            .with(eq(existing.id))
            .returning(move |_| Ok(Some(loaded.clone())));
        repo.expect_delete()
            .with(eq(existing.id))
            .returning(|_| Ok(true));

        let service = TaskService::new(repo, hub.clone(), recorder.clone());

        let deleted = service
            .delete_task(&existing.id.to_string(), actor)
            .await
            .unwrap();
        assert!(deleted);

        let frame = next_frame(&mut rx);
        assert_eq!(frame["event"], TASK_DELETED_EVENT);
        assert_eq!(frame["data"], serde_json::json!(existing.id));
        assert_no_frames(&mut rx);

        let entries = recorder.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, AuditAction::Delete);
        assert_eq!(entries[0].4, "Deleted task: Write report");
    }

    #[tokio::test]
    async fn test_delete_absent_task_emits_nothing() {
        let hub = Arc::new(RealtimeHub::new());
        let (_, mut rx) = connect(&hub).await;
        let recorder = Arc::new(RecordingRecorder::default());

        let mut repo = MockTaskRepository::new();
        repo.expect_get_by_id().returning(|_| Ok(None));

        let service = TaskService::new(repo, hub.clone(), recorder.clone());

        let result = service
            .delete_task(&Uuid::new_v4().to_string(), Uuid::new_v4())
            .await;
        assert!(matches!(result, Err(TaskError::NotFound(_))));

        assert_no_frames(&mut rx);
        assert!(recorder.entries().is_empty());
    }
}
