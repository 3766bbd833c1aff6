use async_trait::async_trait;
use uuid::Uuid;

use crate::error::TaskResult;
use crate::models::{Task, TaskQuery, TaskView};

/// Repository trait for Task persistence
///
/// This trait defines the data access interface for tasks, including the
/// reference-expanded projections used by list responses and realtime
/// events.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Persist a new task
    async fn insert(&self, task: Task) -> TaskResult<Task>;

    /// Get a task by ID in its raw stored shape
    async fn get_by_id(&self, id: Uuid) -> TaskResult<Option<Task>>;

    /// Get a task by ID with user references expanded
    async fn get_view(&self, id: Uuid) -> TaskResult<Option<TaskView>>;

    /// List expanded task views matching the query
    async fn list_views(&self, query: TaskQuery) -> TaskResult<Vec<TaskView>>;

    /// Replace a stored task with the given state
    async fn replace(&self, task: Task) -> TaskResult<Task>;

    /// Delete a task by ID, returning whether a document was removed
    async fn delete(&self, id: Uuid) -> TaskResult<bool>;
}
