//! MongoDB implementation of TaskRepository

use std::collections::HashMap;

use async_trait::async_trait;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Bson, Document, doc, to_bson},
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::TaskResult;
use crate::models::{Task, TaskQuery, TaskView, UserRef};
use crate::repository::TaskRepository;

/// MongoDB implementation of the TaskRepository
///
/// Reads the `users` collection alongside `tasks` to expand creator and
/// assignee references; only name and email are projected, so credential
/// hashes never leave the database.
pub struct MongoTaskRepository {
    tasks: Collection<Task>,
    users: Collection<UserRef>,
}

impl MongoTaskRepository {
    /// Create a new MongoTaskRepository
    pub fn new(db: Database) -> Self {
        Self {
            tasks: db.collection::<Task>("tasks"),
            users: db.collection::<UserRef>("users"),
        }
    }

    /// Get the underlying tasks collection for advanced operations
    pub fn collection(&self) -> &Collection<Task> {
        &self.tasks
    }

    /// Create indexes for the list filters and sorts
    pub async fn create_indexes(&self) -> TaskResult<()> {
        let indexes = vec![
            IndexModel::builder().keys(doc! { "dueDate": 1 }).build(),
            IndexModel::builder().keys(doc! { "status": 1 }).build(),
            IndexModel::builder().keys(doc! { "priority": 1 }).build(),
            IndexModel::builder()
                .keys(doc! { "assignedToId": 1 })
                .build(),
            IndexModel::builder().keys(doc! { "createdAt": -1 }).build(),
        ];

        self.tasks.create_indexes(indexes).await?;
        Ok(())
    }

    /// Build a MongoDB filter document from TaskQuery
    fn build_filter(query: &TaskQuery) -> Document {
        let mut doc = doc! {};

        if let Some(ref status) = query.status {
            doc.insert("status", status.to_string());
        }

        if let Some(ref priority) = query.priority {
            doc.insert("priority", priority.to_string());
        }

        doc
    }

    /// Build the sort document from TaskQuery
    ///
    /// `sortBy=dueDate` sorts by due date (ascending unless
    /// `sortOrder=desc`); everything else is newest-first by creation
    /// time.
    fn build_sort(query: &TaskQuery) -> Document {
        if query.sort_by.as_deref() == Some("dueDate") {
            let direction = if query.sort_order.as_deref() == Some("desc") {
                -1
            } else {
                1
            };
            doc! { "dueDate": direction }
        } else {
            doc! { "createdAt": -1 }
        }
    }

    /// Batch-load user references for the given ids, keyed by id
    async fn load_user_refs(&self, ids: &[Uuid]) -> TaskResult<HashMap<Uuid, UserRef>> {
        use futures_util::TryStreamExt;

        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let bson_ids: Vec<Bson> = ids
            .iter()
            .map(|id| to_bson(id).unwrap_or(Bson::Null))
            .collect();

        let options = mongodb::options::FindOptions::builder()
            .projection(doc! { "name": 1, "email": 1 })
            .build();

        let cursor = self
            .users
            .find(doc! { "_id": { "$in": bson_ids } })
            .with_options(options)
            .await?;
        let users: Vec<UserRef> = cursor.try_collect().await?;

        Ok(users.into_iter().map(|user| (user.id, user)).collect())
    }

    /// Expand a batch of tasks into views with one users query
    async fn expand(&self, tasks: Vec<Task>) -> TaskResult<Vec<TaskView>> {
        let mut ids: Vec<Uuid> = Vec::new();
        for task in &tasks {
            ids.push(task.creator_id);
            if let Some(assignee) = task.assigned_to_id {
                ids.push(assignee);
            }
        }
        ids.sort_unstable();
        ids.dedup();

        let users = self.load_user_refs(&ids).await?;

        Ok(tasks
            .into_iter()
            .map(|task| TaskView::from_task(task, &users))
            .collect())
    }
}

#[async_trait]
impl TaskRepository for MongoTaskRepository {
    #[instrument(skip(self, task), fields(task_id = %task.id, title = %task.title))]
    async fn insert(&self, task: Task) -> TaskResult<Task> {
        self.tasks.insert_one(&task).await?;

        tracing::info!(task_id = %task.id, "Task created");
        Ok(task)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> TaskResult<Option<Task>> {
        let filter = doc! { "_id": to_bson(&id).unwrap_or(Bson::Null) };
        let task = self.tasks.find_one(filter).await?;
        Ok(task)
    }

    #[instrument(skip(self))]
    async fn get_view(&self, id: Uuid) -> TaskResult<Option<TaskView>> {
        let Some(task) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        let mut views = self.expand(vec![task]).await?;
        Ok(views.pop())
    }

    #[instrument(skip(self))]
    async fn list_views(&self, query: TaskQuery) -> TaskResult<Vec<TaskView>> {
        use futures_util::TryStreamExt;

        let filter = Self::build_filter(&query);
        let options = mongodb::options::FindOptions::builder()
            .sort(Self::build_sort(&query))
            .build();

        let cursor = self.tasks.find(filter).with_options(options).await?;
        let tasks: Vec<Task> = cursor.try_collect().await?;

        self.expand(tasks).await
    }

    #[instrument(skip(self, task), fields(task_id = %task.id))]
    async fn replace(&self, task: Task) -> TaskResult<Task> {
        let filter = doc! { "_id": to_bson(&task.id).unwrap_or(Bson::Null) };
        self.tasks.replace_one(filter, &task).await?;

        tracing::info!(task_id = %task.id, "Task updated");
        Ok(task)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> TaskResult<bool> {
        let filter = doc! { "_id": to_bson(&id).unwrap_or(Bson::Null) };
        let result = self.tasks.delete_one(filter).await?;

        if result.deleted_count > 0 {
            tracing::info!(task_id = %id, "Task deleted");
        }
        Ok(result.deleted_count > 0)
    }
}
