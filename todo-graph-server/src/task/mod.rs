use crate::entities::*;
use chrono::{DateTime, Local, Utc};
use sea_orm::*;

pub mod day_window;

pub use day_window::DayWindow;

#[derive(Debug, PartialEq, Clone, Eq, Hash)]
pub struct Task {
    id: i32,
    title: String,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    done: bool,
}

impl Task {
    pub fn new(
        id: i32,
        title: String,
        created_at: DateTime<Utc>,
        completed_at: Option<DateTime<Utc>>,
        done: bool,
    ) -> Self {
        Self {
            id,
            title,
            created_at,
            completed_at,
            done,
        }
    }

    /// Returns the ID of the task.
    pub fn id(&self) -> i32 {
        self.id
    }

    /// Returns the title of the task.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns when the task was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the task was marked done, if it has been.
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns whether the task has been marked done.
    pub fn is_done(&self) -> bool {
        self.done
    }
}

impl From<task::Model> for Task {
    fn from(model: task::Model) -> Self {
        Task::new(
            model.id,
            model.title,
            model.created_at.with_timezone(&Utc),
            model.completed_at.map(|at| at.with_timezone(&Utc)),
            model.done,
        )
    }
}

/// Error type for TaskService operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskServiceError {
    /// Represents a database error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    /// Represents a task not found error.
    #[error("Task with ID {0} not found")]
    TaskNotFound(i32),
}

pub struct TaskService<'a> {
    db: &'a sea_orm::DatabaseConnection,
}

impl TaskService<'_> {
    pub fn new(db: &sea_orm::DatabaseConnection) -> TaskService<'_> {
        TaskService { db }
    }

    /// Creates a new, pending task.
    ///
    /// # Arguments
    ///
    /// * `title` - The title of the task. Any string is accepted, including the empty string.
    ///
    /// # Returns
    ///
    /// A `Result` containing the created `Task` with its assigned ID, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn create_task(&self, title: String) -> Result<Task, TaskServiceError> {
        let active_model = task::ActiveModel {
            title: ActiveValue::Set(title),
            created_at: ActiveValue::Set(Utc::now().fixed_offset()),
            completed_at: ActiveValue::Set(None),
            done: ActiveValue::Set(false),
            ..Default::default()
        };
        let created_model = active_model.insert(self.db).await?;
        tracing::info!("Created task with ID {}", created_model.id);
        Ok(Task::from(created_model))
    }

    /// Retrieves all tasks that have not been marked done, in insertion order.
    #[tracing::instrument(skip(self))]
    pub async fn get_pending_tasks(&self) -> Result<Vec<Task>, TaskServiceError> {
        let tasks = task::Entity::find()
            .filter(task::Column::Done.eq(false))
            .order_by_asc(task::Column::Id)
            .all(self.db)
            .await?
            .into_iter()
            .map(Task::from)
            .collect();
        Ok(tasks)
    }

    /// Retrieves the tasks completed inside the current day window.
    ///
    /// The window is computed from the local time of the server, see [`DayWindow`].
    #[tracing::instrument(skip(self))]
    pub async fn get_completed_today(&self) -> Result<Vec<Task>, TaskServiceError> {
        let window = DayWindow::containing(&Local::now());
        self.get_completed_between(window.start(), window.end()).await
    }

    /// Retrieves the done tasks whose completion time is in `[start, end)`.
    ///
    /// # Arguments
    ///
    /// * `start` - Inclusive lower bound on the completion time.
    /// * `end` - Exclusive upper bound on the completion time.
    ///
    /// # Returns
    ///
    /// A `Result` containing the matching tasks ordered by completion time, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn get_completed_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Task>, TaskServiceError> {
        let tasks = task::Entity::find()
            .filter(task::Column::Done.eq(true))
            .filter(task::Column::CompletedAt.gte(start.fixed_offset()))
            .filter(task::Column::CompletedAt.lt(end.fixed_offset()))
            .order_by_asc(task::Column::CompletedAt)
            .all(self.db)
            .await?
            .into_iter()
            .map(Task::from)
            .collect();
        Ok(tasks)
    }

    /// Marks a task as done, stamping it with the current time.
    ///
    /// Marking an already done task again overwrites its completion time.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the task to mark done.
    ///
    /// # Returns
    ///
    /// A `Result` containing the updated `Task` if successful, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn mark_done_by_id(&self, id: i32) -> Result<Task, TaskServiceError> {
        let task_to_complete = task::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or(TaskServiceError::TaskNotFound(id))?;

        let mut active_model: task::ActiveModel = task_to_complete.into();
        active_model.done = ActiveValue::Set(true);
        active_model.completed_at = ActiveValue::Set(Some(Utc::now().fixed_offset()));
        let updated_model = active_model
            .update(self.db)
            .await
            .map_err(|err| match err {
                DbErr::RecordNotUpdated => TaskServiceError::TaskNotFound(id),
                err => TaskServiceError::Database(err),
            })?;
        tracing::info!("Marked task with ID {} as done", id);

        Ok(Task::from(updated_model))
    }

    /// Deletes a task by its ID.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the task to delete.
    ///
    /// # Returns
    ///
    /// A `Result` containing the deleted `Task` as it was before deletion, or an error otherwise.
    #[tracing::instrument(skip(self))]
    pub async fn delete_task_by_id(&self, id: i32) -> Result<Task, TaskServiceError> {
        let task_to_delete = task::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or(TaskServiceError::TaskNotFound(id))?;

        let task_copy = Task::from(task_to_delete);
        let result = task::Entity::delete_by_id(id).exec(self.db).await?;
        if result.rows_affected == 0 {
            return Err(TaskServiceError::TaskNotFound(id));
        }
        tracing::info!("Deleted task with ID {}", id);
        Ok(task_copy)
    }
}
