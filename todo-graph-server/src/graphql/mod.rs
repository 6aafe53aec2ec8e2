//! GraphQL schema and resolvers for tasks.
//!
//! - **Queries**: `todo`, `completed`, `completedBetween`
//! - **Mutations**: `createTask`, `markDone`, `deleteTask`
//!
//! The database connection is handed to the schema once in [`build_schema`]
//! and looked up by each resolver from the request context.

use crate::task::{Task, TaskService};
use async_graphql::{Context, EmptySubscription, Error, ID, Object, Result, Schema, SimpleObject};
use sea_orm::DatabaseConnection;

pub mod date_time;

pub use date_time::EpochMillis;

pub type TaskSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Builds the schema with `db` as the persistence handle for every resolver.
pub fn build_schema(db: DatabaseConnection) -> TaskSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(db)
        .finish()
}

/// A to-do item.
#[derive(Debug, SimpleObject)]
#[graphql(name = "Task")]
pub struct TaskObject {
    id: ID,
    title: String,
    created_at: EpochMillis,
    /// Null until the task is marked done.
    completed_at: Option<EpochMillis>,
    done: bool,
}

impl From<Task> for TaskObject {
    fn from(task: Task) -> Self {
        Self {
            id: ID::from(task.id().to_string()),
            title: task.title().to_string(),
            created_at: task.created_at().into(),
            completed_at: task.completed_at().map(EpochMillis::from),
            done: task.is_done(),
        }
    }
}

fn task_service<'a>(ctx: &Context<'a>) -> Result<TaskService<'a>> {
    let db = ctx.data::<DatabaseConnection>()?;
    Ok(TaskService::new(db))
}

fn parse_task_id(id: &ID) -> Result<i32> {
    id.parse::<i32>()
        .map_err(|_| Error::new(format!("Invalid task id \"{}\"", id.as_str())))
}

fn into_objects(tasks: Vec<Task>) -> Vec<TaskObject> {
    tasks.into_iter().map(TaskObject::from).collect()
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Tasks that have not been marked done yet.
    async fn todo(&self, ctx: &Context<'_>) -> Result<Vec<TaskObject>> {
        let tasks = task_service(ctx)?
            .get_pending_tasks()
            .await
            .inspect_err(|err| tracing::error!("Failed to get pending tasks: {}", err))?;
        Ok(into_objects(tasks))
    }

    /// Tasks marked done since 07:00 local time of the current day.
    async fn completed(&self, ctx: &Context<'_>) -> Result<Vec<TaskObject>> {
        let tasks = task_service(ctx)?
            .get_completed_today()
            .await
            .inspect_err(|err| tracing::error!("Failed to get completed tasks: {}", err))?;
        Ok(into_objects(tasks))
    }

    /// Tasks marked done at or after `start` and before `end`.
    async fn completed_between(
        &self,
        ctx: &Context<'_>,
        start: EpochMillis,
        end: EpochMillis,
    ) -> Result<Vec<TaskObject>> {
        let tasks = task_service(ctx)?
            .get_completed_between(start.0, end.0)
            .await
            .inspect_err(|err| tracing::error!("Failed to get completed tasks: {}", err))?;
        Ok(into_objects(tasks))
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Adds a new pending task.
    async fn create_task(&self, ctx: &Context<'_>, title: String) -> Result<TaskObject> {
        let task = task_service(ctx)?
            .create_task(title)
            .await
            .inspect_err(|err| tracing::error!("Failed to create task: {}", err))?;
        Ok(task.into())
    }

    /// Removes a task and returns it as it was before removal.
    async fn delete_task(&self, ctx: &Context<'_>, id: ID) -> Result<TaskObject> {
        let id = parse_task_id(&id)?;
        let task = task_service(ctx)?
            .delete_task_by_id(id)
            .await
            .inspect_err(|err| tracing::error!("Failed to delete task {}: {}", id, err))?;
        Ok(task.into())
    }

    /// Marks a task done with the current time as its completion time.
    async fn mark_done(&self, ctx: &Context<'_>, id: ID) -> Result<TaskObject> {
        let id = parse_task_id(&id)?;
        let task = task_service(ctx)?
            .mark_done_by_id(id)
            .await
            .inspect_err(|err| tracing::error!("Failed to mark task {} as done: {}", id, err))?;
        Ok(task.into())
    }
}
