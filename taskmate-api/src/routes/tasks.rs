/// Task endpoints
///
/// - `GET    /api/tasks?userId=` - list tasks, optionally for one user
/// - `POST   /api/tasks` - create a task
/// - `GET    /api/tasks/user/:userId` - tasks of one user (404 when none)
/// - `GET    /api/tasks/:id` - fetch a task
/// - `PATCH  /api/tasks/:id` - partial update
/// - `DELETE /api/tasks/:id` - delete a task
///
/// Any authenticated caller may read or change any task; `userId` is a
/// plain label, not an ownership check.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{parse_id, ApiJson},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use taskmate_shared::models::{CreateTask, Task, TaskFilter, UpdateTask};
use tracing::{debug, info};

/// Column widths of the `tasks` table
const MAX_TITLE_CHARS: usize = 500;
const MAX_USER_ID_CHARS: usize = 255;

/// Rejects blank values and values wider than their column
fn require_text(field: &str, value: &str, max_chars: usize) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::invalid_field(
            field,
            &format!("{} must not be blank", field),
        ));
    }
    if value.chars().count() > max_chars {
        return Err(ApiError::invalid_field(
            field,
            &format!("{} must be at most {} characters", field, max_chars),
        ));
    }
    Ok(())
}

/// Lists tasks, oldest first
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(filter): Query<TaskFilter>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = state.store.list_tasks(&filter).await?;
    debug!(count = tasks.len(), user_id = ?filter.user_id, "Listed tasks");
    Ok(Json(tasks))
}

/// Lists the tasks of one user
///
/// # Errors
///
/// - `404 Not Found`: the user has no tasks
pub async fn list_user_tasks(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = state.store.list_tasks(&TaskFilter::for_user(user_id)).await?;

    if tasks.is_empty() {
        return Err(ApiError::NotFound("No tasks found for this user".to_string()));
    }

    Ok(Json(tasks))
}

/// Fetches one task
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    let id = parse_id(&id, "Task")?;

    let task = state
        .store
        .find_task(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// Creates a task; status defaults to `PENDING`
///
/// # Errors
///
/// - `400 Bad Request`: blank, missing or overlong `title` or `userId`, or
///   a malformed `dueDate`/`status`
pub async fn create_task(
    State(state): State<AppState>,
    ApiJson(mut data): ApiJson<CreateTask>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    data.title = data.title.trim().to_string();
    require_text("title", &data.title, MAX_TITLE_CHARS)?;
    require_text("userId", &data.user_id, MAX_USER_ID_CHARS)?;

    let task = state.store.create_task(data).await?;
    info!(task_id = %task.id, user_id = %task.user_id, "Created task");

    Ok((StatusCode::CREATED, Json(task)))
}

/// Merges the present fields into a task
///
/// An explicit `null` clears `description` or `dueDate`.
///
/// # Errors
///
/// - `400 Bad Request`: present but blank or overlong `title` or `userId`
/// - `404 Not Found`: no such task
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(mut data): ApiJson<UpdateTask>,
) -> ApiResult<Json<Task>> {
    let id = parse_id(&id, "Task")?;

    if let Some(title) = data.title.as_mut() {
        *title = title.trim().to_string();
        require_text("title", title, MAX_TITLE_CHARS)?;
    }
    if let Some(user_id) = &data.user_id {
        require_text("userId", user_id, MAX_USER_ID_CHARS)?;
    }

    let task = state
        .store
        .update_task(id, data)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    info!(task_id = %task.id, status = %task.status, "Updated task");
    Ok(Json(task))
}

/// Deletes a task
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id, "Task")?;

    if !state.store.delete_task(id).await? {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    info!(task_id = %id, "Deleted task");
    Ok(StatusCode::NO_CONTENT)
}
