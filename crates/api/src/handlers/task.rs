//! Handlers for tasks: project-scoped listing/creation and the flat
//! `/tasks/{id}` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use taskboard_core::task::{CreateTask, Task, UpdateTask};
use taskboard_core::types::DbId;
use taskboard_db::repositories::{ProjectRepo, TaskRepo};

use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;

/// Return 404 unless the parent project exists.
async fn ensure_project_exists(state: &AppState, project_id: DbId) -> AppResult<()> {
    if ProjectRepo::exists(&state.pool, project_id).await? {
        Ok(())
    } else {
        Err(AppError::not_found("Project", project_id))
    }
}

/// GET /api/projects/{project_id}/tasks
///
/// Due date ascending, undated tasks last. An unknown project yields an
/// empty list, matching a filter over the tasks table.
pub async fn list_by_project(
    State(state): State<AppState>,
    ApiPath(project_id): ApiPath<DbId>,
) -> AppResult<Json<Vec<Task>>> {
    let tasks = TaskRepo::list_by_project(&state.pool, project_id).await?;
    Ok(Json(tasks))
}

/// POST /api/projects/{project_id}/tasks
pub async fn create(
    State(state): State<AppState>,
    ApiPath(project_id): ApiPath<DbId>,
    ApiJson(input): ApiJson<CreateTask>,
) -> AppResult<(StatusCode, Json<Task>)> {
    ensure_project_exists(&state, project_id).await?;
    let task = TaskRepo::create(&state.pool, project_id, &input).await?;
    tracing::info!(task_id = task.id, project_id, "Task created");
    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /api/tasks/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<Task>> {
    let task = TaskRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Task", id))?;
    Ok(Json(task))
}

/// PUT /api/tasks/{id}
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
    ApiJson(input): ApiJson<UpdateTask>,
) -> AppResult<Json<Task>> {
    let task = TaskRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::not_found("Task", id))?;
    Ok(Json(task))
}

/// DELETE /api/tasks/{id}
pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<StatusCode> {
    if TaskRepo::delete(&state.pool, id).await? {
        tracing::info!(task_id = id, "Task deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Task", id))
    }
}
