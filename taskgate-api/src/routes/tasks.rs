/// Task endpoints
///
/// All routes here sit behind the JWT layer. Tasks have no owner, so any
/// authenticated user sees and can delete every task.
///
/// - `GET /v1/tasks` - List tasks
/// - `POST /v1/tasks` - Create a task (status `OPEN`)
/// - `GET /v1/tasks/:id` - Fetch a task
/// - `DELETE /v1/tasks/:id` - Delete a task

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{RecordId, ValidatedJson},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use taskgate_shared::{
    auth::middleware::AuthContext,
    models::task::{NewTask, Task, MAX_DESCRIPTION_LEN, MAX_TITLE_LEN},
};
use tracing::info;
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = MAX_TITLE_LEN, message = "Title must be 1 to 50 characters"))]
    pub title: String,

    #[serde(default)]
    #[validate(length(
        max = MAX_DESCRIPTION_LEN,
        message = "Description must be at most 155 characters"
    ))]
    pub description: String,
}

/// Delete task response
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteTaskResponse {
    /// ID of the removed task
    pub deleted: i64,
}

/// List all tasks
pub async fn list_tasks(State(state): State<AppState>) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(state.store.list_tasks().await?))
}

/// Create a task
///
/// # Endpoint
///
/// ```text
/// POST /v1/tasks
/// Authorization: Bearer <token>
/// Content-Type: application/json
///
/// { "title": "Write docs", "description": "README first" }
/// ```
///
/// # Response
///
/// ```json
/// { "id": 1, "title": "Write docs", "description": "README first", "status": "OPEN" }
/// ```
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidatedJson(req): ValidatedJson<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let task = state
        .store
        .create_task(NewTask {
            title: req.title,
            description: req.description,
        })
        .await?;

    info!(
        task_id = task.id,
        status = task.status.as_str(),
        user_id = auth.user_id(),
        "Task created"
    );
    Ok((StatusCode::CREATED, Json(task)))
}

/// Fetch a task by ID
///
/// # Errors
///
/// - `400 Bad Request`: ID is not a positive integer
/// - `404 Not Found`: No such task
pub async fn get_task(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> ApiResult<Json<Task>> {
    state
        .store
        .find_task_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Task {} not found", id)))
}

/// Delete a task by ID
///
/// # Response
///
/// ```json
/// { "deleted": 1 }
/// ```
///
/// # Errors
///
/// - `404 Not Found`: No such task, including one already deleted
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    RecordId(id): RecordId,
) -> ApiResult<Json<DeleteTaskResponse>> {
    if !state.store.delete_task(id).await? {
        return Err(ApiError::NotFound(format!("Task {} not found", id)));
    }

    info!(task_id = id, user_id = auth.user_id(), "Task deleted");
    Ok(Json(DeleteTaskResponse { deleted: id }))
}
