use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use domain::{NewTask, Task, TaskId, TaskPatch};

use crate::error::ApiError;
use crate::AppState;

/// GET /tasks
pub async fn list_tasks(State(state): State<AppState>) -> Result<Json<Vec<Task>>, ApiError> {
    let tasks = state
        .store
        .list_all()
        .await
        .map_err(ApiError::from_list_error)?;
    Ok(Json(tasks))
}

/// POST /tasks
///
/// タイトルの検証はストア側で行う。
pub async fn create_task(
    State(state): State<AppState>,
    payload: Result<Json<NewTask>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let Json(input) = payload?;
    let task = state
        .store
        .create(input)
        .await
        .map_err(ApiError::from_write_error)?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// PUT /tasks/{id}
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<TaskPatch>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    let Json(patch) = payload?;
    let task = state
        .store
        .update(&TaskId::from_string(id), patch)
        .await
        .map_err(ApiError::from_write_error)?;
    Ok(Json(task))
}

/// DELETE /tasks/{id}
///
/// 存在しない ID でも 204 を返す。
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .store
        .delete(&TaskId::from_string(id))
        .await
        .map_err(ApiError::from_write_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

/// 既知のパスに対する未対応メソッド
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
