use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::TaskError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    /// ストア未接続（詳細は `status` に入る）
    #[error("Database not connected")]
    ServiceUnavailable(String),

    #[error("{0}")]
    Internal(String),

    #[error("Not found")]
    NotFound,

    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl ApiError {
    /// 一覧取得の失敗: 未接続は 503、それ以外は 500
    pub fn from_list_error(e: TaskError) -> Self {
        match e {
            TaskError::StoreUnavailable(detail) => {
                ApiError::ServiceUnavailable(format!("Database connection is not ready: {detail}"))
            }
            other => ApiError::Internal(other.to_string()),
        }
    }

    /// 作成・更新・削除の失敗はすべて 400
    pub fn from_write_error(e: TaskError) -> Self {
        ApiError::BadRequest(e.to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            ApiError::ServiceUnavailable(detail) => {
                json!({ "error": self.to_string(), "status": detail })
            }
            ApiError::Internal(message) => {
                json!({ "error": message, "details": "Failed to fetch tasks from database" })
            }
            ApiError::BadRequest(_) | ApiError::NotFound | ApiError::MethodNotAllowed => {
                json!({ "error": self.to_string() })
            }
        };

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "Request rejected");
        }

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("Invalid JSON: {}", rejection.body_text()))
    }
}
