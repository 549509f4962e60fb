use thiserror::Error;

/// タスク操作で発生するエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// 入力不備（タイトル未指定など）
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Task not found: {0}")]
    NotFound(String),

    /// ストアへの接続が確立していない
    #[error("Database not connected: {0}")]
    StoreUnavailable(String),

    /// ストア側の想定外エラー
    #[error("Store error: {0}")]
    Store(String),
}

impl TaskError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}
