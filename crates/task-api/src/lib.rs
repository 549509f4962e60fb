//! タスク管理 HTTP API（axum）
//!
//! `/health` と `/tasks` の CRUD を提供します。ストアは起動時に一度だけ
//! 生成して `AppState` 経由で注入します。

pub mod error;
pub mod handlers;
pub mod health;
pub mod router;

use infrastructure::{InMemoryTaskStore, TaskStore};
use shared::DEFAULT_ENVIRONMENT;
use std::sync::Arc;

pub use error::ApiError;
pub use router::{app, app_with_state};

/// アプリケーションの共有状態
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TaskStore>,
    /// デプロイ環境のラベル
    pub environment: String,
}

impl AppState {
    pub fn new(store: Arc<dyn TaskStore>, environment: impl Into<String>) -> Self {
        Self {
            store,
            environment: environment.into(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Arc::new(InMemoryTaskStore::new()), DEFAULT_ENVIRONMENT)
    }
}
