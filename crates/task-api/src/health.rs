use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use infrastructure::{ConnectionState, TaskStore};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatabaseHealth {
    /// 接続状態をそのまま返す
    pub status: ConnectionState,
    pub name: String,
}

/// GET /health のレスポンス
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    pub environment: String,
    pub database: DatabaseHealth,
}

/// ストアの接続状態からヘルス情報を組み立てる（副作用なし）
pub fn report(store: &dyn TaskStore, environment: &str) -> HealthReport {
    let connection = store.connection_state();
    let (status, name) = if connection.is_ready() {
        (HealthStatus::Healthy, store.database_name().to_string())
    } else {
        (HealthStatus::Unhealthy, "not connected".to_string())
    };

    HealthReport {
        status,
        timestamp: Utc::now(),
        environment: environment.to_string(),
        database: DatabaseHealth {
            status: connection,
            name,
        },
    }
}

/// ヘルスチェック用ハンドラ
///
/// バックエンドが落ちていても常に 200 を返す。
pub async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    Json(report(state.store.as_ref(), &state.environment))
}
