use axum::{
    http::{header, Method},
    routing::{get, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{
    create_task, delete_task, list_tasks, method_not_allowed, not_found, update_task,
};
use crate::health::health;
use crate::AppState;

/// InMemory ストアでルータを構築する（ローカル確認用）
pub fn app() -> Router {
    app_with_state(AppState::default())
}

/// 外部から状態を注入できる版
///
/// タスクの API は `/tasks` と `/api/tasks` の両方で受け付ける。
pub fn app_with_state(state: AppState) -> Router {
    let tasks = Router::new()
        .route(
            "/tasks",
            get(list_tasks).post(create_task).fallback(method_not_allowed),
        )
        .route(
            "/tasks/:id",
            put(update_task)
                .delete(delete_task)
                .fallback(method_not_allowed),
        );

    Router::new()
        .route("/health", get(health).fallback(method_not_allowed))
        .merge(tasks.clone())
        .nest("/api", tasks)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors())
        .with_state(state)
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
}
