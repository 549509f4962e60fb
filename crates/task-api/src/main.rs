//! task-api バイナリのエントリポイント

use anyhow::Context;
use infrastructure::DynamoTaskStore;
use shared::{init_tracing, Config};
use std::sync::Arc;
use std::time::Duration;
use task_api::{app_with_state, AppState};
use tracing::{info, warn};

/// 切断中の再接続確認の間隔
const RECONNECT_INTERVAL: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;
    init_tracing(!config.is_development()).map_err(|e| anyhow::anyhow!(e))?;

    info!(
        database = %config.database,
        environment = %config.environment,
        "Starting task API"
    );

    // 接続に失敗しても起動は続け、ヘルスチェックで unhealthy を返す
    let store = Arc::new(DynamoTaskStore::new(&config.database).await);
    if store.connect().await.is_err() {
        warn!("Document store is not reachable yet; serving with an unhealthy status");
    }
    let monitor = store.clone().spawn_reconnect_monitor(RECONNECT_INTERVAL);

    let state = AppState::new(store.clone(), config.environment.clone());
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "Server running");

    axum::serve(listener, app_with_state(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    monitor.abort();
    store.disconnect();
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
