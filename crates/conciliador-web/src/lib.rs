mod api;
mod state;
mod watcher;

use axum::{
    Router,
    routing::{get, post},
};
use conciliador::ReconcileConfig;
use std::{
    net::{Ipv4Addr, SocketAddrV4},
    path::PathBuf,
};
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

use state::{AppState, FileChangeEvent};
use watcher::FileWatcher;

pub const DEFAULT_PORT: u16 = 8473;

fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/result", get(api::get_result))
        .route("/api/export", get(api::export_report))
        .route("/api/reconcile", post(api::reconcile_lists))
        .route("/api/file-changes", get(api::file_changes_stream))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn run(
    internal: PathBuf,
    bank: PathBuf,
    config: ReconcileConfig,
    port: u16,
) -> anyhow::Result<()> {
    // Initialize tracing if not already initialized
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "conciliador_web=info,conciliador=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    let (file_change_tx, _) = broadcast::channel(16);
    let state = AppState::new(internal.clone(), bank.clone(), config, file_change_tx)?;

    let watched_state = state.clone();
    let watched = [internal.as_path(), bank.as_path()];
    let _watcher = FileWatcher::new(watched, move || {
        if let Err(e) = watched_state.reload() {
            tracing::error!("Failed to reload ledgers: {:#}", e);
            return;
        }
        // no subscribers is fine
        let _ = watched_state.file_change_tx.send(FileChangeEvent);
    })?;

    let app = router(state);

    let listen = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port);
    let listener = tokio::net::TcpListener::bind(listen).await?;
    tracing::info!("Server listening on http://{}", listen);

    axum::serve(listener, app).await?;

    Ok(())
}
