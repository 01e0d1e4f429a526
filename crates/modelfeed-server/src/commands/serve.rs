use std::sync::Arc;

use anyhow::Result;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use modelfeed::store::{FsManifestStore, ManifestStore, MemoryManifestStore};
use modelfeed::upstream::ModelsDevSource;
use modelfeed::OverrideSet;
use modelfeed_server::configuration::Settings;
use modelfeed_server::{logging, refresh, routes, state::AppState};

// Graceful shutdown signal
#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");
    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

    tokio::select! {
        _ = sigint.recv() => {},
        _ = sigterm.recv() => {},
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn build_store(settings: &Settings) -> Arc<dyn ManifestStore> {
    match settings.manifest_path() {
        Some(path) => Arc::new(FsManifestStore::new(path)),
        None => Arc::new(MemoryManifestStore::new()),
    }
}

fn load_overrides(settings: &Settings) -> Result<OverrideSet> {
    match &settings.overrides_file {
        Some(path) => OverrideSet::from_file(path),
        None => Ok(OverrideSet::bundled()?.clone()),
    }
}

pub async fn run() -> Result<()> {
    logging::setup_logging()?;

    let settings = Settings::new()?;

    let source = Arc::new(ModelsDevSource::new(settings.upstream_url.clone())?);
    let app_state = AppState::new(build_store(&settings), source, load_overrides(&settings)?);

    refresh::initialize(&app_state).await;
    let _scheduler =
        refresh::start_scheduler(app_state.clone(), &settings.refresh_cron).await?;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::configure(app_state).layer(cors);

    let listener = tokio::net::TcpListener::bind(settings.socket_addr()).await?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shutdown complete");
    Ok(())
}
