use emc_tracker::config::Config;
use emc_tracker::fetch::ApiClient;
use emc_tracker::state::AppState;
use emc_tracker::storage::{self, GistStore};
use emc_tracker::{app, poller};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::fs;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Arc::new(Config::from_env());
    if let Some(parent) = config.history_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let gist = config.gist.as_ref().map(GistStore::new);
    let history = storage::load_history(&config.history_path, gist.as_ref()).await;
    info!(
        days = history.stats.len(),
        gist = config.gist.is_some(),
        "loaded history"
    );

    let client = ApiClient::new(Arc::clone(&config))?;
    let state = AppState::new(Arc::clone(&config), client, history);

    tokio::spawn(poller::run(state.clone()));

    let app = app::router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down");
}
