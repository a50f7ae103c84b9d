use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/towns", get(handlers::towns))
        .route("/api/nations", get(handlers::nations))
        .route("/api/players", get(handlers::players))
        .route("/api/players/:name", get(handlers::player_lookup))
        .route("/api/status", get(handlers::status))
        .route("/api/history", get(handlers::history))
        .route("/api/refresh", post(handlers::force_refresh))
        .route("/api/proxy/:resource", post(handlers::proxy))
        .with_state(state)
}
