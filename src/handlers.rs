use crate::errors::AppError;
use crate::history::HistoryDoc;
use crate::models::{
    ListResponse, NationCard, PlayerCard, SectionStatus, StatusResponse, TownCard,
};
use crate::poller;
use crate::query::{self, ListParams};
use crate::state::AppState;
use crate::stats::{self, HistoryOverview};
use crate::ui;
use axum::{
    extract::{Path, Query, State},
    response::Html,
    Json,
};
use serde::Serialize;
use serde_json::Value;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(ui::render_dashboard(&state.config))
}

pub async fn towns(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse<TownCard>>, AppError> {
    let cache = state.cache.lock().await;
    let section = &cache.towns;
    Ok(Json(ListResponse {
        total: section.items.len(),
        items: query::apply(section.items.clone(), &params),
        refreshed_at: section.refreshed_at_rfc3339(),
        error: section.error.clone(),
    }))
}

pub async fn nations(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse<NationCard>>, AppError> {
    let cache = state.cache.lock().await;
    let section = &cache.nations;
    Ok(Json(ListResponse {
        total: section.items.len(),
        items: query::apply(section.items.clone(), &params),
        refreshed_at: section.refreshed_at_rfc3339(),
        error: section.error.clone(),
    }))
}

pub async fn players(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse<PlayerCard>>, AppError> {
    let cache = state.cache.lock().await;
    let section = &cache.players;
    Ok(Json(ListResponse {
        total: section.items.len(),
        items: query::apply(section.items.clone(), &params),
        refreshed_at: section.refreshed_at_rfc3339(),
        error: section.error.clone(),
    }))
}

/// Live lookup against the upstream, not the cache. The cache only holds
/// online players; lookups must find anyone.
pub async fn player_lookup(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<PlayerCard>, AppError> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::bad_request("player name must not be empty"));
    }

    let found = state.client.players(std::slice::from_ref(&name)).await?;
    let player = found
        .first()
        .ok_or_else(|| AppError::not_found(format!("no player named {name}")))?;
    Ok(Json(PlayerCard::from(player)))
}

pub async fn status(State(state): State<AppState>) -> Result<Json<StatusResponse>, AppError> {
    let cache = state.cache.lock().await;
    let sections = vec![
        SectionStatus {
            name: "towns",
            count: cache.towns.items.len(),
            refreshed_at: cache.towns.refreshed_at_rfc3339(),
            error: cache.towns.error.clone(),
        },
        SectionStatus {
            name: "nations",
            count: cache.nations.items.len(),
            refreshed_at: cache.nations.refreshed_at_rfc3339(),
            error: cache.nations.error.clone(),
        },
        SectionStatus {
            name: "players",
            count: cache.players.items.len(),
            refreshed_at: cache.players.refreshed_at_rfc3339(),
            error: cache.players.error.clone(),
        },
        SectionStatus {
            name: "server",
            count: usize::from(cache.server.info.is_some()),
            refreshed_at: cache.server.refreshed_at_rfc3339(),
            error: cache.server.error.clone(),
        },
    ];

    Ok(Json(StatusResponse {
        server: cache.server.info.clone(),
        sections,
    }))
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub history: HistoryDoc,
    pub overview: HistoryOverview,
}

pub async fn history(State(state): State<AppState>) -> Result<Json<HistoryResponse>, AppError> {
    let doc = state.history.lock().await.clone();
    let overview = stats::build_overview(&doc);
    Ok(Json(HistoryResponse {
        history: doc,
        overview,
    }))
}

/// Force a refresh outside the poll interval. The snapshot cadence is the
/// poller's alone; this only refreshes the cache.
pub async fn force_refresh(State(state): State<AppState>) -> Result<Json<StatusResponse>, AppError> {
    poller::refresh(&state).await;
    status(State(state)).await
}

/// CORS passthrough: relays a JSON body to one of the upstream lookup
/// endpoints and returns the upstream response untouched.
pub async fn proxy(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    if !matches!(resource.as_str(), "towns" | "nations" | "players") {
        return Err(AppError::bad_request(
            "resource must be one of towns, nations, players",
        ));
    }
    Ok(Json(state.client.forward(&resource, &body).await?))
}
