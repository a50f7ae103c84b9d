use crate::errors::AppError;
use crate::history::DailyStat;
use crate::models::{EntityRef, NationCard, PlayerCard, ServerInfo, TownCard};
use crate::state::AppState;
use crate::storage::{self, GistStore};
use chrono::Utc;
use tokio::time::{self, MissedTickBehavior};
use tracing::{info, warn};

/// The fixed-interval refresh loop. The first tick fires immediately, so
/// startup doubles as the initial fetch; ticks never overlap and a tick
/// where everything fails just waits for the next one.
pub async fn run(state: AppState) {
    let gist = state.config.gist.as_ref().map(GistStore::new);
    let mut ticker = time::interval(state.config.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        refresh(&state).await;
        snapshot(&state, gist.as_ref()).await;
    }
}

/// Refresh every section once. Sections fail independently: an error keeps
/// the stale list and becomes that section's banner text.
pub async fn refresh(state: &AppState) {
    let now = Utc::now();

    match fetch_server(state).await {
        Ok(info) => {
            info!(online = info.stats.num_online_players, "refreshed server info");
            state.cache.lock().await.server.set_ok(info, now);
        }
        Err(err) => {
            warn!("server info refresh failed: {}", err.message);
            state.cache.lock().await.server.set_err(err.message);
        }
    }

    match fetch_towns(state).await {
        Ok(cards) => {
            info!(count = cards.len(), "refreshed towns");
            state.cache.lock().await.towns.set_ok(cards, now);
        }
        Err(err) => {
            warn!("town refresh failed: {}", err.message);
            state.cache.lock().await.towns.set_err(err.message);
        }
    }

    match fetch_nations(state).await {
        Ok(cards) => {
            info!(count = cards.len(), "refreshed nations");
            state.cache.lock().await.nations.set_ok(cards, now);
        }
        Err(err) => {
            warn!("nation refresh failed: {}", err.message);
            state.cache.lock().await.nations.set_err(err.message);
        }
    }

    match fetch_online_players(state).await {
        Ok(cards) => {
            info!(count = cards.len(), "refreshed online players");
            state.cache.lock().await.players.set_ok(cards, now);
        }
        Err(err) => {
            warn!("player refresh failed: {}", err.message);
            state.cache.lock().await.players.set_err(err.message);
        }
    }
}

async fn fetch_server(state: &AppState) -> Result<ServerInfo, AppError> {
    state.client.server_info().await
}

async fn fetch_towns(state: &AppState) -> Result<Vec<TownCard>, AppError> {
    let names = entity_names(state.client.town_list().await?);
    let towns = state.client.towns(&names).await?;
    Ok(towns.iter().map(TownCard::from).collect())
}

async fn fetch_nations(state: &AppState) -> Result<Vec<NationCard>, AppError> {
    let names = entity_names(state.client.nation_list().await?);
    let nations = state.client.nations(&names).await?;
    Ok(nations.iter().map(NationCard::from).collect())
}

/// Details are resolved for the online set only; the registered-player list
/// runs to the tens of thousands and no screen shows it.
async fn fetch_online_players(state: &AppState) -> Result<Vec<PlayerCard>, AppError> {
    let names = entity_names(state.client.online_players().await?);
    let players = state.client.players(&names).await?;
    Ok(players.iter().map(PlayerCard::from).collect())
}

fn entity_names(refs: Vec<EntityRef>) -> Vec<String> {
    refs.into_iter()
        .map(|entity| entity.name)
        .filter(|name| !name.is_empty())
        .collect()
}

/// The daily snapshot step: aggregate counts come straight from the server
/// info cached this tick. Nothing is recorded while that fetch is failing;
/// a zeroed row would poison the series.
async fn snapshot(state: &AppState, gist: Option<&GistStore>) {
    let stat = {
        let cache = state.cache.lock().await;
        if cache.server.error.is_some() {
            return;
        }
        let Some(info) = cache.server.info.as_ref() else {
            return;
        };
        DailyStat {
            date: Utc::now().date_naive().to_string(),
            towns: info.stats.num_towns,
            nations: info.stats.num_nations,
            residents: info.stats.num_residents,
            online: info.stats.num_online_players,
        }
    };

    let date = stat.date.clone();
    let doc = {
        let mut history = state.history.lock().await;
        if !history.record(stat, &Utc::now().to_rfc3339()) {
            return; // today is already on record
        }
        history.trim(state.config.history_window_days, Utc::now().date_naive());
        history.clone()
    };

    match storage::save_history(&state.config.history_path, gist, &doc).await {
        Ok(()) => info!(%date, "recorded daily snapshot"),
        Err(err) => warn!("failed to persist history: {}", err.message),
    }
}
