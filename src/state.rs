use crate::config::Config;
use crate::fetch::ApiClient;
use crate::history::HistoryDoc;
use crate::models::{NationCard, PlayerCard, ServerInfo, TownCard};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;

/// One cached list plus its refresh state. A failed refresh keeps the stale
/// items and records the error; the dashboard shows both.
#[derive(Debug)]
pub struct Section<T> {
    pub items: Vec<T>,
    pub refreshed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl<T> Default for Section<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            refreshed_at: None,
            error: None,
        }
    }
}

impl<T> Section<T> {
    pub fn set_ok(&mut self, items: Vec<T>, now: DateTime<Utc>) {
        self.items = items;
        self.refreshed_at = Some(now);
        self.error = None;
    }

    pub fn set_err(&mut self, message: String) {
        self.error = Some(message);
    }

    pub fn refreshed_at_rfc3339(&self) -> Option<String> {
        self.refreshed_at.map(|at| at.to_rfc3339())
    }
}

#[derive(Debug, Default)]
pub struct ServerSection {
    pub info: Option<ServerInfo>,
    pub refreshed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl ServerSection {
    pub fn set_ok(&mut self, info: ServerInfo, now: DateTime<Utc>) {
        self.info = Some(info);
        self.refreshed_at = Some(now);
        self.error = None;
    }

    pub fn set_err(&mut self, message: String) {
        self.error = Some(message);
    }

    pub fn refreshed_at_rfc3339(&self) -> Option<String> {
        self.refreshed_at.map(|at| at.to_rfc3339())
    }
}

/// Everything the poller writes and the handlers read. Sections refresh
/// independently so one failing endpoint does not blank the others.
#[derive(Debug, Default)]
pub struct DataCache {
    pub towns: Section<TownCard>,
    pub nations: Section<NationCard>,
    pub players: Section<PlayerCard>,
    pub server: ServerSection,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub client: ApiClient,
    pub cache: Arc<Mutex<DataCache>>,
    pub history: Arc<Mutex<HistoryDoc>>,
}

impl AppState {
    pub fn new(config: Arc<Config>, client: ApiClient, history: HistoryDoc) -> Self {
        Self {
            config,
            client,
            cache: Arc::new(Mutex::new(DataCache::default())),
            history: Arc::new(Mutex::new(history)),
        }
    }
}
