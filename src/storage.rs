use crate::config::GistConfig;
use crate::errors::AppError;
use crate::history::HistoryDoc;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::path::Path;
use tokio::fs;
use tracing::{error, warn};

/// Name of the single file inside the gist holding the history document.
pub const GIST_FILE: &str = "history.json";

const GITHUB_API: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("emc_tracker/", env!("CARGO_PKG_VERSION"));

pub async fn load_local(path: &Path) -> HistoryDoc {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(doc) => doc,
            Err(err) => {
                error!("failed to parse history file: {err}");
                HistoryDoc::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => HistoryDoc::default(),
        Err(err) => {
            error!("failed to read history file: {err}");
            HistoryDoc::default()
        }
    }
}

pub async fn persist_local(path: &Path, doc: &HistoryDoc) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(doc).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}

#[derive(Debug, Deserialize)]
struct GistFile {
    #[serde(default)]
    content: String,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct GistResponse {
    #[serde(default)]
    files: HashMap<String, GistFile>,
}

/// The remote tier: a GitHub gist holding the same JSON blob, read with
/// `GET /gists/{id}` and written with `PATCH /gists/{id}`.
pub struct GistStore {
    gist_id: String,
    token: String,
    client: reqwest::Client,
}

impl GistStore {
    pub fn new(config: &GistConfig) -> Self {
        Self {
            gist_id: config.gist_id.clone(),
            token: config.token.clone(),
            client: reqwest::Client::new(),
        }
    }

    pub async fn load(&self) -> Result<HistoryDoc, AppError> {
        let url = format!("{GITHUB_API}/gists/{}", self.gist_id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::upstream(format!("GET {url}: {status}")));
        }
        let gist: GistResponse = response.json().await?;

        let Some(file) = gist.files.get(GIST_FILE) else {
            // empty gist, nothing recorded yet
            return Ok(HistoryDoc::default());
        };
        if file.truncated {
            return Err(AppError::upstream(format!(
                "gist file {GIST_FILE} is truncated; history too large for the gist API"
            )));
        }
        serde_json::from_str(&file.content)
            .map_err(|err| AppError::upstream(format!("gist file {GIST_FILE} is not valid history: {err}")))
    }

    pub async fn save(&self, doc: &HistoryDoc) -> Result<(), AppError> {
        let url = format!("{GITHUB_API}/gists/{}", self.gist_id);
        let content = serde_json::to_string_pretty(doc).map_err(AppError::internal)?;
        let body = json!({ "files": { GIST_FILE: { "content": content } } });

        let response = self
            .client
            .patch(&url)
            .bearer_auth(&self.token)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::upstream(format!("PATCH {url}: {status}")));
        }
        Ok(())
    }
}

/// Load across both tiers: local first, merged with the gist copy when one
/// is configured. A gist failure degrades to local-only instead of failing
/// startup.
pub async fn load_history(path: &Path, gist: Option<&GistStore>) -> HistoryDoc {
    let mut doc = load_local(path).await;
    if let Some(store) = gist {
        match store.load().await {
            Ok(remote) => doc.merge(remote),
            Err(err) => warn!("gist load failed, using local history only: {}", err.message),
        }
    }
    doc
}

/// Save across both tiers. The local file is authoritative; the gist update
/// is best-effort and only logged on failure.
pub async fn save_history(
    path: &Path,
    gist: Option<&GistStore>,
    doc: &HistoryDoc,
) -> Result<(), AppError> {
    persist_local(path, doc).await?;
    if let Some(store) = gist {
        if let Err(err) = store.save(doc).await {
            warn!("gist update failed, history kept locally: {}", err.message);
        }
    }
    Ok(())
}
