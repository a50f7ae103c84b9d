use crate::config::Config;
use crate::errors::AppError;
use crate::models::{EntityRef, Nation, Player, ServerInfo, Town};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// Upstream batch lookups cap out at 100 names per request.
pub const LOOKUP_CHUNK: usize = 100;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the EarthMC REST API. List endpoints are plain GETs, detail
/// lookups are POSTs carrying a `{"query": [...]}` body.
#[derive(Clone)]
pub struct ApiClient {
    config: Arc<Config>,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: Arc<Config>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("emc_tracker/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { config, client })
    }

    pub async fn server_info(&self) -> Result<ServerInfo, AppError> {
        self.get_json("").await
    }

    pub async fn town_list(&self) -> Result<Vec<EntityRef>, AppError> {
        self.get_json("towns").await
    }

    pub async fn nation_list(&self) -> Result<Vec<EntityRef>, AppError> {
        self.get_json("nations").await
    }

    pub async fn online_players(&self) -> Result<Vec<EntityRef>, AppError> {
        self.get_json("online").await
    }

    pub async fn towns(&self, names: &[String]) -> Result<Vec<Town>, AppError> {
        self.lookup("towns", names).await
    }

    pub async fn nations(&self, names: &[String]) -> Result<Vec<Nation>, AppError> {
        self.lookup("nations", names).await
    }

    pub async fn players(&self, names: &[String]) -> Result<Vec<Player>, AppError> {
        self.lookup("players", names).await
    }

    /// Raw passthrough for the proxy endpoint: the body goes upstream as-is
    /// and the response comes back unparsed.
    pub async fn forward(&self, resource: &str, body: &Value) -> Result<Value, AppError> {
        self.post_json(resource, body).await
    }

    async fn lookup<T: DeserializeOwned>(
        &self,
        resource: &str,
        names: &[String],
    ) -> Result<Vec<T>, AppError> {
        let mut out = Vec::with_capacity(names.len());
        for chunk in names.chunks(LOOKUP_CHUNK) {
            let body = json!({ "query": chunk });
            let mut page: Vec<T> = self.post_json(resource, &body).await?;
            out.append(&mut page);
        }
        Ok(out)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let url = self.config.upstream_url(path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| AppError::upstream(format!("GET {url}: {err}")))?;
        Self::parse(url, response).await
    }

    async fn post_json<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T, AppError> {
        let url = self.config.upstream_url(path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|err| AppError::upstream(format!("POST {url}: {err}")))?;
        Self::parse(url, response).await
    }

    async fn parse<T: DeserializeOwned>(
        url: String,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::upstream(format!("{url}: upstream returned {status}")));
        }
        response
            .json()
            .await
            .map_err(|err| AppError::upstream(format!("{url}: invalid response body: {err}")))
    }
}
