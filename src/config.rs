use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.earthmc.net/v3/aurora";
pub const DEFAULT_POLL_SECS: u64 = 300;
pub const DEFAULT_WINDOW_DAYS: u32 = 30;
pub const MIN_WINDOW_DAYS: u32 = 7;

/// Remote history tier. Only active when both the gist id and a token are
/// configured.
#[derive(Debug, Clone)]
pub struct GistConfig {
    pub gist_id: String,
    pub token: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub api_base: String,
    pub cors_proxy: Option<String>,
    pub poll_interval: Duration,
    pub history_path: PathBuf,
    pub history_window_days: u32,
    pub gist: Option<GistConfig>,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(8080);

        let api_base = env::var("EMC_API_BASE")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let cors_proxy = env::var("EMC_CORS_PROXY")
            .ok()
            .filter(|value| !value.trim().is_empty());

        let poll_secs = env::var("EMC_POLL_INTERVAL_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(DEFAULT_POLL_SECS)
            .max(1);

        let history_path = env::var("EMC_HISTORY_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data/history.json"));

        let history_window_days = env::var("EMC_HISTORY_WINDOW_DAYS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(DEFAULT_WINDOW_DAYS)
            .max(MIN_WINDOW_DAYS);

        let gist = match (env::var("EMC_GIST_ID"), env::var("EMC_GITHUB_TOKEN")) {
            (Ok(gist_id), Ok(token)) if !gist_id.is_empty() && !token.is_empty() => {
                Some(GistConfig { gist_id, token })
            }
            _ => None,
        };

        Self {
            port,
            api_base: api_base.trim_end_matches('/').to_string(),
            cors_proxy,
            poll_interval: Duration::from_secs(poll_secs),
            history_path,
            history_window_days,
            gist,
        }
    }

    /// Full URL for an upstream resource path. An empty path addresses the
    /// API root (aggregate server statistics). When a CORS proxy is
    /// configured every request is routed through it.
    pub fn upstream_url(&self, path: &str) -> String {
        let url = if path.is_empty() {
            self.api_base.clone()
        } else {
            format!("{}/{}", self.api_base, path.trim_start_matches('/'))
        };
        match &self.cors_proxy {
            Some(proxy) => format!("{proxy}{url}"),
            None => url,
        }
    }
}
