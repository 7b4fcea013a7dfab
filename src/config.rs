use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// CSV dataset loaded at startup
    #[serde(default = "default_dataset_path")]
    pub dataset_path: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Result count when a request gives no `limit`
    #[serde(default = "default_top_n")]
    pub default_top_n: usize,

    /// Largest `limit` a request may ask for
    #[serde(default = "default_max_top_n")]
    pub max_top_n: usize,

    /// Spotify client credentials; external search is disabled without both
    #[serde(default)]
    pub spotify_client_id: Option<String>,
    #[serde(default)]
    pub spotify_client_secret: Option<String>,

    /// Spotify Web API base URL
    #[serde(default = "default_spotify_api_url")]
    pub spotify_api_url: String,

    /// Spotify accounts service base URL (token exchange)
    #[serde(default = "default_spotify_auth_url")]
    pub spotify_auth_url: String,

    /// Candidates returned by an external search
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,

    /// Redis connection URL for caching search results; caching is off when unset
    #[serde(default)]
    pub redis_url: Option<String>,
}

fn default_dataset_path() -> String {
    "data/spotify_dataset.csv".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_top_n() -> usize {
    crate::engine::DEFAULT_TOP_N
}

fn default_max_top_n() -> usize {
    100
}

fn default_spotify_api_url() -> String {
    "https://api.spotify.com".to_string()
}

fn default_spotify_auth_url() -> String {
    "https://accounts.spotify.com".to_string()
}

fn default_search_limit() -> usize {
    5
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.max_top_n == 0 {
            anyhow::bail!("MAX_TOP_N must be at least 1");
        }
        if self.default_top_n == 0 || self.default_top_n > self.max_top_n {
            anyhow::bail!(
                "DEFAULT_TOP_N must be between 1 and MAX_TOP_N ({})",
                self.max_top_n
            );
        }
        Ok(())
    }

    /// Client id and secret, when both are set and non-empty
    pub fn spotify_credentials(&self) -> Option<(String, String)> {
        match (&self.spotify_client_id, &self.spotify_client_secret) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => {
                Some((id.clone(), secret.clone()))
            }
            _ => None,
        }
    }
}
