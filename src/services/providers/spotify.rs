/// Spotify Web API provider
///
/// Authenticates with the client credentials flow and searches tracks.
///
/// API Flow:
/// 1. Token: POST {auth_url}/api/token (basic auth) → bearer token + lifetime
/// 2. Search: GET {api_url}/v1/search?type=track → tracks.items[]
///
/// The token is reused until shortly before it expires.
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use reqwest::{Client as HttpClient, StatusCode};
use tokio::sync::RwLock;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{SpotifySearchResponse, SpotifyTokenResponse, TrackMatch},
    services::providers::SongSearchProvider,
};

const SEARCH_CACHE_TTL: u64 = 3600; // 1 hour
/// Spotify rejects search limits outside 1..=50
const MAX_SEARCH_LIMIT: usize = 50;
/// Refresh the token this long before Spotify says it expires
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn from_response(response: SpotifyTokenResponse, now: DateTime<Utc>) -> Self {
        Self {
            value: response.access_token,
            expires_at: now + Duration::seconds(response.expires_in),
        }
    }

    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(TOKEN_REFRESH_MARGIN_SECS) < self.expires_at
    }
}

#[derive(Clone)]
pub struct SpotifyProvider {
    http_client: HttpClient,
    client_id: String,
    client_secret: String,
    api_url: String,
    auth_url: String,
    cache: Cache,
    token: Arc<RwLock<Option<AccessToken>>>,
}

impl SpotifyProvider {
    pub fn new(
        cache: Cache,
        client_id: String,
        client_secret: String,
        api_url: String,
        auth_url: String,
    ) -> Self {
        Self {
            http_client: HttpClient::new(),
            client_id,
            client_secret,
            api_url: api_url.trim_end_matches('/').to_string(),
            auth_url: auth_url.trim_end_matches('/').to_string(),
            cache,
            token: Arc::new(RwLock::new(None)),
        }
    }

    /// Returns a valid bearer token, exchanging credentials when needed
    async fn access_token(&self) -> AppResult<String> {
        if let Some(token) = self.token.read().await.as_ref() {
            if token.is_fresh(Utc::now()) {
                return Ok(token.value.clone());
            }
        }

        let mut guard = self.token.write().await;
        // Another request may have refreshed while we waited for the lock
        if let Some(token) = guard.as_ref() {
            if token.is_fresh(Utc::now()) {
                return Ok(token.value.clone());
            }
        }

        let token = self.request_token().await?;
        let value = token.value.clone();
        *guard = Some(token);
        Ok(value)
    }

    async fn request_token(&self) -> AppResult<AccessToken> {
        let url = format!("{}/api/token", self.auth_url);

        let response = self
            .http_client
            .post(&url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Spotify token request returned status {}: {}",
                status, body
            )));
        }

        let token_response: SpotifyTokenResponse = response.json().await?;
        tracing::info!(
            expires_in = token_response.expires_in,
            provider = "spotify",
            "Obtained access token"
        );

        Ok(AccessToken::from_response(token_response, Utc::now()))
    }

    fn convert_search_response(&self, response: SpotifySearchResponse) -> Vec<TrackMatch> {
        response
            .tracks
            .items
            .into_iter()
            .map(TrackMatch::from)
            .collect()
    }
}

fn clamp_limit(limit: usize) -> usize {
    limit.clamp(1, MAX_SEARCH_LIMIT)
}

#[async_trait::async_trait]
impl SongSearchProvider for SpotifyProvider {
    async fn search_tracks(&self, query: &str, limit: usize) -> AppResult<Vec<TrackMatch>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }
        let limit = clamp_limit(limit);

        cached!(
            self.cache,
            CacheKey::TrackSearch {
                query: query.to_string(),
                limit,
            },
            SEARCH_CACHE_TTL,
            async move {
                let token = self.access_token().await?;
                let url = format!("{}/v1/search", self.api_url);
                let limit_param = limit.to_string();

                let response = self
                    .http_client
                    .get(&url)
                    .bearer_auth(&token)
                    .query(&[("q", query), ("type", "track"), ("limit", limit_param.as_str())])
                    .send()
                    .await?;

                if response.status() == StatusCode::UNAUTHORIZED {
                    // Revoked early; force a new exchange on the next call
                    self.token.write().await.take();
                }

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(AppError::ExternalApi(format!(
                        "Spotify API returned status {}: {}",
                        status, body
                    )));
                }

                let search_response: SpotifySearchResponse = response.json().await?;
                let tracks = self.convert_search_response(search_response);

                tracing::info!(
                    query = %query,
                    results = tracks.len(),
                    provider = "spotify",
                    "Track search completed"
                );

                Ok::<_, AppError>(tracks)
            }
        )
    }

    fn name(&self) -> &'static str {
        "spotify"
    }
}
