use std::sync::Arc;

use axum::{
    extract::State,
    http::{Method, StatusCode},
    middleware,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    engine::{RecommendationEngine, DEFAULT_TOP_N},
    error::{AppError, AppResult},
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
    services::providers::SongSearchProvider,
};

pub mod dataset;
pub mod moods;
pub mod songs;
pub mod tracks;

/// Bounds applied to the `limit` query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultLimits {
    pub default_top_n: usize,
    pub max_top_n: usize,
    /// Candidates requested from the external search provider
    pub search_limit: usize,
}

impl Default for ResultLimits {
    fn default() -> Self {
        Self {
            default_top_n: DEFAULT_TOP_N,
            max_top_n: 100,
            search_limit: 5,
        }
    }
}

impl ResultLimits {
    /// Applies the default and rejects values outside `1..=max_top_n`
    pub fn resolve(&self, requested: Option<usize>) -> AppResult<usize> {
        let limit = requested.unwrap_or(self.default_top_n);
        if limit == 0 || limit > self.max_top_n {
            return Err(AppError::InvalidInput(format!(
                "limit must be between 1 and {}",
                self.max_top_n
            )));
        }
        Ok(limit)
    }
}

/// Shared application state
///
/// Everything here is immutable after startup, so handlers share it without
/// locking.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RecommendationEngine>,
    pub search_provider: Option<Arc<dyn SongSearchProvider>>,
    pub limits: ResultLimits,
}

impl AppState {
    pub fn new(engine: Arc<RecommendationEngine>) -> Self {
        Self {
            engine,
            search_provider: None,
            limits: ResultLimits::default(),
        }
    }

    pub fn with_search_provider(mut self, provider: Arc<dyn SongSearchProvider>) -> Self {
        self.search_provider = Some(provider);
        self
    }

    pub fn with_limits(mut self, limits: ResultLimits) -> Self {
        self.limits = limits;
        self
    }
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET]);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(cors),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/songs/search", get(songs::search))
        .route("/songs/:id", get(songs::get_song))
        .route("/songs/:id/recommendations", get(songs::recommendations))
        .route("/moods", get(moods::list))
        .route("/moods/:mood", get(moods::matching))
        .route("/tracks/search", get(tracks::search))
        .route("/dataset", get(dataset::summary))
}

/// Health check endpoint
async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "songs": state.engine.store().len()
        })),
    )
}
