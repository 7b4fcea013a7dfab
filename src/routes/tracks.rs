use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::TrackMatch,
    routes::AppState,
    services::song_search,
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: String,
}

/// Handler for external track search
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<TrackMatch>>> {
    let provider = state.search_provider.as_deref().ok_or_else(|| {
        AppError::ServiceUnavailable("External song search is not configured".to_string())
    })?;

    let tracks = song_search::search_tracks(
        provider,
        state.engine.store(),
        &params.q,
        state.limits.search_limit,
    )
    .await?;

    Ok(Json(tracks))
}
