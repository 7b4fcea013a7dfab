use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{RecommendationResponse, Song, SongSummary},
    routes::AppState,
    services::recommendations,
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: String,
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    limit: Option<usize>,
}

/// Case-insensitive substring search over song names in the dataset
///
/// Without `limit` every match is returned.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<SongSummary>>> {
    let matches = state.engine.store().search_by_name(&params.q);
    let take = match params.limit {
        Some(_) => state.limits.resolve(params.limit)?,
        None => matches.len(),
    };

    Ok(Json(
        matches
            .into_iter()
            .take(take)
            .map(SongSummary::from)
            .collect(),
    ))
}

pub async fn get_song(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<Song>> {
    state
        .engine
        .store()
        .lookup_by_id(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Song {} not found", id)))
}

pub async fn recommendations(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<String>,
    Query(params): Query<LimitQuery>,
) -> AppResult<Json<RecommendationResponse>> {
    let limit = state.limits.resolve(params.limit)?;
    let response = recommendations::similar_songs(&state.engine, &id, limit);

    if response.seed.is_none() {
        tracing::info!(request_id = %request_id, seed = %id, "Seed song not in dataset");
    } else {
        tracing::debug!(
            request_id = %request_id,
            seed = %id,
            results = response.recommendations.len(),
            "Recommendations computed"
        );
    }

    Ok(Json(response))
}
