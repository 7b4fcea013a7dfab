use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{MoodInfo, MoodResponse},
    routes::AppState,
    services::recommendations,
};

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    limit: Option<usize>,
}

pub async fn list() -> Json<Vec<MoodInfo>> {
    Json(recommendations::mood_catalog())
}

/// Most popular songs for a mood; unknown moods yield an empty list
pub async fn matching(
    State(state): State<Arc<AppState>>,
    Path(mood): Path<String>,
    Query(params): Query<LimitQuery>,
) -> AppResult<Json<MoodResponse>> {
    let limit = state.limits.resolve(params.limit)?;
    let response = recommendations::mood_songs(&state.engine, &mood, limit);

    if !response.recognized {
        tracing::info!(mood = %response.mood, "Unknown mood requested");
    }

    Ok(Json(response))
}
