use axum::{extract::State, Json};
use std::sync::Arc;

use crate::{models::DatasetSummary, routes::AppState, services::recommendations};

pub async fn summary(State(state): State<Arc<AppState>>) -> Json<DatasetSummary> {
    Json(recommendations::dataset_summary(&state.engine))
}
