use crate::{
    error::AppResult, models::TrackMatch, services::providers::SongSearchProvider,
    store::FeatureStore,
};

/// Service function for external track search
///
/// Delegates to the configured provider, then flags which hits exist in the
/// loaded dataset and can therefore seed recommendations.
pub async fn search_tracks(
    provider: &dyn SongSearchProvider,
    store: &FeatureStore,
    query: &str,
    limit: usize,
) -> AppResult<Vec<TrackMatch>> {
    let mut tracks = provider.search_tracks(query, limit).await?;

    for track in &mut tracks {
        track.in_dataset = store.contains(&track.id);
    }

    tracing::debug!(
        provider = provider.name(),
        results = tracks.len(),
        seedable = tracks.iter().filter(|t| t.in_dataset).count(),
        "Annotated external search results"
    );

    Ok(tracks)
}
