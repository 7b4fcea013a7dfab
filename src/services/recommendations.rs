use crate::{
    engine::{Mood, RecommendationEngine},
    models::{
        AudioFeatures, DatasetSummary, MoodInfo, MoodResponse, RecommendationResponse,
        ReductionSummary, SongSummary,
    },
};

/// Recommends songs similar to a seed song
///
/// An unknown seed is not an error: the response carries `seed: None` and no
/// recommendations.
pub fn similar_songs(
    engine: &RecommendationEngine,
    seed_id: &str,
    limit: usize,
) -> RecommendationResponse {
    let seed = engine.store().lookup_by_id(seed_id).map(SongSummary::from);
    let recommendations = engine
        .recommend(seed_id, limit)
        .into_iter()
        .map(SongSummary::from)
        .collect();

    RecommendationResponse {
        seed,
        recommendations,
    }
}

/// Most popular songs matching a mood label
pub fn mood_songs(engine: &RecommendationEngine, mood: &str, limit: usize) -> MoodResponse {
    let songs = engine
        .match_mood(mood, limit)
        .into_iter()
        .map(SongSummary::from)
        .collect();

    let (label, recognized) = match mood.parse::<Mood>() {
        Ok(known) => (known.label().to_string(), true),
        Err(_) => (mood.trim().to_string(), false),
    };

    MoodResponse {
        mood: label,
        recognized,
        songs,
    }
}

/// Supported moods with their selection rules
pub fn mood_catalog() -> Vec<MoodInfo> {
    Mood::ALL
        .iter()
        .map(|mood| MoodInfo {
            mood: mood.label().to_string(),
            rule: mood.rule().to_string(),
        })
        .collect()
}

pub fn dataset_summary(engine: &RecommendationEngine) -> DatasetSummary {
    let projection = engine.projection();
    DatasetSummary {
        report: engine.store().report(),
        feature_columns: AudioFeatures::SIMILARITY_COLUMNS.to_vec(),
        reduction: ReductionSummary {
            rank: projection.rank(),
            singular_values: projection.singular_values().to_vec(),
            energy_ratio: projection.energy_ratio().to_vec(),
        },
    }
}
