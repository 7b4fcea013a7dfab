//! Recommendation Engine: similarity ranking over the reduced feature
//! matrix and mood filtering over raw features.

use std::sync::Arc;

use nalgebra::DMatrix;

use crate::models::Song;
use crate::store::FeatureStore;

pub mod mood;
pub mod reduction;

pub use mood::{Mood, UnknownMood};
pub use reduction::{reduce_dimensions, Projection};

/// Result count used when the caller does not ask for one
pub const DEFAULT_TOP_N: usize = 10;

/// Ranks songs against a seed or a mood.
///
/// Built once from a loaded store; holds the reduced feature matrix so each
/// query is a single pass over the rows.
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    store: Arc<FeatureStore>,
    /// Row-aligned with `store.songs()`
    reduced: DMatrix<f64>,
    projection: Projection,
}

impl RecommendationEngine {
    pub fn new(store: Arc<FeatureStore>) -> Self {
        let (reduced, projection) = reduce_dimensions(store.feature_matrix());
        Self {
            store,
            reduced,
            projection,
        }
    }

    pub fn store(&self) -> &FeatureStore {
        &self.store
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn reduced_matrix(&self) -> &DMatrix<f64> {
        &self.reduced
    }

    /// Songs most similar to `seed_id`, most similar first.
    ///
    /// Similarity is the raw inner product of reduced feature rows (not
    /// cosine), so songs with a more prominent feature profile score higher.
    /// Ties keep dataset order. The seed is never returned. An unknown seed
    /// yields an empty list.
    pub fn recommend(&self, seed_id: &str, top_n: usize) -> Vec<&Song> {
        let Some(seed) = self.store.position(seed_id) else {
            tracing::debug!(seed_id = %seed_id, "Seed song not in dataset");
            return Vec::new();
        };

        let scores = &self.reduced * self.reduced.row(seed).transpose();

        let mut ranked: Vec<(usize, f64)> = scores
            .iter()
            .copied()
            .enumerate()
            .filter(|(row, _)| *row != seed)
            .collect();
        // Stable: equal scores stay in row order
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        let songs = self.store.songs();
        ranked
            .into_iter()
            .take(top_n)
            .map(|(row, _)| &songs[row])
            .collect()
    }

    /// Songs matching a mood label, most popular first.
    ///
    /// Unrecognized labels yield an empty list.
    pub fn match_mood(&self, mood: &str, top_n: usize) -> Vec<&Song> {
        match mood.parse::<Mood>() {
            Ok(mood) => self.match_known_mood(mood, top_n),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring mood request");
                Vec::new()
            }
        }
    }

    pub fn match_known_mood(&self, mood: Mood, top_n: usize) -> Vec<&Song> {
        let mut matched: Vec<&Song> = self
            .store
            .songs()
            .iter()
            .filter(|song| mood.matches(&song.features))
            .collect();

        matched.sort_by(|a, b| b.features.popularity.total_cmp(&a.features.popularity));
        matched.truncate(top_n);
        matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::fixture_store;

    fn fixture_engine() -> RecommendationEngine {
        RecommendationEngine::new(Arc::new(fixture_store()))
    }

    fn engine_from_csv(rows: &str) -> RecommendationEngine {
        let csv = format!(
            "id,name,artists,year,valence,acousticness,danceability,duration_ms,energy,instrumentalness,liveness,popularity,tempo\n{rows}"
        );
        RecommendationEngine::new(Arc::new(
            FeatureStore::from_reader(csv.as_bytes()).unwrap(),
        ))
    }

    fn ids<'a>(songs: &[&'a Song]) -> Vec<&'a str> {
        songs.iter().map(|s| s.id.as_str()).collect()
    }

    /// Inner product of two songs' reduced rows, computed via the projection
    fn recomputed_score(engine: &RecommendationEngine, a: &Song, b: &Song) -> f64 {
        let projection = engine.projection();
        let pa = projection.project(&a.features.similarity_vector()).unwrap();
        let pb = projection.project(&b.features.similarity_vector()).unwrap();
        pa.dot(&pb)
    }

    #[test]
    fn test_recommend_golden_fixture() {
        let engine = fixture_engine();
        let seed = engine.store().lookup_by_id("trk-01").unwrap();
        assert_eq!(
            seed.features.similarity_vector(),
            [0.1, 0.6, 0.7, 0.1, 0.2, 0.8]
        );

        let recommendations = engine.recommend("trk-01", 5);
        assert_eq!(
            ids(&recommendations),
            vec!["trk-19", "trk-06", "trk-02", "trk-12", "trk-17"]
        );
    }

    #[test]
    fn test_recommend_never_returns_seed() {
        let engine = fixture_engine();
        for song in engine.store().songs() {
            let recommendations = engine.recommend(&song.id, 100);
            assert!(recommendations.iter().all(|r| r.id != song.id));
        }
    }

    #[test]
    fn test_recommend_length_bounds() {
        let engine = fixture_engine();
        assert_eq!(engine.recommend("trk-03", 5).len(), 5);
        assert_eq!(engine.recommend("trk-03", DEFAULT_TOP_N).len(), 10);
        // Only 19 candidates besides the seed
        assert_eq!(engine.recommend("trk-03", 100).len(), 19);
        assert!(engine.recommend("trk-03", 0).is_empty());
    }

    #[test]
    fn test_recommend_with_fewer_candidates_than_requested() {
        let engine = engine_from_csv(
            "a,A,X,2000,0.5,0.1,0.2,1000,0.3,0.0,0.4,10,100\n\
             b,B,X,2000,0.6,0.2,0.3,1000,0.4,0.1,0.1,20,100\n\
             c,C,X,2000,0.1,0.9,0.1,1000,0.1,0.8,0.1,30,100\n",
        );
        let recommendations = engine.recommend("a", DEFAULT_TOP_N);
        assert_eq!(recommendations.len(), 2);
    }

    #[test]
    fn test_recommend_sorted_by_recomputed_dot_product() {
        let engine = fixture_engine();
        for seed in engine.store().songs() {
            let scores: Vec<f64> = engine
                .recommend(&seed.id, 100)
                .iter()
                .map(|song| recomputed_score(&engine, seed, song))
                .collect();
            assert!(
                scores.windows(2).all(|w| w[0] >= w[1] - 1e-12),
                "scores for seed {} not descending: {:?}",
                seed.id,
                scores
            );
        }
    }

    #[test]
    fn test_recommend_ties_keep_dataset_order() {
        // b, c and d share one feature profile so they score identically
        let engine = engine_from_csv(
            "a,A,X,2000,0.5,0.1,0.2,1000,0.3,0.0,0.4,10,100\n\
             d,D,X,2000,0.6,0.2,0.3,1000,0.4,0.1,0.1,20,100\n\
             b,B,X,2000,0.6,0.2,0.3,1000,0.4,0.1,0.1,90,100\n\
             c,C,X,2000,0.6,0.2,0.3,1000,0.4,0.1,0.1,50,100\n",
        );
        assert_eq!(ids(&engine.recommend("a", 10)), vec!["d", "b", "c"]);
    }

    #[test]
    fn test_recommend_unknown_seed_is_empty() {
        let engine = fixture_engine();
        assert!(engine.recommend("does-not-exist", 10).is_empty());
        assert!(engine.recommend("", 10).is_empty());
    }

    #[test]
    fn test_recommend_favors_magnitude_over_direction() {
        // Inner product, not cosine: trk-10 has almost exactly the seed's
        // profile yet is outranked by louder, more danceable tracks.
        let engine = fixture_engine();
        let seed = engine.store().lookup_by_id("trk-01").unwrap();

        let projection = engine.projection();
        let seed_vec = projection
            .project(&seed.features.similarity_vector())
            .unwrap();
        let closest_direction = engine
            .store()
            .songs()
            .iter()
            .filter(|s| s.id != seed.id)
            .max_by(|a, b| {
                let cos = |s: &Song| {
                    let v = projection.project(&s.features.similarity_vector()).unwrap();
                    v.dot(&seed_vec) / (v.norm() * seed_vec.norm())
                };
                cos(a).total_cmp(&cos(b))
            })
            .unwrap();
        assert_eq!(closest_direction.id, "trk-10");

        let top5 = ids(&engine.recommend("trk-01", 5));
        assert!(!top5.contains(&"trk-10"));
        let full = ids(&engine.recommend("trk-01", 100));
        assert_eq!(full.iter().position(|id| *id == "trk-10"), Some(7));
    }

    #[test]
    fn test_match_mood_happy() {
        let engine = fixture_engine();
        let happy = engine.match_mood("Happy", 100);

        assert!(happy.iter().all(|s| s.features.valence > 0.7));
        assert!(happy
            .windows(2)
            .all(|w| w[0].features.popularity >= w[1].features.popularity));
        assert_eq!(
            ids(&happy),
            vec!["trk-06", "trk-02", "trk-17", "trk-01", "trk-19", "trk-10", "trk-14"]
        );
        // Exactly on the threshold
        assert!(!ids(&happy).contains(&"trk-08"));
    }

    #[test]
    fn test_match_mood_dead_zone() {
        let engine = fixture_engine();
        let middle = engine.store().lookup_by_id("trk-13").unwrap();
        assert_eq!(middle.features.valence, 0.5);

        for mood in ["Happy", "Sad"] {
            assert!(!ids(&engine.match_mood(mood, 100)).contains(&"trk-13"));
        }
    }

    #[test]
    fn test_match_mood_other_buckets() {
        let engine = fixture_engine();
        assert_eq!(
            ids(&engine.match_mood("Sad", 10)),
            vec!["trk-03", "trk-15", "trk-11", "trk-07"]
        );
        assert_eq!(
            ids(&engine.match_mood("calm", 10)),
            vec!["trk-03", "trk-18", "trk-11", "trk-07"]
        );
        assert_eq!(
            ids(&engine.match_mood("Energetic", 3)),
            vec!["trk-06", "trk-12", "trk-02"]
        );
    }

    #[test]
    fn test_match_mood_default_truncation() {
        let engine = fixture_engine();
        let energetic = engine.match_mood("Energetic", DEFAULT_TOP_N);
        assert_eq!(energetic.len(), 8);
        assert!(engine.match_mood("Happy", 0).is_empty());
    }

    #[test]
    fn test_match_mood_popularity_ties_keep_dataset_order() {
        let engine = engine_from_csv(
            "a,A,X,2000,0.9,0.1,0.2,1000,0.3,0.0,0.4,40,100\n\
             b,B,X,2000,0.8,0.1,0.2,1000,0.3,0.0,0.4,70,100\n\
             c,C,X,2000,0.95,0.1,0.2,1000,0.3,0.0,0.4,40,100\n",
        );
        assert_eq!(ids(&engine.match_mood("Happy", 10)), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_match_mood_unknown_label_is_empty() {
        let engine = fixture_engine();
        assert!(engine.match_mood("Angry", 10).is_empty());
        assert!(engine.match_mood("", 10).is_empty());
    }
}
