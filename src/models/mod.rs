use serde::{Deserialize, Serialize};

/// Numeric attributes of a song, all finite once loaded
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub valence: f64,
    pub danceability: f64,
    pub energy: f64,
    pub tempo: f64,
    pub popularity: f64,
    pub duration_ms: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
}

impl AudioFeatures {
    /// Number of columns in the similarity feature vector
    pub const SIMILARITY_DIMS: usize = 6;

    /// Column names of the similarity feature vector, in order
    pub const SIMILARITY_COLUMNS: [&'static str; Self::SIMILARITY_DIMS] = [
        "acousticness",
        "danceability",
        "energy",
        "instrumentalness",
        "liveness",
        "valence",
    ];

    /// The subset of attributes used for similarity scoring, in the order of
    /// [`Self::SIMILARITY_COLUMNS`]
    pub fn similarity_vector(&self) -> [f64; Self::SIMILARITY_DIMS] {
        [
            self.acousticness,
            self.danceability,
            self.energy,
            self.instrumentalness,
            self.liveness,
            self.valence,
        ]
    }
}

/// A song loaded from the dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    /// Unique within a loaded dataset
    pub id: String,
    pub name: String,
    pub artists: Vec<String>,
    pub features: AudioFeatures,
    pub year: i32,
}

impl Song {
    /// Artist names joined for display (e.g. "Frank Sinatra, Bing Crosby")
    pub fn artist_display(&self) -> String {
        self.artists.join(", ")
    }
}

/// Compact view of a song returned from ranking endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongSummary {
    pub id: String,
    pub name: String,
    pub artists: String,
    pub popularity: f64,
    pub year: i32,
}

impl From<&Song> for SongSummary {
    fn from(song: &Song) -> Self {
        Self {
            id: song.id.clone(),
            name: song.name.clone(),
            artists: song.artist_display(),
            popularity: song.features.popularity,
            year: song.year,
        }
    }
}

/// A hit from the external song search service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackMatch {
    pub id: String,
    pub name: String,
    pub artists: Vec<String>,
    pub album_cover: Option<String>,
    pub preview_url: Option<String>,
    /// Whether the track can be used as a recommendation seed
    #[serde(default)]
    pub in_dataset: bool,
}

// ============================================================================
// API Response Types
// ============================================================================

/// Songs similar to a seed; `seed` is `None` when the id is not in the dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub seed: Option<SongSummary>,
    pub recommendations: Vec<SongSummary>,
}

/// Songs matching a mood; `recognized` is `false` for unknown labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodResponse {
    pub mood: String,
    pub recognized: bool,
    pub songs: Vec<SongSummary>,
}

/// A supported mood and the rule that selects it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodInfo {
    pub mood: String,
    pub rule: String,
}

/// Shape of the loaded dataset and its reduction
#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub report: crate::store::LoadReport,
    pub feature_columns: Vec<&'static str>,
    pub reduction: ReductionSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReductionSummary {
    pub rank: usize,
    pub singular_values: Vec<f64>,
    pub energy_ratio: Vec<f64>,
}

// ============================================================================
// Spotify Web API Types
// ============================================================================

/// Response from POST /api/token (client credentials flow)
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyTokenResponse {
    pub access_token: String,
    #[serde(default)]
    #[allow(dead_code)] // Always "Bearer" for client credentials
    pub token_type: Option<String>,
    pub expires_in: i64,
}

/// Response from GET /v1/search?type=track
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifySearchResponse {
    pub tracks: SpotifyPage<SpotifyTrack>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyPage<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyTrack {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SpotifyArtist>,
    pub album: Option<SpotifyAlbum>,
    #[serde(default)]
    pub preview_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyArtist {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyAlbum {
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyImage {
    pub url: String,
}

impl From<SpotifyTrack> for TrackMatch {
    fn from(track: SpotifyTrack) -> Self {
        // Spotify lists album images largest first
        let album_cover = track
            .album
            .and_then(|album| album.images.into_iter().next())
            .map(|image| image.url);

        TrackMatch {
            id: track.id,
            name: track.name,
            artists: track.artists.into_iter().map(|a| a.name).collect(),
            album_cover,
            preview_url: track.preview_url,
            in_dataset: false,
        }
    }
}
