/// External song search abstraction
///
/// The search service is only an alternate way of discovering seed songs; it
/// never takes part in scoring. Providers are pluggable so the HTTP layer and
/// tests do not depend on a particular vendor.
use crate::{error::AppResult, models::TrackMatch};

pub mod spotify;

pub use spotify::SpotifyProvider;

/// Trait for external song search providers
#[async_trait::async_trait]
pub trait SongSearchProvider: Send + Sync {
    /// Search tracks by free-text name
    ///
    /// Returns at most `limit` candidates with identifier, display name and
    /// optional artwork / preview URLs. `in_dataset` is left `false`; the
    /// caller annotates it against the loaded dataset.
    async fn search_tracks(&self, query: &str, limit: usize) -> AppResult<Vec<TrackMatch>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
