use csv::StringRecord;
use serde::Serialize;

use crate::models::{AudioFeatures, Song};

/// Fatal errors while loading the dataset
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("Dataset is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Failed to open dataset {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Auditable outcome of a dataset load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Data rows read, excluding the header
    pub total_rows: usize,
    pub loaded: usize,
    /// Rows dropped because a required field was missing or not a finite number
    pub excluded_invalid: usize,
    /// Rows dropped because their identifier was already loaded
    pub excluded_duplicate: usize,
}

impl LoadReport {
    pub fn excluded(&self) -> usize {
        self.excluded_invalid + self.excluded_duplicate
    }
}

const ID_COLUMN: &str = "id";
const NAME_COLUMN: &str = "name";
const ARTISTS_COLUMN: &str = "artists";
const YEAR_COLUMN: &str = "year";

/// Numeric columns every row must coerce, in `AudioFeatures` field order
const FEATURE_COLUMNS: [&str; 9] = [
    "valence",
    "danceability",
    "energy",
    "tempo",
    "popularity",
    "duration_ms",
    "acousticness",
    "instrumentalness",
    "liveness",
];

/// Positions of the required columns within a header record
#[derive(Debug, Clone)]
pub(crate) struct ColumnIndex {
    id: usize,
    name: usize,
    artists: usize,
    year: usize,
    features: [usize; 9],
}

impl ColumnIndex {
    /// Resolves every required column, reporting all missing ones at once
    pub(crate) fn resolve(headers: &StringRecord) -> Result<Self, LoadError> {
        let mut missing = Vec::new();
        let mut find = |column: &str| -> usize {
            match headers.iter().position(|h| h.trim() == column) {
                Some(position) => position,
                None => {
                    missing.push(column.to_string());
                    usize::MAX
                }
            }
        };

        let id = find(ID_COLUMN);
        let name = find(NAME_COLUMN);
        let artists = find(ARTISTS_COLUMN);
        let year = find(YEAR_COLUMN);
        let features = FEATURE_COLUMNS.map(&mut find);

        if !missing.is_empty() {
            return Err(LoadError::MissingColumns(missing));
        }

        Ok(Self {
            id,
            name,
            artists,
            year,
            features,
        })
    }

    /// Converts one raw row into a song, or `None` when it must be excluded
    pub(crate) fn parse_row(&self, record: &StringRecord) -> Option<Song> {
        let id = record.get(self.id)?.trim();
        if id.is_empty() {
            return None;
        }

        let [
            valence,
            danceability,
            energy,
            tempo,
            popularity,
            duration_ms,
            acousticness,
            instrumentalness,
            liveness,
        ] = self.features;

        let features = AudioFeatures {
            valence: coerce(record.get(valence))?,
            danceability: coerce(record.get(danceability))?,
            energy: coerce(record.get(energy))?,
            tempo: coerce(record.get(tempo))?,
            popularity: coerce(record.get(popularity))?,
            duration_ms: coerce(record.get(duration_ms))?,
            acousticness: coerce(record.get(acousticness))?,
            instrumentalness: coerce(record.get(instrumentalness))?,
            liveness: coerce(record.get(liveness))?,
        };
        let year = coerce(record.get(self.year))?.trunc() as i32;

        Some(Song {
            id: id.to_string(),
            name: record.get(self.name)?.trim().to_string(),
            artists: parse_artists(record.get(self.artists)?),
            features,
            year,
        })
    }
}

/// Parses a field as a finite real number
fn coerce(field: Option<&str>) -> Option<f64> {
    field?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Strips list decoration from an artists field.
///
/// Accepts the serialized-list form found in exported datasets
/// (`['Frank Sinatra', "Guns N' Roses"]`) as well as plain comma separated
/// names. Commas inside quoted names are kept.
pub(crate) fn parse_artists(raw: &str) -> Vec<String> {
    let inner = raw
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']');

    let mut artists = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for c in inner.chars() {
        match quote {
            Some(open) if c == open => quote = None,
            Some(_) => current.push(c),
            None => match c {
                '\'' | '"' if current.trim().is_empty() => {
                    current.clear();
                    quote = Some(c);
                }
                ',' => push_artist(&mut artists, &mut current),
                _ => current.push(c),
            },
        }
    }
    push_artist(&mut artists, &mut current);

    artists
}

fn push_artist(artists: &mut Vec<String>, current: &mut String) {
    let name = current.trim();
    if !name.is_empty() {
        artists.push(name.to_string());
    }
    current.clear();
}
