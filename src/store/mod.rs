//! Feature Store: the cleaned, immutable song dataset and its numeric
//! feature matrix.
//!
//! Rows are aligned 1:1 between `songs()` and `feature_matrix()`; the
//! identifier index maps an id to that shared row position.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::StringRecord;
use nalgebra::DMatrix;

use crate::models::{AudioFeatures, Song};

mod loader;

use loader::ColumnIndex;
pub use loader::{LoadError, LoadReport};

/// Cleaned dataset, built once at startup and read-only afterwards
#[derive(Debug, Clone)]
pub struct FeatureStore {
    songs: Vec<Song>,
    /// Lowercased song names, aligned with `songs`
    names_lower: Vec<String>,
    index: HashMap<String, usize>,
    /// One row per song, columns per `AudioFeatures::SIMILARITY_COLUMNS`
    features: DMatrix<f64>,
    report: LoadReport,
}

impl FeatureStore {
    /// Builds a store from a header record and raw rows.
    ///
    /// Rows with any required numeric field that does not coerce to a finite
    /// number are dropped, as are rows repeating an already loaded identifier.
    /// Fails only when required columns are missing.
    pub fn load<I>(headers: &StringRecord, rows: I) -> Result<Self, LoadError>
    where
        I: IntoIterator<Item = StringRecord>,
    {
        Self::load_records(headers, rows.into_iter().map(Ok))
    }

    /// Reads CSV (header line first) and loads it
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LoadError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        Self::load_records(&headers, reader.into_records())
    }

    /// Opens and loads a CSV dataset file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;

        tracing::info!(path = %path.display(), "Loading dataset");
        Self::from_reader(BufReader::new(file))
    }

    fn load_records<I>(headers: &StringRecord, rows: I) -> Result<Self, LoadError>
    where
        I: IntoIterator<Item = Result<StringRecord, csv::Error>>,
    {
        let columns = ColumnIndex::resolve(headers)?;

        let mut report = LoadReport::default();
        let mut songs = Vec::new();
        let mut index = HashMap::new();

        for row in rows {
            report.total_rows += 1;

            let record = match row {
                Ok(record) => record,
                Err(e) if e.is_io_error() => return Err(LoadError::Csv(e)),
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping malformed record");
                    report.excluded_invalid += 1;
                    continue;
                }
            };

            let Some(song) = columns.parse_row(&record) else {
                report.excluded_invalid += 1;
                continue;
            };

            if index.contains_key(&song.id) {
                report.excluded_duplicate += 1;
                continue;
            }

            index.insert(song.id.clone(), songs.len());
            songs.push(song);
        }

        report.loaded = songs.len();

        if report.excluded() > 0 {
            tracing::warn!(
                excluded_invalid = report.excluded_invalid,
                excluded_duplicate = report.excluded_duplicate,
                "Excluded rows while loading dataset"
            );
        }
        tracing::info!(
            total_rows = report.total_rows,
            loaded = report.loaded,
            "Dataset loaded"
        );

        let features = DMatrix::from_row_iterator(
            songs.len(),
            AudioFeatures::SIMILARITY_DIMS,
            songs.iter().flat_map(|s| s.features.similarity_vector()),
        );
        let names_lower = songs.iter().map(|s| s.name.to_lowercase()).collect();

        Ok(Self {
            songs,
            names_lower,
            index,
            features,
            report,
        })
    }

    /// Exact identifier lookup
    pub fn lookup_by_id(&self, id: &str) -> Option<&Song> {
        self.position(id).map(|row| &self.songs[row])
    }

    /// Row position of a song within `songs()` and `feature_matrix()`
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Case-insensitive substring search over song names, in dataset order.
    ///
    /// A blank query matches nothing.
    pub fn search_by_name(&self, query: &str) -> Vec<&Song> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        self.names_lower
            .iter()
            .zip(&self.songs)
            .filter(|(name, _)| name.contains(&needle))
            .map(|(_, song)| song)
            .collect()
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn feature_matrix(&self) -> &DMatrix<f64> {
        &self.features
    }

    pub fn report(&self) -> LoadReport {
        self.report
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const FIXTURE: &str = include_str!("../../tests/fixtures/songs.csv");

    pub(crate) fn fixture_store() -> FeatureStore {
        FeatureStore::from_reader(FIXTURE.as_bytes()).unwrap()
    }

    const HEADER: &str = "id,name,artists,year,valence,acousticness,danceability,duration_ms,energy,instrumentalness,liveness,popularity,tempo\n";

    #[test]
    fn test_fixture_loads_every_row() {
        let store = fixture_store();
        assert_eq!(store.len(), 20);
        assert_eq!(
            store.report(),
            LoadReport {
                total_rows: 20,
                loaded: 20,
                excluded_invalid: 0,
                excluded_duplicate: 0,
            }
        );
    }

    #[test]
    fn test_load_drops_rows_failing_coercion() {
        let csv = format!(
            "{HEADER}\
             a,One,['X'],2001,0.5,0.1,0.2,1000,0.3,0.0,0.4,10,100\n\
             b,Two,['X'],2001,oops,0.1,0.2,1000,0.3,0.0,0.4,10,100\n\
             c,Three,['X'],2001,0.5,0.1,0.2,1000,0.3,0.0,0.4,,100\n\
             d,Four,['X'],2001,0.5,0.1,0.2,1000,NaN,0.0,0.4,10,100\n\
             e,Five,['X'],nineteen,0.5,0.1,0.2,1000,0.3,0.0,0.4,10,100\n\
             f,Six,['X'],2001,0.5,0.1,0.2,1000,0.3,0.0,0.4,10,100\n"
        );

        let store = FeatureStore::from_reader(csv.as_bytes()).unwrap();

        // 6 rows, 4 with a non-numeric required field
        assert_eq!(store.len(), 2);
        assert_eq!(store.report().total_rows, 6);
        assert_eq!(store.report().excluded_invalid, 4);
        assert!(store.contains("a"));
        assert!(store.contains("f"));
        assert!(!store.contains("b"));
    }

    #[test]
    fn test_load_counts_short_records_as_excluded() {
        let csv = format!(
            "{HEADER}\
             a,One,['X'],2001,0.5,0.1,0.2,1000,0.3,0.0,0.4,10,100\n\
             b,Two,['X']\n"
        );

        let store = FeatureStore::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.report().excluded_invalid, 1);
    }

    #[test]
    fn test_load_keeps_first_of_duplicate_ids() {
        let csv = format!(
            "{HEADER}\
             a,First,['X'],2001,0.5,0.1,0.2,1000,0.3,0.0,0.4,10,100\n\
             a,Second,['Y'],2002,0.9,0.1,0.2,1000,0.3,0.0,0.4,10,100\n"
        );

        let store = FeatureStore::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.report().excluded_duplicate, 1);
        assert_eq!(store.lookup_by_id("a").unwrap().name, "First");
    }

    #[test]
    fn test_load_fails_on_missing_columns() {
        let result = FeatureStore::from_reader("id,name,artists\na,One,X\n".as_bytes());
        assert!(matches!(result, Err(LoadError::MissingColumns(_))));
    }

    #[test]
    fn test_load_from_string_records() {
        let headers = StringRecord::from(HEADER.trim().split(',').collect::<Vec<_>>());
        let rows = vec![StringRecord::from(vec![
            "z", "Zed", "Solo", "2010", "0.5", "0.1", "0.2", "1000", "0.3", "0.0", "0.4", "10",
            "100",
        ])];

        let store = FeatureStore::load(&headers, rows).unwrap();
        assert_eq!(store.lookup_by_id("z").unwrap().artists, vec!["Solo"]);
    }

    #[test]
    fn test_from_path_missing_file() {
        let result = FeatureStore::from_path("/nonexistent/songs.csv");
        assert!(matches!(result, Err(LoadError::Io { .. })));
    }

    #[test]
    fn test_feature_matrix_aligned_with_songs() {
        let store = fixture_store();
        let matrix = store.feature_matrix();
        assert_eq!(matrix.nrows(), store.len());
        assert_eq!(matrix.ncols(), AudioFeatures::SIMILARITY_DIMS);

        let row = store.position("trk-07").unwrap();
        let song = &store.songs()[row];
        for (col, value) in song.features.similarity_vector().iter().enumerate() {
            assert_eq!(matrix[(row, col)], *value);
        }
    }

    #[test]
    fn test_lookup_by_id() {
        let store = fixture_store();
        let song = store.lookup_by_id("trk-02").unwrap();
        assert_eq!(song.name, "Neon Skyline");
        assert_eq!(song.artist_display(), "Sunset Avenue, Mara Lin");
        assert!(store.lookup_by_id("TRK-02").is_none());
        assert!(store.lookup_by_id("missing").is_none());
    }

    #[test]
    fn test_search_by_name_case_insensitive_in_row_order() {
        let store = fixture_store();
        let ids: Vec<&str> = store
            .search_by_name("STATIC")
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(ids, vec!["trk-05", "trk-13", "trk-17"]);
    }

    #[test]
    fn test_search_by_name_empty_and_unmatched() {
        let store = fixture_store();
        assert!(store.search_by_name("").is_empty());
        assert!(store.search_by_name("   ").is_empty());
        assert!(store.search_by_name("no such song").is_empty());
    }
}
