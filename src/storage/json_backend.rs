use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::{ser::Serialize, Deserialize};
use serde_json::ser::PrettyFormatter;

use crate::{
    errors::StorageError,
    movie::{Movie, MovieCollection},
    utils::persistence::write_atomic,
};

use super::{Result, StorageBackend};

const INDENT: &[u8] = b"    ";

/// Stores the collection as one JSON object keyed by title.
///
/// The file is only created by the first successful write; reading a missing
/// file is not an error.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    path: PathBuf,
}

/// Accepted top-level shapes. Older files nest the map under a single
/// `"Movies"` key; only the plain map is ever written.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredDocument {
    Wrapped(WrappedDocument),
    Plain(MovieCollection),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct WrappedDocument {
    #[serde(rename = "Movies")]
    movies: MovieCollection,
}

impl StoredDocument {
    fn into_collection(self) -> MovieCollection {
        match self {
            StoredDocument::Wrapped(document) => document.movies,
            StoredDocument::Plain(movies) => movies,
        }
    }
}

impl JsonStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Strict read used by the mutating operations: corrupt content is an
    /// error here so a write never replaces data it could not parse.
    fn load(&self) -> Result<MovieCollection> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(MovieCollection::new()),
            Err(err) => return Err(err.into()),
        };
        let document: StoredDocument = serde_json::from_str(&data)?;
        Ok(document.into_collection())
    }

    fn save(&self, movies: &MovieCollection) -> Result<()> {
        let mut buffer = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(INDENT));
        movies.serialize(&mut serializer)?;
        buffer.push(b'\n');
        write_atomic(&self.path, &buffer)?;
        tracing::debug!(path = %self.path.display(), count = movies.len(), "saved movies");
        Ok(())
    }
}

/// JSON has no literal for NaN or infinity; `serde_json` would write `null`
/// and the file would no longer parse.
fn ensure_finite(rating: f64) -> Result<()> {
    if rating.is_finite() {
        Ok(())
    } else {
        Err(StorageError::NonFiniteRating(rating))
    }
}

impl StorageBackend for JsonStorage {
    fn list_movies(&self) -> MovieCollection {
        match self.load() {
            Ok(movies) => movies,
            Err(StorageError::Json(err)) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "could not parse movie file, it may be corrupted"
                );
                MovieCollection::new()
            }
            Err(err) => {
                tracing::error!(path = %self.path.display(), error = %err, "could not read movie file");
                MovieCollection::new()
            }
        }
    }

    fn add_movie(&self, title: &str, year: i32, rating: f64, poster: &str) -> Result<()> {
        ensure_finite(rating)?;
        let mut movies = self.load()?;
        movies.insert(title.to_string(), Movie::new(year, rating, poster));
        self.save(&movies)
    }

    fn delete_movie(&self, title: &str) -> Result<()> {
        let mut movies = self.load()?;
        if movies.remove(title).is_some() {
            self.save(&movies)?;
        }
        Ok(())
    }

    fn update_movie(&self, title: &str, rating: f64) -> Result<()> {
        ensure_finite(rating)?;
        let mut movies = self.load()?;
        match movies.get_mut(title) {
            Some(movie) => movie.rating = rating,
            None => return Ok(()),
        }
        self.save(&movies)
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage_with_temp_dir() -> (JsonStorage, TempDir) {
        let temp = TempDir::new().expect("temp dir");
        let storage = JsonStorage::new(temp.path().join("data").join("movies.json"));
        (storage, temp)
    }

    #[test]
    fn reads_legacy_wrapped_document() {
        let (storage, _guard) = storage_with_temp_dir();
        fs::create_dir_all(storage.path().parent().unwrap()).unwrap();
        fs::write(
            storage.path(),
            r#"{"Movies": {"Titanic": {"year": 1997, "rating": 7.9, "poster": ""}}}"#,
        )
        .unwrap();

        let movies = storage.list_movies();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies["Titanic"], Movie::new(1997, 7.9, ""));
    }

    #[test]
    fn rewrites_legacy_document_unwrapped() {
        let (storage, _guard) = storage_with_temp_dir();
        fs::create_dir_all(storage.path().parent().unwrap()).unwrap();
        fs::write(
            storage.path(),
            r#"{"Movies": {"Titanic": {"year": 1997, "rating": 7.9, "poster": ""}}}"#,
        )
        .unwrap();

        storage.update_movie("Titanic", 8.0).expect("update");

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(storage.path()).unwrap()).unwrap();
        assert!(raw.get("Movies").is_none());
        assert_eq!(raw["Titanic"]["rating"], serde_json::json!(8.0));
    }

    #[test]
    fn reads_capitalized_wrapped_document_without_posters() {
        let (storage, _guard) = storage_with_temp_dir();
        fs::create_dir_all(storage.path().parent().unwrap()).unwrap();
        fs::write(
            storage.path(),
            r#"{"Movies": {"Titanic": {"Year": 1997, "Rating": 7.9}, "Heat": {"Year": 1995, "Rating": 8.3}}}"#,
        )
        .unwrap();

        let movies = storage.list_movies();
        assert_eq!(movies.len(), 2);
        assert_eq!(movies["Titanic"], Movie::new(1997, 7.9, ""));
        assert_eq!(movies["Heat"], Movie::new(1995, 8.3, ""));

        storage.add_movie("Ronin", 1998, 7.2, "").expect("add");
        let raw = fs::read_to_string(storage.path()).unwrap();
        assert!(raw.contains("\"year\": 1997"));
        assert_eq!(storage.list_movies().len(), 3);
    }

    #[test]
    fn non_finite_rating_is_rejected_without_losing_records() {
        let (storage, _guard) = storage_with_temp_dir();
        storage.add_movie("Heat", 1995, 8.3, "").expect("add");
        let before = fs::read(storage.path()).unwrap();

        for rating in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                storage.add_movie("Weird", 2000, rating, ""),
                Err(StorageError::NonFiniteRating(_))
            ));
            assert!(matches!(
                storage.update_movie("Heat", rating),
                Err(StorageError::NonFiniteRating(_))
            ));
        }

        assert_eq!(fs::read(storage.path()).unwrap(), before);
        assert_eq!(storage.list_movies()["Heat"], Movie::new(1995, 8.3, ""));
        storage.add_movie("Ronin", 1998, 7.2, "").expect("later add");
        assert_eq!(storage.list_movies().len(), 2);
    }

    #[test]
    fn movie_titled_movies_is_not_mistaken_for_wrapper() {
        let (storage, _guard) = storage_with_temp_dir();
        storage.add_movie("Movies", 2005, 6.0, "").expect("add");

        let movies = storage.list_movies();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies["Movies"].year, 2005);
    }

    #[test]
    fn writes_four_space_indentation() {
        let (storage, _guard) = storage_with_temp_dir();
        storage.add_movie("Up", 2009, 8.3, "").expect("add");

        let contents = fs::read_to_string(storage.path()).unwrap();
        assert!(contents.starts_with("{\n    \"Up\": {\n        \"year\": 2009,"));
    }

    #[test]
    fn mutation_refuses_to_overwrite_corrupt_file() {
        let (storage, _guard) = storage_with_temp_dir();
        fs::create_dir_all(storage.path().parent().unwrap()).unwrap();
        fs::write(storage.path(), b"{ not json").unwrap();

        let result = storage.add_movie("Up", 2009, 8.3, "");
        assert!(matches!(result, Err(StorageError::Json(_))));
        assert_eq!(fs::read(storage.path()).unwrap(), b"{ not json");
    }

    #[test]
    fn update_missing_title_does_not_create_file() {
        let (storage, _guard) = storage_with_temp_dir();
        storage.update_movie("Nothing", 5.0).expect("no-op");
        storage.delete_movie("Nothing").expect("no-op");
        assert!(!storage.path().exists());
    }
}
