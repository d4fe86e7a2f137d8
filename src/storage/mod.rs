pub mod csv_backend;
pub mod json_backend;

use std::{fmt, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{errors::StorageError, movie::MovieCollection};

pub use csv_backend::CsvStorage;
pub use json_backend::JsonStorage;

pub type Result<T> = std::result::Result<T, StorageError>;

/// Abstraction over flat-file backends holding a movie collection.
///
/// Every call reloads the whole file, applies its change and writes the whole
/// file back; nothing is cached between calls. Mutations match titles exactly
/// (case included). Resolving a user-typed title to the stored key is the
/// caller's job, see [`crate::catalog::MovieCatalog`].
pub trait StorageBackend: Send + Sync {
    /// Returns every stored record. A missing file yields an empty collection;
    /// an unreadable or corrupt file is logged and also yields an empty
    /// collection.
    fn list_movies(&self) -> MovieCollection;

    /// Stores a record under `title`. Input is trusted as-is.
    fn add_movie(&self, title: &str, year: i32, rating: f64, poster: &str) -> Result<()>;

    /// Removes the record stored under exactly `title`. Absent titles are a no-op.
    fn delete_movie(&self, title: &str) -> Result<()>;

    /// Overwrites the rating of the record stored under exactly `title`.
    /// Absent titles are a no-op.
    fn update_movie(&self, title: &str, rating: f64) -> Result<()>;

    /// Backing file of this backend.
    fn path(&self) -> &Path;
}

/// On-disk format of the backing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageFormat {
    #[default]
    Json,
    Csv,
}

impl StorageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            StorageFormat::Json => "json",
            StorageFormat::Csv => "csv",
        }
    }

    /// Guesses the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl fmt::Display for StorageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for StorageFormat {
    type Err = StorageError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(StorageFormat::Json),
            "csv" => Ok(StorageFormat::Csv),
            other => Err(StorageError::UnknownFormat(other.to_string())),
        }
    }
}

/// Builds the backend for `format` over the file at `path`.
///
/// The CSV backend creates its file up front, so this can fail; the JSON
/// backend defers file creation to the first write.
pub fn open_storage(format: StorageFormat, path: &Path) -> Result<Box<dyn StorageBackend>> {
    let storage: Box<dyn StorageBackend> = match format {
        StorageFormat::Json => Box::new(JsonStorage::new(path)),
        StorageFormat::Csv => Box::new(CsvStorage::new(path)?),
    };
    tracing::debug!(%format, path = %path.display(), "opened movie storage");
    Ok(storage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn format_parses_case_insensitively() {
        assert_eq!("JSON".parse::<StorageFormat>().unwrap(), StorageFormat::Json);
        assert_eq!(" csv ".parse::<StorageFormat>().unwrap(), StorageFormat::Csv);
        assert!(matches!(
            "yaml".parse::<StorageFormat>(),
            Err(StorageError::UnknownFormat(value)) if value == "yaml"
        ));
    }

    #[test]
    fn format_is_guessed_from_extension() {
        assert_eq!(
            StorageFormat::from_path(&PathBuf::from("data/sara_movies.csv")),
            Some(StorageFormat::Csv)
        );
        assert_eq!(
            StorageFormat::from_path(&PathBuf::from("data/john_movies.json")),
            Some(StorageFormat::Json)
        );
        assert_eq!(StorageFormat::from_path(&PathBuf::from("movies.txt")), None);
    }

    #[test]
    fn open_storage_dispatches_on_format() {
        let temp = TempDir::new().expect("temp dir");
        let json_path = temp.path().join("movies.json");
        let csv_path = temp.path().join("movies.csv");

        let json = open_storage(StorageFormat::Json, &json_path).expect("json storage");
        let csv = open_storage(StorageFormat::Csv, &csv_path).expect("csv storage");

        assert_eq!(json.path(), json_path.as_path());
        assert_eq!(csv.path(), csv_path.as_path());
        assert!(!json_path.exists());
        assert!(csv_path.exists());
    }
}
