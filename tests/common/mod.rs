use std::path::PathBuf;

use movie_catalog::{open_storage, StorageBackend, StorageFormat};
use tempfile::TempDir;

/// Both backends over fresh files in an isolated directory. The `TempDir`
/// guard must outlive the backends.
pub fn backends() -> (Vec<(StorageFormat, Box<dyn StorageBackend>)>, TempDir) {
    let temp = TempDir::new().expect("create temp dir");
    let backends = [StorageFormat::Json, StorageFormat::Csv]
        .into_iter()
        .map(|format| {
            let path = data_file(&temp, format);
            let storage = open_storage(format, &path).expect("open storage");
            (format, storage)
        })
        .collect();
    (backends, temp)
}

pub fn data_file(temp: &TempDir, format: StorageFormat) -> PathBuf {
    temp.path()
        .join("data")
        .join(format!("movies.{}", format.extension()))
}
