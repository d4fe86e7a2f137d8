//! Movie Catalog keeps a small collection of movie records in a flat JSON or
//! CSV file and exposes the storage contract, the catalog rules layered over it
//! and a command-line frontend.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod errors;
pub mod movie;
pub mod storage;
pub mod utils;

use std::sync::Once;

pub use catalog::{MovieCatalog, MovieEntry, MovieFilter};
pub use errors::{CatalogError, ConfigError, StorageError};
pub use movie::{Movie, MovieCollection};
pub use storage::{open_storage, CsvStorage, JsonStorage, StorageBackend, StorageFormat};

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup debug log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::debug!("Movie Catalog tracing initialized.");
    });
}
