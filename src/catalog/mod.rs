//! Caller-side rules layered over a [`StorageBackend`].
//!
//! Backends match titles exactly and accept whatever they are given. The
//! catalog resolves user-typed titles case-insensitively, refuses duplicates
//! under a different casing and validates values before they reach storage.

pub mod validation;

use std::cmp::Ordering;

use strsim::levenshtein;

use crate::{
    errors::CatalogError,
    movie::{find_title, Movie, MovieCollection},
    storage::StorageBackend,
};

pub use validation::{validate_rating, validate_title, validate_year};

const SUGGESTION_MAX_DISTANCE: usize = 3;

pub type Result<T> = std::result::Result<T, CatalogError>;

/// A stored record paired with its key, as handed to presentation code.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieEntry {
    pub title: String,
    pub movie: Movie,
}

/// Optional bounds for [`MovieCatalog::filter`]; `None` means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MovieFilter {
    pub min_rating: Option<f64>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
}

impl MovieFilter {
    fn matches(&self, movie: &Movie) -> bool {
        self.min_rating.map_or(true, |min| movie.rating >= min)
            && self.start_year.map_or(true, |start| movie.year >= start)
            && self.end_year.map_or(true, |end| movie.year <= end)
    }
}

pub struct MovieCatalog {
    storage: Box<dyn StorageBackend>,
}

impl MovieCatalog {
    pub fn new(storage: Box<dyn StorageBackend>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &dyn StorageBackend {
        self.storage.as_ref()
    }

    pub fn movies(&self) -> MovieCollection {
        self.storage.list_movies()
    }

    /// Every record ordered by title, ignoring case.
    pub fn sorted_by_title(&self) -> Vec<MovieEntry> {
        sort_by_title(into_entries(self.movies()))
    }

    /// Maps a user-typed title to the key it is stored under.
    pub fn resolve_title(&self, query: &str) -> Option<String> {
        find_title(&self.movies(), query.trim()).map(str::to_string)
    }

    /// Adds a record after validating it. Returns the title as stored.
    pub fn add(&self, title: &str, year: i32, rating: f64, poster: &str) -> Result<String> {
        let title = validate_title(title)?;
        let year = validate_year(year)?;
        let rating = validate_rating(rating)?;

        let movies = self.movies();
        if let Some(existing) = find_title(&movies, &title) {
            return Err(CatalogError::DuplicateTitle(existing.to_string()));
        }
        self.storage.add_movie(&title, year, rating, poster.trim())?;
        tracing::info!(%title, year, rating, "movie added");
        Ok(title)
    }

    /// Deletes the record matching `title` in any casing. Returns the stored key.
    pub fn delete(&self, title: &str) -> Result<String> {
        let key = self.require_title(title)?;
        self.storage.delete_movie(&key)?;
        tracing::info!(title = %key, "movie deleted");
        Ok(key)
    }

    /// Sets the rating of the record matching `title` in any casing.
    pub fn update(&self, title: &str, rating: f64) -> Result<String> {
        let rating = validate_rating(rating)?;
        let key = self.require_title(title)?;
        self.storage.update_movie(&key, rating)?;
        tracing::info!(title = %key, rating, "movie updated");
        Ok(key)
    }

    /// Records whose title contains `term`, ignoring case.
    pub fn search(&self, term: &str) -> Result<Vec<MovieEntry>> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return Err(CatalogError::Validation(
                "search term cannot be empty".into(),
            ));
        }
        let found = into_entries(self.movies())
            .into_iter()
            .filter(|entry| entry.title.to_lowercase().contains(&needle))
            .collect();
        Ok(sort_by_title(found))
    }

    pub fn filter(&self, filter: &MovieFilter) -> Result<Vec<MovieEntry>> {
        if let (Some(start), Some(end)) = (filter.start_year, filter.end_year) {
            if start > end {
                return Err(CatalogError::Validation(
                    "start year cannot be after end year".into(),
                ));
            }
        }
        let matched = into_entries(self.movies())
            .into_iter()
            .filter(|entry| filter.matches(&entry.movie))
            .collect();
        Ok(sort_by_title(matched))
    }

    fn require_title(&self, query: &str) -> Result<String> {
        let movies = self.movies();
        match find_title(&movies, query.trim()) {
            Some(key) => Ok(key.to_string()),
            None => Err(CatalogError::NotFound {
                title: query.trim().to_string(),
                suggestion: closest_title(&movies, query),
            }),
        }
    }
}

fn into_entries(movies: MovieCollection) -> Vec<MovieEntry> {
    movies
        .into_iter()
        .map(|(title, movie)| MovieEntry { title, movie })
        .collect()
}

fn sort_by_title(mut entries: Vec<MovieEntry>) -> Vec<MovieEntry> {
    entries.sort_by(|a, b| compare_titles(&a.title, &b.title));
    entries
}

fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Closest stored title within a small edit distance, compared in lowercase.
fn closest_title(movies: &MovieCollection, query: &str) -> Option<String> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    movies
        .keys()
        .map(|title| (levenshtein(&title.to_lowercase(), &needle), title))
        .filter(|(distance, _)| *distance <= SUGGESTION_MAX_DISTANCE)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, title)| title.clone())
}
