use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Stored attributes of a single movie. The title is the key of the owning
/// [`MovieCollection`] and is not repeated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    #[serde(default, alias = "Year")]
    pub year: i32,
    #[serde(default, alias = "Rating")]
    pub rating: f64,
    #[serde(default, alias = "Poster")]
    pub poster: String,
}

impl Movie {
    pub fn new(year: i32, rating: f64, poster: impl Into<String>) -> Self {
        Self {
            year,
            rating,
            poster: poster.into(),
        }
    }

    pub fn has_poster(&self) -> bool {
        !self.poster.trim().is_empty()
    }
}

/// Title-keyed collection as returned by every backend. Keys keep the casing
/// they were first written with.
pub type MovieCollection = BTreeMap<String, Movie>;

/// Finds the stored key matching `query` case-insensitively.
pub fn find_title<'a>(movies: &'a MovieCollection, query: &str) -> Option<&'a str> {
    if query.is_empty() {
        return None;
    }
    let needle = query.to_lowercase();
    movies
        .keys()
        .find(|title| title.to_lowercase() == needle)
        .map(String::as_str)
}
