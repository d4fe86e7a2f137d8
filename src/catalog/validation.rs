use chrono::{Datelike, Local};

use crate::errors::CatalogError;

/// Year of the first motion picture.
pub const EARLIEST_MOVIE_YEAR: i32 = 1888;
pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 10.0;

pub fn validate_title(title: &str) -> Result<String, CatalogError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(CatalogError::Validation("title cannot be empty".into()));
    }
    Ok(trimmed.to_string())
}

pub fn validate_year(year: i32) -> Result<i32, CatalogError> {
    let current_year = Local::now().year();
    if !(EARLIEST_MOVIE_YEAR..=current_year).contains(&year) {
        return Err(CatalogError::Validation(format!(
            "year must be between {} and {}",
            EARLIEST_MOVIE_YEAR, current_year
        )));
    }
    Ok(year)
}

/// Checks the range and rounds to one decimal place.
pub fn validate_rating(rating: f64) -> Result<f64, CatalogError> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(CatalogError::Validation(format!(
            "rating must be between {:.1} and {:.1}",
            MIN_RATING, MAX_RATING
        )));
    }
    Ok((rating * 10.0).round() / 10.0)
}
