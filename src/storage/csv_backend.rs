use std::{
    fs::{File, OpenOptions},
    io::ErrorKind,
    path::{Path, PathBuf},
};

use csv::{ReaderBuilder, StringRecord, WriterBuilder};

use crate::{
    errors::StorageError,
    movie::{Movie, MovieCollection},
    utils::persistence::{ensure_parent_dir, write_atomic},
};

use super::{Result, StorageBackend};

pub const HEADER: [&str; 4] = ["title", "year", "rating", "poster"];

/// Stores the collection as CSV rows under a fixed header.
///
/// The format has no unique index: `add_movie` appends without looking for an
/// existing row, `list_movies` lets later rows win, and `update_movie` only
/// touches the first matching row. Callers are expected to check for an
/// existing title before adding.
#[derive(Debug, Clone)]
pub struct CsvStorage {
    path: PathBuf,
}

/// One data row with its cells kept as raw text, in header order.
#[derive(Debug, Clone, PartialEq)]
struct CsvRow {
    line: u64,
    title: String,
    year: String,
    rating: String,
    poster: String,
}

/// Positions of the required columns in the file's header.
struct Columns {
    title: usize,
    year: usize,
    rating: usize,
    poster: usize,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|header| header.trim() == name)
                .ok_or_else(|| StorageError::MissingColumn(name.to_string()))
        };
        Ok(Self {
            title: find("title")?,
            year: find("year")?,
            rating: find("rating")?,
            poster: find("poster")?,
        })
    }

    fn project(&self, record: &StringRecord) -> CsvRow {
        let cell = |idx: usize| record.get(idx).unwrap_or_default().to_string();
        CsvRow {
            line: record.position().map(|pos| pos.line()).unwrap_or_default(),
            title: cell(self.title),
            year: cell(self.year),
            rating: cell(self.rating),
            poster: cell(self.poster),
        }
    }
}

impl CsvRow {
    fn to_movie(&self) -> Result<Movie> {
        let year = parse_cell(&self.year, "year", self.line)?;
        let rating = parse_cell(&self.rating, "rating", self.line)?;
        Ok(Movie::new(year, rating, self.poster.clone()))
    }

    fn cells(&self) -> [&str; 4] {
        [
            self.title.as_str(),
            self.year.as_str(),
            self.rating.as_str(),
            self.poster.as_str(),
        ]
    }
}

/// Blank cells read as the type's zero value.
fn parse_cell<T>(raw: &str, field: &'static str, row: u64) -> Result<T>
where
    T: std::str::FromStr + Default,
{
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(T::default());
    }
    trimmed.parse().map_err(|_| StorageError::InvalidCell {
        field,
        value: raw.to_string(),
        row,
    })
}

/// Text form of a rating cell. Whole numbers keep a trailing `.0`.
pub fn format_rating(rating: f64) -> String {
    format!("{:?}", rating)
}

impl CsvStorage {
    /// Opens the CSV file at `path`, creating it with only the header row when
    /// it does not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let storage = Self { path: path.into() };
        if !storage.path.exists() {
            write_atomic(&storage.path, &header_bytes()?)?;
            tracing::info!(path = %storage.path.display(), "created movie file");
        }
        Ok(storage)
    }

    /// Reads every row without interpreting numeric cells. `None` when the file
    /// does not exist.
    fn load_rows(&self) -> Result<Option<Vec<CsvRow>>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let mut reader = ReaderBuilder::new().flexible(true).from_reader(file);
        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Ok(Some(Vec::new()));
        }
        let columns = Columns::locate(&headers)?;
        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(columns.project(&record?));
        }
        Ok(Some(rows))
    }

    fn load(&self) -> Result<MovieCollection> {
        let mut movies = MovieCollection::new();
        for row in self.load_rows()?.unwrap_or_default() {
            let movie = row.to_movie()?;
            movies.insert(row.title, movie);
        }
        Ok(movies)
    }

    fn rewrite(&self, rows: &[CsvRow]) -> Result<()> {
        let mut writer = WriterBuilder::new().from_writer(Vec::new());
        writer.write_record(HEADER)?;
        for row in rows {
            writer.write_record(row.cells())?;
        }
        let data = writer
            .into_inner()
            .map_err(|err| StorageError::Io(err.into_error()))?;
        write_atomic(&self.path, &data)?;
        tracing::debug!(path = %self.path.display(), rows = rows.len(), "rewrote movie file");
        Ok(())
    }
}

fn header_bytes() -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(HEADER)?;
    writer
        .into_inner()
        .map_err(|err| StorageError::Io(err.into_error()))
}

impl StorageBackend for CsvStorage {
    fn list_movies(&self) -> MovieCollection {
        match self.load() {
            Ok(movies) => movies,
            Err(StorageError::Io(err)) => {
                tracing::error!(path = %self.path.display(), error = %err, "could not read movie file");
                MovieCollection::new()
            }
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "could not parse movie file, it may be corrupted"
                );
                MovieCollection::new()
            }
        }
    }

    fn add_movie(&self, title: &str, year: i32, rating: f64, poster: &str) -> Result<()> {
        ensure_parent_dir(&self.path)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let needs_header = file.metadata()?.len() == 0;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        if needs_header {
            writer.write_record(HEADER)?;
        }
        writer.write_record([
            title,
            year.to_string().as_str(),
            format_rating(rating).as_str(),
            poster,
        ])?;
        writer.flush()?;
        tracing::debug!(path = %self.path.display(), title, "appended movie row");
        Ok(())
    }

    fn delete_movie(&self, title: &str) -> Result<()> {
        let Some(rows) = self.load_rows()? else {
            return Ok(());
        };
        let before = rows.len();
        let kept: Vec<CsvRow> = rows.into_iter().filter(|row| row.title != title).collect();
        if kept.len() == before {
            return Ok(());
        }
        self.rewrite(&kept)
    }

    fn update_movie(&self, title: &str, rating: f64) -> Result<()> {
        let Some(mut rows) = self.load_rows()? else {
            return Ok(());
        };
        match rows.iter_mut().find(|row| row.title == title) {
            Some(row) => row.rating = format_rating(rating),
            None => return Ok(()),
        }
        self.rewrite(&rows)
    }

    fn path(&self) -> &Path {
        &self.path
    }
}
