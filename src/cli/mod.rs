//! Non-interactive command-line frontend: one command per invocation.

pub mod output;

use std::path::PathBuf;

use thiserror::Error;

use crate::{
    catalog::{MovieCatalog, MovieFilter},
    config::{CatalogConfig, ConfigManager},
    errors::{CatalogError, ConfigError, StorageError},
    storage::{open_storage, StorageFormat},
};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("invalid {what} `{value}`")]
    InvalidNumber { what: &'static str, value: String },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, CliError>;

const USAGE: &str = "Usage: movie_catalog_cli [--format json|csv] [--file PATH] <command>\n\
Commands:\n  \
list\n  \
add <title> <year> <rating> [poster]\n  \
delete <title>\n  \
update <title> <rating>\n  \
search <term>\n  \
filter [--min-rating R] [--from YEAR] [--to YEAR]\n  \
config show | config set-format <json|csv> | config set-file <path>\n  \
help";

/// Storage selection given on the command line, overriding the saved config.
#[derive(Debug, Default, Clone, PartialEq)]
struct GlobalOptions {
    format: Option<StorageFormat>,
    file: Option<PathBuf>,
}

impl GlobalOptions {
    /// Consumes leading `--format`/`--file` flags and returns the remaining
    /// tokens starting at the command name.
    fn parse(args: Vec<String>) -> Result<(Self, Vec<String>)> {
        let mut options = Self::default();
        let mut iter = args.into_iter().peekable();
        while let Some(flag) = iter.next_if(|arg| arg.starts_with("--")) {
            match flag.as_str() {
                "--format" => {
                    let value = require_value(&mut iter, "--format")?;
                    options.format = Some(value.parse()?);
                }
                "--file" => {
                    options.file = Some(PathBuf::from(require_value(&mut iter, "--file")?));
                }
                "--help" => return Ok((options, vec!["help".to_string()])),
                other => return Err(CliError::Usage(format!("unknown option `{other}`"))),
            }
        }
        Ok((options, iter.collect()))
    }

    /// Format: flag, then the `--file` extension, then the saved config.
    fn resolve(&self, config: &CatalogConfig, base: &std::path::Path) -> (StorageFormat, PathBuf) {
        let format = self
            .format
            .or_else(|| self.file.as_deref().and_then(StorageFormat::from_path))
            .unwrap_or(config.storage_format);
        let path = match &self.file {
            Some(file) => file.clone(),
            None => CatalogConfig {
                storage_format: format,
                data_file: config.data_file.clone(),
            }
            .resolve_data_file(base),
        };
        (format, path)
    }
}

fn require_value(iter: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    iter.next()
        .ok_or_else(|| CliError::Usage(format!("`{flag}` expects a value")))
}

fn parse_number<T: std::str::FromStr>(value: &str, what: &'static str) -> Result<T> {
    value.trim().parse().map_err(|_| CliError::InvalidNumber {
        what,
        value: value.to_string(),
    })
}

/// Runs one command against the configured catalog.
pub fn run_cli<I>(args: I) -> Result<()>
where
    I: IntoIterator<Item = String>,
{
    run_with_config(args, &ConfigManager::new())
}

pub fn run_with_config<I>(args: I, manager: &ConfigManager) -> Result<()>
where
    I: IntoIterator<Item = String>,
{
    let (options, rest) = GlobalOptions::parse(args.into_iter().collect())?;
    let mut rest = rest.into_iter();
    let command = match rest.next() {
        Some(command) => command,
        None => return Err(CliError::Usage(USAGE.to_string())),
    };
    let args: Vec<String> = rest.collect();

    match command.as_str() {
        "help" => {
            output::info(USAGE);
            return Ok(());
        }
        "config" => return run_config(&args, manager),
        _ => {}
    }

    let config = manager.load()?;
    let (format, path) = options.resolve(&config, manager.base_dir());
    tracing::debug!(%format, path = %path.display(), command = %command, "running command");
    let catalog = MovieCatalog::new(open_storage(format, &path)?);

    let outcome = match command.as_str() {
        "list" => list(&catalog),
        "add" => add(&catalog, &args),
        "delete" => delete(&catalog, &args),
        "update" => update(&catalog, &args),
        "search" => search(&catalog, &args),
        "filter" => filter(&catalog, &args),
        other => Err(CliError::Usage(format!(
            "unknown command `{other}`\n{USAGE}"
        ))),
    };
    if let Err(CliError::Catalog(CatalogError::NotFound {
        suggestion: Some(suggestion),
        ..
    })) = &outcome
    {
        output::info(format!("Did you mean \"{suggestion}\"?"));
    }
    outcome
}

fn list(catalog: &MovieCatalog) -> Result<()> {
    let entries = catalog.sorted_by_title();
    if entries.is_empty() {
        output::info("No movies in database.");
        return Ok(());
    }
    output::movie_list(&entries);
    output::info(format!("\n{} movie(s) in total.", entries.len()));
    Ok(())
}

fn add(catalog: &MovieCatalog, args: &[String]) -> Result<()> {
    let (title, year, rating, poster) = match args {
        [title, year, rating] => (title, year, rating, ""),
        [title, year, rating, poster] => (title, year, rating, poster.as_str()),
        _ => {
            return Err(CliError::Usage(
                "usage: add <title> <year> <rating> [poster]".into(),
            ))
        }
    };
    let year = parse_number(year, "year")?;
    let rating = parse_number(rating, "rating")?;
    let title = catalog.add(title, year, rating, poster)?;
    output::success(format!("Movie \"{title}\" successfully added."));
    Ok(())
}

fn delete(catalog: &MovieCatalog, args: &[String]) -> Result<()> {
    let [title] = args else {
        return Err(CliError::Usage("usage: delete <title>".into()));
    };
    let title = catalog.delete(title)?;
    output::success(format!("Movie \"{title}\" successfully deleted."));
    Ok(())
}

fn update(catalog: &MovieCatalog, args: &[String]) -> Result<()> {
    let [title, rating] = args else {
        return Err(CliError::Usage("usage: update <title> <rating>".into()));
    };
    let rating = parse_number(rating, "rating")?;
    let title = catalog.update(title, rating)?;
    output::success(format!("Movie \"{title}\" successfully updated."));
    Ok(())
}

fn search(catalog: &MovieCatalog, args: &[String]) -> Result<()> {
    let term = args.join(" ");
    let found = catalog.search(&term)?;
    if found.is_empty() {
        output::warning(format!("No movie found with \"{}\".", term.trim()));
        return Ok(());
    }
    output::movie_list(&found);
    Ok(())
}

fn filter(catalog: &MovieCatalog, args: &[String]) -> Result<()> {
    let mut criteria = MovieFilter::default();
    let mut iter = args.iter().cloned();
    while let Some(flag) = iter.next() {
        let value = require_value(&mut iter, &flag)?;
        match flag.as_str() {
            "--min-rating" => criteria.min_rating = Some(parse_number(&value, "rating")?),
            "--from" => criteria.start_year = Some(parse_number(&value, "year")?),
            "--to" => criteria.end_year = Some(parse_number(&value, "year")?),
            other => return Err(CliError::Usage(format!("unknown filter `{other}`"))),
        }
    }
    let matched = catalog.filter(&criteria)?;
    if matched.is_empty() {
        output::warning("No movies match the given criteria.");
        return Ok(());
    }
    output::section("Filtered movies");
    output::movie_list(&matched);
    Ok(())
}

fn run_config(args: &[String], manager: &ConfigManager) -> Result<()> {
    let mut config = manager.load()?;
    match args {
        [] => show_config(&config, manager),
        [cmd] if cmd == "show" => show_config(&config, manager),
        [cmd, value] if cmd == "set-format" => {
            config.storage_format = value.parse()?;
            manager.save(&config)?;
            output::success(format!("Storage format set to {}.", config.storage_format));
        }
        [cmd, value] if cmd == "set-file" => {
            config.data_file = Some(PathBuf::from(value));
            manager.save(&config)?;
            output::success(format!("Data file set to {value}."));
        }
        _ => {
            return Err(CliError::Usage(
                "usage: config show | config set-format <json|csv> | config set-file <path>"
                    .into(),
            ))
        }
    }
    Ok(())
}

fn show_config(config: &CatalogConfig, manager: &ConfigManager) {
    output::info(format!("format: {}", config.storage_format));
    output::info(format!(
        "file: {}",
        config.resolve_data_file(manager.base_dir()).display()
    ));
    output::info(format!("config: {}", manager.config_path().display()));
}
