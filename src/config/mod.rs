use std::{
    env, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use dirs::home_dir;
use serde::{Deserialize, Serialize};

use crate::{errors::ConfigError, storage::StorageFormat, utils::persistence::write_atomic};

pub const HOME_ENV_VAR: &str = "MOVIE_CATALOG_HOME";
const DEFAULT_DIR_NAME: &str = ".movie_catalog";
const CONFIG_FILE: &str = "config.json";
const DEFAULT_DATA_STEM: &str = "movies";

/// Returns the application data directory: `$MOVIE_CATALOG_HOME` when set,
/// otherwise `~/.movie_catalog`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV_VAR) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Persisted user preferences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub storage_format: StorageFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
}

impl CatalogConfig {
    /// The configured data file, or `movies.<ext>` inside `base`.
    pub fn resolve_data_file(&self, base: &Path) -> PathBuf {
        self.data_file.clone().unwrap_or_else(|| {
            base.join(format!(
                "{}.{}",
                DEFAULT_DATA_STEM,
                self.storage_format.extension()
            ))
        })
    }
}

/// Loads and saves [`CatalogConfig`] as JSON under a base directory.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    base_dir: PathBuf,
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Self {
        let config_path = base.join(CONFIG_FILE);
        Self {
            base_dir: base,
            config_path,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> Result<CatalogConfig, ConfigError> {
        let data = match fs::read_to_string(&self.config_path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(CatalogConfig::default()),
            Err(err) => return Err(err.into()),
        };
        serde_json::from_str(&data).map_err(|err| ConfigError::Serde(err.to_string()))
    }

    pub fn save(&self, config: &CatalogConfig) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(config)
            .map_err(|err| ConfigError::Serde(err.to_string()))?;
        write_atomic(&self.config_path, json.as_bytes())?;
        tracing::debug!(path = %self.config_path.display(), "saved configuration");
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_config_loads_defaults() {
        let temp = TempDir::new().expect("temp dir");
        let manager = ConfigManager::with_base_dir(temp.path().join("home"));
        let config = manager.load().expect("load defaults");
        assert_eq!(config, CatalogConfig::default());
        assert!(!manager.config_path().exists());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let temp = TempDir::new().expect("temp dir");
        let manager = ConfigManager::with_base_dir(temp.path().join("home"));
        let config = CatalogConfig {
            storage_format: StorageFormat::Csv,
            data_file: Some(PathBuf::from("data/sara_movies.csv")),
        };
        manager.save(&config).expect("save config");
        assert_eq!(manager.load().expect("load config"), config);

        let raw = fs::read_to_string(manager.config_path()).unwrap();
        assert!(raw.contains("\"storage_format\": \"csv\""));
    }

    #[test]
    fn corrupt_config_is_an_error() {
        let temp = TempDir::new().expect("temp dir");
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf());
        fs::write(manager.config_path(), "{ nope").unwrap();
        assert!(matches!(manager.load(), Err(ConfigError::Serde(_))));
    }

    #[test]
    fn default_data_file_follows_format() {
        let base = Path::new("/tmp/catalog");
        let mut config = CatalogConfig::default();
        assert_eq!(config.resolve_data_file(base), base.join("movies.json"));
        config.storage_format = StorageFormat::Csv;
        assert_eq!(config.resolve_data_file(base), base.join("movies.csv"));
        config.data_file = Some(PathBuf::from("elsewhere.csv"));
        assert_eq!(config.resolve_data_file(base), PathBuf::from("elsewhere.csv"));
    }
}
