use crate::persistence::{BoxedStore, PersistenceResult, SpreadsheetStore};
use crate::planner::PlannerSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_PATH_ENV: &str = "WORKLOAD_PLANNER_CONFIG";
pub const HTTP_ADDR_ENV: &str = "WORKLOAD_PLANNER_HTTP_ADDR";
pub const DATA_DIR_ENV: &str = "WORKLOAD_PLANNER_DATA_DIR";
pub const STORAGE_ENV: &str = "WORKLOAD_PLANNER_STORAGE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    Spreadsheet,
    Sqlite,
}

impl std::str::FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "spreadsheet" | "csv" => Ok(StorageBackend::Spreadsheet),
            "sqlite" => Ok(StorageBackend::Sqlite),
            other => Err(ConfigError::Invalid(format!(
                "unknown storage backend '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub http_addr: SocketAddr,
    pub data_dir: PathBuf,
    pub storage: StorageBackend,
    pub planner: PlannerSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            data_dir: PathBuf::from("data"),
            storage: StorageBackend::default(),
            planner: PlannerSettings::default(),
        }
    }
}

impl AppConfig {
    /// Reads the file named by `WORKLOAD_PLANNER_CONFIG` (if any), then applies env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        Self::from_sources(path.as_deref(), |key| std::env::var(key).ok())
    }

    pub fn from_sources<F>(path: Option<&Path>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(addr) = env(HTTP_ADDR_ENV) {
            config.http_addr = addr.trim().parse().map_err(|err| {
                ConfigError::Invalid(format!("{HTTP_ADDR_ENV}='{addr}': {err}"))
            })?;
        }
        if let Some(dir) = env(DATA_DIR_ENV) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(storage) = env(STORAGE_ENV) {
            config.storage = storage.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.planner
            .validate()
            .map_err(|err| ConfigError::Invalid(err.to_string()))
    }

    /// Opens the configured store under `data_dir`.
    pub fn open_store(&self) -> PersistenceResult<BoxedStore> {
        match self.storage {
            StorageBackend::Spreadsheet => Ok(Box::new(SpreadsheetStore::open(&self.data_dir)?)),
            StorageBackend::Sqlite => self.open_sqlite(),
        }
    }

    #[cfg(feature = "sqlite")]
    fn open_sqlite(&self) -> PersistenceResult<BoxedStore> {
        fs::create_dir_all(&self.data_dir)?;
        let store = crate::persistence::sqlite::SqliteStore::new(self.data_dir.join("workload.db"))?;
        Ok(Box::new(store))
    }

    #[cfg(not(feature = "sqlite"))]
    fn open_sqlite(&self) -> PersistenceResult<BoxedStore> {
        Err(crate::persistence::PersistenceError::InvalidData(
            "sqlite storage requires the `sqlite` feature".into(),
        ))
    }
}
