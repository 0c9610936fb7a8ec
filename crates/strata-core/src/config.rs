use crate::io;
use crate::store::{FileStore, MemoryStore, SqlStore, Store, StoreError, DEFAULT_STATE_FILE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

pub const CONFIG_FILE: &str = "strata.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to open store")]
    Store(#[source] StoreError),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

// ---------------------------------------------------------------------------
// StoreConfig
// ---------------------------------------------------------------------------

/// Which backend records applied migrations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreConfig {
    File {
        #[serde(default = "default_state_file")]
        path: PathBuf,
    },
    Sqlite {
        path: PathBuf,
    },
    Memory,
}

fn default_state_file() -> PathBuf {
    PathBuf::from(DEFAULT_STATE_FILE)
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::File {
            path: default_state_file(),
        }
    }
}

impl StoreConfig {
    /// Build the configured store. Relative paths resolve against `root`.
    pub fn open(&self, root: &Path) -> Result<Arc<dyn Store>> {
        let store: Arc<dyn Store> = match self {
            StoreConfig::File { path } => Arc::new(FileStore::new(root.join(path))),
            StoreConfig::Sqlite { path } => {
                let path = root.join(path);
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                Arc::new(SqlStore::open(&path).map_err(ConfigError::Store)?)
            }
            StoreConfig::Memory => Arc::new(MemoryStore::new()),
        };
        Ok(store)
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
}

impl Config {
    pub fn path(root: &Path) -> PathBuf {
        root.join(CONFIG_FILE)
    }

    /// Load `strata.yaml` from `root`, or the defaults when it does not exist.
    pub fn load(root: &Path) -> Result<Self> {
        match io::read_if_exists(&Self::path(root))? {
            Some(buf) => Ok(serde_yaml::from_slice(&buf)?),
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        io::atomic_write(&Self::path(root), data.as_bytes())?;
        Ok(())
    }
}
