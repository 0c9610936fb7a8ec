use crate::output::print_json;
use anyhow::Context;
use clap::ValueEnum;
use std::path::{Path, PathBuf};
use strata_core::{config::CONFIG_FILE, Config, StoreConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    File,
    Sqlite,
    Memory,
}

const DEFAULT_SQLITE_FILE: &str = "strata.db";

impl Backend {
    fn store_config(self, path: Option<PathBuf>) -> StoreConfig {
        match self {
            Backend::File => match path {
                Some(path) => StoreConfig::File { path },
                None => StoreConfig::default(),
            },
            Backend::Sqlite => StoreConfig::Sqlite {
                path: path.unwrap_or_else(|| PathBuf::from(DEFAULT_SQLITE_FILE)),
            },
            Backend::Memory => StoreConfig::Memory,
        }
    }
}

pub fn run(root: &Path, backend: Backend, path: Option<PathBuf>, json: bool) -> anyhow::Result<()> {
    let config_path = Config::path(root);
    let created = !config_path.exists();

    let config = if created {
        let config = Config {
            store: backend.store_config(path),
        };
        config
            .save(root)
            .with_context(|| format!("failed to write {}", config_path.display()))?;
        config
    } else {
        Config::load(root).context("failed to load strata.yaml")?
    };

    if json {
        #[derive(serde::Serialize)]
        struct InitOutput<'a> {
            created: bool,
            store: &'a StoreConfig,
        }
        return print_json(&InitOutput {
            created,
            store: &config.store,
        });
    }

    if created {
        println!("created: {CONFIG_FILE}");
    } else {
        println!("exists:  {CONFIG_FILE}");
    }
    Ok(())
}
