pub mod init;
pub mod run;
pub mod status;

use anyhow::Context;
use std::path::Path;
use strata_core::{Config, Migrator};

/// Build an engine over the configured store with the built-in migrations registered.
pub fn migrator(root: &Path) -> anyhow::Result<Migrator> {
    let config = Config::load(root).context("failed to load strata.yaml")?;
    let store = config
        .store
        .open(root)
        .context("failed to open migration store")?;
    let mut migrator = Migrator::new(store);
    crate::migrations::register(&mut migrator, root);
    Ok(migrator)
}
