//! The migration engine.
//!
//! A [`Migrator`] owns an ordered registry of migrations and a shared
//! [`Store`]. Each top-level operation initializes the store once per
//! engine, takes the store's lock when it has one, asks the store which ids
//! are applied, and then walks the registry forward (`migrate`) or backward
//! (`rollback`), stopping at the first failure.

use crate::error::{Error, Result};
use crate::migration::{Direction, Migration, Register, Step};
use crate::store::{FileStore, Locker, Store};
use chrono::Utc;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

/// Whether a registered migration is currently applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationStatus {
    pub id: String,
    pub applied: bool,
}

/// Releases the store lock when dropped, on every exit path.
struct LockGuard<'a> {
    locker: &'a dyn Locker,
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.locker.unlock() {
            tracing::warn!(error = %e, "failed to release migration lock");
        }
    }
}

pub struct Migrator {
    /// Set once the store initialized successfully; never reset.
    initialized: bool,
    migrations: Vec<Migration>,
    store: Arc<dyn Store>,
}

impl Migrator {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            initialized: false,
            migrations: Vec::new(),
            store,
        }
    }

    /// An engine backed by a [`FileStore`] at the default `.strata` path.
    pub fn with_default_store() -> Self {
        Self::new(Arc::new(FileStore::default()))
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    /// Registered ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.migrations.iter().map(Migration::id)
    }

    /// Apply every outstanding migration in registration order.
    ///
    /// Returns how many were applied. With `redo_last` set and nothing
    /// outstanding, the last registered migration is reverted and applied
    /// again; the redo is not counted.
    pub fn migrate(&mut self, redo_last: bool) -> Result<usize> {
        self.ensure_initialized()?;
        let _guard = self.lock()?;

        let outstanding = self.outstanding()?;
        for migration in &outstanding {
            self.execute(migration, Direction::Up)?;
        }

        let applied = outstanding.len();
        if applied == 0 && redo_last {
            if let Some(last) = self.migrations.last() {
                tracing::info!(id = %last.id(), "nothing outstanding, redoing last migration");
                self.execute(last, Direction::Down)?;
                self.execute(last, Direction::Up)?;
            }
        }

        tracing::debug!(applied, "migrate finished");
        Ok(applied)
    }

    /// Revert applied migrations newest-first, down to and including `target_id`.
    ///
    /// If `target_id` is not among the applied migrations there is no stop
    /// point and every applied migration is reverted.
    pub fn rollback(&mut self, target_id: &str) -> Result<()> {
        self.ensure_initialized()?;
        let _guard = self.lock()?;

        if !self.migrations.iter().any(|m| m.id() == target_id) {
            tracing::warn!(
                target_id,
                "rollback target is not registered, reverting all applied migrations"
            );
        }

        for migration in self.revertable(target_id)? {
            self.execute(migration, Direction::Down)?;
        }
        Ok(())
    }

    /// Revert everything, back through the first registered migration.
    pub fn reset(&mut self) -> Result<()> {
        self.ensure_initialized()?;
        let Some(first) = self.migrations.first() else {
            return Ok(());
        };
        let target = first.id().to_owned();
        self.rollback(&target)
    }

    /// [`reset`](Self::reset) followed by [`migrate`](Self::migrate).
    ///
    /// The store lock is released between the two phases.
    pub fn refresh(&mut self) -> Result<()> {
        self.ensure_initialized()?;
        self.reset()?;
        self.migrate(false)?;
        Ok(())
    }

    /// Applied state of every registered migration, in registration order.
    pub fn status(&mut self) -> Result<Vec<MigrationStatus>> {
        self.ensure_initialized()?;
        let applied = self.applied_ids()?;
        Ok(self
            .migrations
            .iter()
            .map(|m| MigrationStatus {
                id: m.id().to_owned(),
                applied: applied.contains(m.id()),
            })
            .collect())
    }

    fn ensure_initialized(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }
        self.store
            .init()
            .map_err(|source| Error::Init { source })?;
        self.initialized = true;
        tracing::debug!("migration store initialized");
        Ok(())
    }

    fn lock(&self) -> Result<Option<LockGuard<'_>>> {
        let Some(locker) = self.store.locker() else {
            return Ok(None);
        };
        locker.lock().map_err(|e| Error::store(None, e))?;
        tracing::debug!("migration lock acquired");
        Ok(Some(LockGuard { locker }))
    }

    fn applied_ids(&self) -> Result<HashSet<String>> {
        let ids = self
            .store
            .list_applied()
            .map_err(|e| Error::store(None, e))?;
        Ok(ids.into_iter().collect())
    }

    fn outstanding(&self) -> Result<Vec<&Migration>> {
        let applied = self.applied_ids()?;
        Ok(self
            .migrations
            .iter()
            .filter(|m| !applied.contains(m.id()))
            .collect())
    }

    fn revertable(&self, target_id: &str) -> Result<Vec<&Migration>> {
        let applied = self.applied_ids()?;
        let mut revert = Vec::new();
        for migration in self.migrations.iter().rev() {
            if !applied.contains(migration.id()) {
                continue;
            }
            revert.push(migration);
            if migration.id() == target_id {
                break;
            }
        }
        Ok(revert)
    }

    /// Run one step and record its outcome in the store.
    fn execute(&self, migration: &Migration, direction: Direction) -> Result<()> {
        let id = migration.id();
        tracing::info!(id, %direction, "running migration");

        if let Err(source) = migration.step(direction).run() {
            let id = id.to_owned();
            return Err(match direction {
                Direction::Up => Error::Up { id, source },
                Direction::Down => Error::Down { id, source },
            });
        }

        let now = Utc::now();
        let recorded = match direction {
            Direction::Up => self.store.record_applied(id, now),
            Direction::Down => self.store.record_reverted(id, now),
        };
        recorded.map_err(|e| Error::store(Some(id), e))
    }
}

impl Register for Migrator {
    /// Append a migration. Ids are not checked for uniqueness.
    fn register(&mut self, id: impl Into<String>, up: impl Step + 'static, down: impl Step + 'static) {
        self.migrations.push(Migration::new(id, up, down));
    }
}

impl Default for Migrator {
    fn default() -> Self {
        Self::with_default_store()
    }
}
