use super::{Locker, ProcessLock, Result, Store, StoreError};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::BTreeMap;

/// Keeps applied migrations in memory only. State is lost with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    migrations: Mutex<BTreeMap<String, DateTime<Utc>>>,
    process_lock: ProcessLock,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// When `id` was recorded as applied, if it is.
    pub fn executed_at(&self, id: &str) -> Option<DateTime<Utc>> {
        self.migrations.lock().get(id).copied()
    }
}

impl Store for MemoryStore {
    fn init(&self) -> Result<()> {
        Ok(())
    }

    fn record_applied(&self, id: &str, executed: DateTime<Utc>) -> Result<()> {
        self.migrations.lock().insert(id.to_owned(), executed);
        Ok(())
    }

    fn record_reverted(&self, id: &str, _executed: DateTime<Utc>) -> Result<()> {
        match self.migrations.lock().remove(id) {
            Some(_) => Ok(()),
            None => Err(StoreError::IdNotFound(id.to_owned())),
        }
    }

    fn list_applied(&self) -> Result<Vec<String>> {
        Ok(self.migrations.lock().keys().cloned().collect())
    }

    fn locker(&self) -> Option<&dyn Locker> {
        Some(self)
    }
}

impl Locker for MemoryStore {
    fn lock(&self) -> Result<()> {
        self.process_lock.acquire();
        Ok(())
    }

    fn unlock(&self) -> Result<()> {
        self.process_lock.release()
    }
}
