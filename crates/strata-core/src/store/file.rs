use super::{AppliedRecord, Locker, ProcessLock, Result, Store, StoreError};
use crate::io;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default state file, relative to the working directory.
pub const DEFAULT_STATE_FILE: &str = ".strata";

#[derive(Debug, Default, Serialize, Deserialize)]
struct StateFile {
    #[serde(default)]
    migrations: Vec<AppliedRecord>,
}

/// Stores applied migrations in a pretty-printed JSON file.
///
/// The file is loaded once by [`Store::init`] and rewritten in full after
/// every change. A missing file is an empty state.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    state: Mutex<StateFile>,
    process_lock: ProcessLock,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            state: Mutex::new(StateFile::default()),
            process_lock: ProcessLock::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Applied records in the order they were written.
    pub fn records(&self) -> Vec<AppliedRecord> {
        self.state.lock().migrations.clone()
    }

    /// Write `next` to disk, then make it the cached state.
    ///
    /// The cache is left untouched when the write fails, so it never reports
    /// an id the file does not hold.
    fn commit(&self, state: &mut StateFile, next: StateFile) -> Result<()> {
        let buf = serde_json::to_vec_pretty(&next)?;
        io::atomic_write(&self.path, &buf)?;
        *state = next;
        Ok(())
    }
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new(DEFAULT_STATE_FILE)
    }
}

impl Store for FileStore {
    fn init(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let Some(buf) = io::read_if_exists(&self.path)? else {
            return Ok(());
        };
        let loaded: StateFile = serde_json::from_slice(&buf)?;
        *self.state.lock() = loaded;
        Ok(())
    }

    fn record_applied(&self, id: &str, executed: DateTime<Utc>) -> Result<()> {
        let mut state = self.state.lock();
        let mut migrations = state.migrations.clone();
        migrations.push(AppliedRecord {
            id: id.to_owned(),
            executed,
        });
        self.commit(&mut state, StateFile { migrations })
    }

    fn record_reverted(&self, id: &str, _executed: DateTime<Utc>) -> Result<()> {
        let mut state = self.state.lock();
        let Some(index) = state.migrations.iter().position(|r| r.id == id) else {
            return Err(StoreError::IdNotFound(id.to_owned()));
        };
        let mut migrations = state.migrations.clone();
        migrations.remove(index);
        self.commit(&mut state, StateFile { migrations })
    }

    fn list_applied(&self) -> Result<Vec<String>> {
        let state = self.state.lock();
        Ok(state.migrations.iter().map(|r| r.id.clone()).collect())
    }

    fn locker(&self) -> Option<&dyn Locker> {
        Some(self)
    }
}

impl Locker for FileStore {
    fn lock(&self) -> Result<()> {
        self.process_lock.acquire();
        Ok(())
    }

    fn unlock(&self) -> Result<()> {
        self.process_lock.release()
    }
}
