//! Persistence contract for applied-migration state, plus reference backends.
//!
//! A [`Store`] only records which migration ids have been applied and when.
//! Backends that can serialize concurrent runs additionally expose a
//! [`Locker`] through [`Store::locker`]; the engine engages it when present
//! and skips locking otherwise.

pub mod file;
pub mod lock;
pub mod memory;
pub mod sql;

#[cfg(test)]
pub(crate) mod mock;

use crate::error::BoxError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use file::{FileStore, DEFAULT_STATE_FILE};
pub use lock::ProcessLock;
pub use memory::MemoryStore;
pub use sql::SqlStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} id not found")]
    IdNotFound(String),

    #[error("no rows affected while recording {0}")]
    NoRowsAffected(String),

    #[error("store is not locked")]
    NotLocked,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Sql(#[from] rusqlite::Error),

    #[error(transparent)]
    Backend(#[from] BoxError),
}

impl StoreError {
    /// Wrap an arbitrary error from a custom backend.
    pub fn backend(err: impl Into<BoxError>) -> Self {
        StoreError::Backend(err.into())
    }

    /// The wrapped error of a transparent variant.
    ///
    /// Transparent variants forward `source()` to the wrapped error's own
    /// source, so the wrapped error itself is only reachable through here.
    pub fn inner(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            StoreError::Json(e) => Some(e),
            StoreError::Sql(e) => Some(e),
            StoreError::Backend(e) => Some(&**e),
            StoreError::IdNotFound(_) | StoreError::NoRowsAffected(_) | StoreError::NotLocked => {
                None
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// A persisted `{id, executed}` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedRecord {
    pub id: String,
    pub executed: DateTime<Utc>,
}

/// Records which migrations have been applied.
///
/// Every method takes `&self`; backends keep their state behind interior
/// mutability so one store can be shared between engines via `Arc`.
pub trait Store: Send + Sync {
    /// Prepare the store for use. Safe to call more than once.
    fn init(&self) -> Result<()>;

    /// Called after a migration's up step succeeded.
    fn record_applied(&self, id: &str, executed: DateTime<Utc>) -> Result<()>;

    /// Called after a migration's down step succeeded.
    ///
    /// Fails with [`StoreError::IdNotFound`] when `id` is not recorded.
    fn record_reverted(&self, id: &str, executed: DateTime<Utc>) -> Result<()>;

    /// Ids of all applied migrations, in no particular order.
    fn list_applied(&self) -> Result<Vec<String>>;

    /// The store's locking capability, if it has one.
    fn locker(&self) -> Option<&dyn Locker> {
        None
    }
}

/// Mutual exclusion around a whole migrate or rollback run.
pub trait Locker: Send + Sync {
    /// Block until the lock is held by the caller.
    fn lock(&self) -> Result<()>;

    fn unlock(&self) -> Result<()>;
}
