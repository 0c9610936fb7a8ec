//! `strata-core`: ordered, reversible migrations over a pluggable state store.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use strata_core::{Migrator, Register, store::FileStore};
//!
//! let mut migrator = Migrator::new(Arc::new(FileStore::new(".strata")));
//! migrator.register("create_users", create_users, drop_users);
//! migrator.register("add_email_index", add_index, drop_index);
//!
//! let applied = migrator.migrate(false)?;
//! migrator.rollback("add_email_index")?;
//! ```

pub mod config;
pub mod error;
pub mod io;
pub mod migration;
pub mod migrator;
pub mod store;

pub use config::{Config, ConfigError, StoreConfig};
pub use error::{BoxError, Error, ErrorKind, Result};
pub use migration::{Direction, Migration, Register, Step};
pub use migrator::{MigrationStatus, Migrator};
pub use store::{Locker, Store, StoreError};
