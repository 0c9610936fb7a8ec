use super::{AppliedRecord, Locker, ProcessLock, Result, Store, StoreError};
use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::path::Path;

/// Name of the table holding applied migrations.
pub const TABLE: &str = "strata_migrations";

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS strata_migrations (
    id VARCHAR(100) NOT NULL,
    executed DATETIME NOT NULL,
    PRIMARY KEY (id)
)";
const SELECT_IDS: &str = "SELECT id FROM strata_migrations ORDER BY executed, id";
const SELECT_RECORDS: &str = "SELECT id, executed FROM strata_migrations ORDER BY executed, id";
const INSERT: &str = "INSERT INTO strata_migrations (id, executed) VALUES (?1, ?2)";
const DELETE: &str = "DELETE FROM strata_migrations WHERE id = ?1";

/// Fixed-width RFC 3339 so text ordering matches time ordering.
fn timestamp(executed: DateTime<Utc>) -> String {
    executed.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Stores applied migrations in a SQLite table, one row per migration.
///
/// Locking is process-local; the database itself is not locked.
pub struct SqlStore {
    conn: Mutex<Connection>,
    process_lock: ProcessLock,
}

impl SqlStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            process_lock: ProcessLock::new(),
        }
    }

    /// Open or create the database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(Connection::open(path)?))
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(Connection::open_in_memory()?))
    }

    /// Applied records ordered by execution time.
    pub fn records(&self) -> Result<Vec<AppliedRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(SELECT_RECORDS)?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, executed) = row?;
            let executed = DateTime::parse_from_rfc3339(&executed)
                .map_err(StoreError::backend)?
                .with_timezone(&Utc);
            records.push(AppliedRecord { id, executed });
        }
        Ok(records)
    }
}

impl Store for SqlStore {
    fn init(&self) -> Result<()> {
        self.conn.lock().execute(CREATE_TABLE, [])?;
        Ok(())
    }

    fn record_applied(&self, id: &str, executed: DateTime<Utc>) -> Result<()> {
        let affected = self
            .conn
            .lock()
            .execute(INSERT, params![id, timestamp(executed)])?;
        if affected == 0 {
            return Err(StoreError::NoRowsAffected(id.to_owned()));
        }
        Ok(())
    }

    fn record_reverted(&self, id: &str, _executed: DateTime<Utc>) -> Result<()> {
        let affected = self.conn.lock().execute(DELETE, params![id])?;
        if affected == 0 {
            return Err(StoreError::IdNotFound(id.to_owned()));
        }
        Ok(())
    }

    fn list_applied(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(SELECT_IDS)?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(ids)
    }

    fn locker(&self) -> Option<&dyn Locker> {
        Some(self)
    }
}

impl Locker for SqlStore {
    fn lock(&self) -> Result<()> {
        self.process_lock.acquire();
        Ok(())
    }

    fn unlock(&self) -> Result<()> {
        self.process_lock.release()
    }
}
