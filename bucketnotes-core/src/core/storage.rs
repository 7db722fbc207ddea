//! The on-disk store file and its single SQLite connection.

use crate::{BucketnotesError, Result};
use log::{debug, info, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Store layout version recorded in `PRAGMA user_version`.
pub const STORE_VERSION: i64 = 1;

/// An open store file.
///
/// Owns the only connection to the file for this handle. Dropping the
/// `Storage` releases the connection; [`close`](Self::close) does the same but
/// reports failures.
pub struct Storage {
    conn: Connection,
    path: PathBuf,
}

impl Storage {
    /// Opens the store at `path`, creating the file and its tables if needed.
    ///
    /// The connection runs in WAL mode so readers keep a stable snapshot while
    /// a writer commits.
    ///
    /// # Errors
    ///
    /// Returns [`BucketnotesError::StoreUnavailable`] if the file cannot be
    /// opened or locked, or is not a SQLite database, and
    /// [`BucketnotesError::InvalidStore`] if it holds tables this build does
    /// not recognise or a newer layout version.
    pub fn open<P: AsRef<Path>>(path: P, busy_timeout: Duration) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut conn = Connection::open(&path)?;
        conn.busy_timeout(busy_timeout)?;

        let journal_mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        if !journal_mode.eq_ignore_ascii_case("wal") {
            warn!(
                "event=store_open path={} status=degraded journal_mode={}",
                path.display(),
                journal_mode
            );
        }
        conn.pragma_update(None, "synchronous", "FULL")?;
        conn.pragma_update(None, "foreign_keys", true)?;

        apply_layout(&mut conn)?;

        info!("event=store_open path={} status=ok", path.display());
        Ok(Self { conn, path })
    }

    /// Path of the store file this handle was opened on.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Starts a deferred read transaction.
    ///
    /// The snapshot is fixed by the first statement executed inside it and
    /// held until the transaction is dropped.
    pub fn read_transaction(&self) -> Result<Transaction<'_>> {
        Ok(self.conn.unchecked_transaction()?)
    }

    /// Starts a write transaction, taking the write lock immediately.
    pub fn write_transaction(&mut self) -> Result<Transaction<'_>> {
        Ok(self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?)
    }

    /// Flushes and closes the connection.
    ///
    /// # Errors
    ///
    /// Returns [`BucketnotesError::StoreUnavailable`] if SQLite refuses to
    /// close. The connection is still released when the error is dropped.
    pub fn close(self) -> Result<()> {
        let path = self.path;
        match self.conn.close() {
            Ok(()) => {
                info!("event=store_close path={} status=ok", path.display());
                Ok(())
            }
            Err((_conn, e)) => {
                warn!(
                    "event=store_close path={} status=error error={}",
                    path.display(),
                    e
                );
                Err(e.into())
            }
        }
    }
}

/// Creates the tables on a fresh file or validates an existing layout.
fn apply_layout(conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let version: i64 = tx.pragma_query_value(None, "user_version", |row| row.get(0))?;
    let table_count: i64 = tx.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'",
        [],
        |row| row.get(0),
    )?;

    if version == 0 && table_count == 0 {
        debug!("event=store_layout status=create version={STORE_VERSION}");
        tx.execute_batch(include_str!("schema.sql"))?;
    } else if version > STORE_VERSION {
        return Err(BucketnotesError::InvalidStore(format!(
            "store layout version {version} is newer than supported version {STORE_VERSION}"
        )));
    } else {
        let known_tables: i64 = tx.query_row(
            "SELECT COUNT(*) FROM sqlite_master
             WHERE type = 'table'
             AND name IN ('namespaces', 'records')",
            [],
            |row| row.get(0),
        )?;
        if version != STORE_VERSION || known_tables != 2 {
            return Err(BucketnotesError::InvalidStore(
                "not a Bucketnotes store".to_string(),
            ));
        }
    }

    tx.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::DEFAULT_BUSY_TIMEOUT;
    use tempfile::NamedTempFile;

    fn table_names(storage: &Storage) -> Vec<String> {
        storage
            .connection()
            .prepare("SELECT name FROM sqlite_master WHERE type='table'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn test_create_storage() {
        let temp = NamedTempFile::new().unwrap();
        let storage = Storage::open(temp.path(), DEFAULT_BUSY_TIMEOUT).unwrap();

        let tables = table_names(&storage);
        assert!(tables.contains(&"namespaces".to_string()));
        assert!(tables.contains(&"records".to_string()));

        let version: i64 = storage
            .connection()
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert_eq!(version, STORE_VERSION);
    }

    #[test]
    fn test_journal_mode_is_wal() {
        let temp = NamedTempFile::new().unwrap();
        let storage = Storage::open(temp.path(), DEFAULT_BUSY_TIMEOUT).unwrap();

        let mode: String = storage
            .connection()
            .pragma_query_value(None, "journal_mode", |row| row.get(0))
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }

    #[test]
    fn test_open_existing_storage() {
        let temp = NamedTempFile::new().unwrap();

        Storage::open(temp.path(), DEFAULT_BUSY_TIMEOUT)
            .unwrap()
            .close()
            .unwrap();

        let storage = Storage::open(temp.path(), DEFAULT_BUSY_TIMEOUT).unwrap();
        assert_eq!(table_names(&storage).len(), 2);
        assert_eq!(storage.path(), temp.path());
    }

    #[test]
    fn test_open_invalid_database() {
        let temp = NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "not a database, just some text long enough").unwrap();

        let result = Storage::open(temp.path(), DEFAULT_BUSY_TIMEOUT);
        assert!(matches!(result, Err(BucketnotesError::StoreUnavailable(_))));
    }

    #[test]
    fn test_open_foreign_database() {
        let temp = NamedTempFile::new().unwrap();
        {
            let conn = Connection::open(temp.path()).unwrap();
            conn.execute("CREATE TABLE notes (id TEXT PRIMARY KEY)", [])
                .unwrap();
        }

        let result = Storage::open(temp.path(), DEFAULT_BUSY_TIMEOUT);
        assert!(matches!(result, Err(BucketnotesError::InvalidStore(_))));
    }

    #[test]
    fn test_open_newer_layout_version() {
        let temp = NamedTempFile::new().unwrap();
        {
            let conn = Connection::open(temp.path()).unwrap();
            conn.execute_batch("PRAGMA user_version = 99;").unwrap();
        }

        match Storage::open(temp.path(), DEFAULT_BUSY_TIMEOUT) {
            Err(BucketnotesError::InvalidStore(msg)) => assert!(msg.contains("99")),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("newer layout must be rejected"),
        }
    }
}
