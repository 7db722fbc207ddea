//! Namespaces ("buckets"): isolated keyspaces inside one store file.

use crate::{BucketnotesError, Result, Storage};
use log::{debug, info};
use rusqlite::{OptionalExtension, Transaction};
use std::fmt;

/// Longest namespace name accepted, in bytes.
pub const MAX_NAMESPACE_LEN: usize = 255;

/// A validated namespace name.
///
/// Holding a `Namespace` only proves the name is well formed; whether it
/// exists in a particular store is checked per transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace(String);

impl Namespace {
    /// Validates `name`.
    ///
    /// # Errors
    ///
    /// Returns [`BucketnotesError::InvalidNamespace`] if `name` is empty,
    /// whitespace only, contains a NUL character, or is longer than
    /// [`MAX_NAMESPACE_LEN`] bytes.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(BucketnotesError::InvalidNamespace(
                "name must not be empty".to_string(),
            ));
        }
        if name.contains('\0') {
            return Err(BucketnotesError::InvalidNamespace(
                "name must not contain NUL characters".to_string(),
            ));
        }
        if name.len() > MAX_NAMESPACE_LEN {
            return Err(BucketnotesError::InvalidNamespace(format!(
                "name is {} bytes, the limit is {MAX_NAMESPACE_LEN}",
                name.len()
            )));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Creates `namespace` in the store unless it already exists.
///
/// Runs in its own write transaction; the namespace is durable once this
/// returns `Ok`.
///
/// # Errors
///
/// Returns [`BucketnotesError::StoreUnavailable`] if the write transaction
/// cannot be started or committed.
pub fn ensure_namespace(storage: &mut Storage, namespace: &Namespace) -> Result<()> {
    let tx = storage.write_transaction()?;
    let inserted = tx.execute(
        "INSERT OR IGNORE INTO namespaces (name) VALUES (?)",
        [namespace.as_str()],
    )?;
    tx.commit()?;

    if inserted > 0 {
        info!("event=namespace_create namespace={namespace} status=ok");
    } else {
        debug!("event=namespace_create namespace={namespace} status=exists");
    }
    Ok(())
}

/// Confirms `namespace` exists as seen by `tx`.
///
/// # Errors
///
/// Returns [`BucketnotesError::NamespaceNotFound`] if it was never created.
pub(crate) fn resolve(tx: &Transaction<'_>, namespace: &Namespace) -> Result<()> {
    let found = tx
        .query_row(
            "SELECT 1 FROM namespaces WHERE name = ?",
            [namespace.as_str()],
            |_| Ok(()),
        )
        .optional()?;

    found.ok_or_else(|| BucketnotesError::NamespaceNotFound(namespace.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::DEFAULT_BUSY_TIMEOUT;
    use tempfile::NamedTempFile;

    fn namespace_count(storage: &Storage) -> i64 {
        storage
            .connection()
            .query_row("SELECT COUNT(*) FROM namespaces", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_rejects_empty_name() {
        assert!(matches!(
            Namespace::new(""),
            Err(BucketnotesError::InvalidNamespace(_))
        ));
        assert!(matches!(
            Namespace::new("  \n"),
            Err(BucketnotesError::InvalidNamespace(_))
        ));
    }

    #[test]
    fn test_rejects_nul_and_overlong_names() {
        assert!(Namespace::new("al\0ice").is_err());
        assert!(Namespace::new("x".repeat(MAX_NAMESPACE_LEN + 1)).is_err());
        assert!(Namespace::new("x".repeat(MAX_NAMESPACE_LEN)).is_ok());
    }

    #[test]
    fn test_ensure_namespace_is_idempotent() {
        let temp = NamedTempFile::new().unwrap();
        let mut storage = Storage::open(temp.path(), DEFAULT_BUSY_TIMEOUT).unwrap();
        let ns = Namespace::new("alice").unwrap();

        ensure_namespace(&mut storage, &ns).unwrap();
        ensure_namespace(&mut storage, &ns).unwrap();

        assert_eq!(namespace_count(&storage), 1);
    }

    #[test]
    fn test_resolve_unknown_namespace() {
        let temp = NamedTempFile::new().unwrap();
        let storage = Storage::open(temp.path(), DEFAULT_BUSY_TIMEOUT).unwrap();
        let ns = Namespace::new("bob").unwrap();

        let tx = storage.read_transaction().unwrap();
        match resolve(&tx, &ns) {
            Err(BucketnotesError::NamespaceNotFound(name)) => assert_eq!(name, "bob"),
            other => panic!("expected NamespaceNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_namespace_survives_reopen() {
        let temp = NamedTempFile::new().unwrap();
        let ns = Namespace::new("alice").unwrap();
        {
            let mut storage = Storage::open(temp.path(), DEFAULT_BUSY_TIMEOUT).unwrap();
            ensure_namespace(&mut storage, &ns).unwrap();
            storage.close().unwrap();
        }

        let storage = Storage::open(temp.path(), DEFAULT_BUSY_TIMEOUT).unwrap();
        let tx = storage.read_transaction().unwrap();
        assert!(resolve(&tx, &ns).is_ok());
    }
}
