//! Keyed reads, writes, and ordered key listing within one namespace.
//!
//! Every call runs in its own transaction. Keys are opaque byte strings and
//! are ordered byte-lexicographically.

use crate::core::namespace::{self, Namespace};
use crate::{BucketnotesError, Result, Storage};
use log::debug;
use rusqlite::{params, ErrorCode, OptionalExtension, Transaction};
use std::collections::VecDeque;

/// Largest key accepted, in bytes.
pub const MAX_KEY_SIZE: usize = 32_768;

/// Largest value accepted, in bytes. Matches SQLite's default `SQLITE_MAX_LENGTH`.
pub const MAX_VALUE_SIZE: usize = 1_000_000_000;

/// Writes `value` under `key`, replacing any previous value.
///
/// The write is atomic: a concurrent reader sees either the old value or the
/// new one.
///
/// # Errors
///
/// Returns [`BucketnotesError::InvalidKey`] / [`BucketnotesError::InvalidValue`]
/// for out-of-range sizes, [`BucketnotesError::NamespaceNotFound`] if the
/// namespace was never created, and [`BucketnotesError::StoreUnavailable`]
/// for engine failures.
pub fn put(storage: &mut Storage, namespace: &Namespace, key: &[u8], value: &[u8]) -> Result<()> {
    validate_key(key)?;
    validate_value_len(value.len())?;

    let tx = storage.write_transaction()?;
    namespace::resolve(&tx, namespace)?;
    tx.execute(
        "INSERT INTO records (namespace, key, value) VALUES (?1, ?2, ?3)
         ON CONFLICT (namespace, key) DO UPDATE SET value = excluded.value",
        params![namespace.as_str(), key, value],
    )
    .map_err(|e| too_big_as_invalid_value(e, value.len()))?;
    tx.commit()?;

    debug!(
        "event=record_put namespace={namespace} key_len={} value_len={}",
        key.len(),
        value.len()
    );
    Ok(())
}

/// Returns the value stored under `key`, or `None` if there is none.
///
/// # Errors
///
/// Returns [`BucketnotesError::InvalidKey`], [`BucketnotesError::NamespaceNotFound`],
/// or [`BucketnotesError::StoreUnavailable`]; an absent key is not an error.
pub fn get(storage: &Storage, namespace: &Namespace, key: &[u8]) -> Result<Option<Vec<u8>>> {
    validate_key(key)?;

    let tx = storage.read_transaction()?;
    namespace::resolve(&tx, namespace)?;
    let value = tx
        .query_row(
            "SELECT value FROM records WHERE namespace = ?1 AND key = ?2",
            params![namespace.as_str(), key],
            |row| row.get::<_, Vec<u8>>(0),
        )
        .optional()?;

    debug!(
        "event=record_get namespace={namespace} key_len={} found={}",
        key.len(),
        value.is_some()
    );
    Ok(value)
}

/// Starts an ascending scan over every key in `namespace`.
///
/// The snapshot is taken before this returns, so writes committed by other
/// handles afterwards are never observed by the returned cursor. Calling
/// again starts a fresh scan.
///
/// # Errors
///
/// Returns [`BucketnotesError::NamespaceNotFound`] or
/// [`BucketnotesError::StoreUnavailable`].
pub fn list_keys<'s>(
    storage: &'s Storage,
    namespace: &Namespace,
    batch_size: usize,
) -> Result<KeyCursor<'s>> {
    let tx = storage.read_transaction()?;
    namespace::resolve(&tx, namespace)?;

    let mut cursor = KeyCursor {
        tx,
        namespace: namespace.clone(),
        batch_size: batch_size.max(1),
        buffer: VecDeque::new(),
        last_key: Vec::new(),
        exhausted: false,
    };
    cursor.fetch_batch()?;
    Ok(cursor)
}

/// Forward cursor over the keys of one namespace.
///
/// Holds a read transaction for as long as it lives and pulls keys in
/// batches, each batch resuming after the last key yielded.
pub struct KeyCursor<'s> {
    tx: Transaction<'s>,
    namespace: Namespace,
    batch_size: usize,
    buffer: VecDeque<Vec<u8>>,
    // Keys are never empty, so the empty key sorts before every stored key.
    last_key: Vec<u8>,
    exhausted: bool,
}

impl KeyCursor<'_> {
    fn fetch_batch(&mut self) -> Result<()> {
        let keys = {
            let mut stmt = self.tx.prepare_cached(
                "SELECT key FROM records
                 WHERE namespace = ?1 AND key > ?2
                 ORDER BY key
                 LIMIT ?3",
            )?;
            let rows = stmt.query_map(
                params![self.namespace.as_str(), self.last_key, self.batch_size as i64],
                |row| row.get::<_, Vec<u8>>(0),
            )?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };

        if keys.len() < self.batch_size {
            self.exhausted = true;
        }
        if let Some(last) = keys.last() {
            self.last_key.clone_from(last);
        }
        self.buffer.extend(keys);
        Ok(())
    }
}

impl Iterator for KeyCursor<'_> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && !self.exhausted {
            if let Err(e) = self.fetch_batch() {
                self.exhausted = true;
                return Some(Err(e));
            }
        }
        self.buffer.pop_front().map(Ok)
    }
}

fn validate_key(key: &[u8]) -> Result<()> {
    if key.is_empty() {
        return Err(BucketnotesError::InvalidKey(
            "key must not be empty".to_string(),
        ));
    }
    if key.len() > MAX_KEY_SIZE {
        return Err(BucketnotesError::InvalidKey(format!(
            "key is {} bytes, the limit is {MAX_KEY_SIZE}",
            key.len()
        )));
    }
    Ok(())
}

fn validate_value_len(len: usize) -> Result<()> {
    if len > MAX_VALUE_SIZE {
        return Err(BucketnotesError::InvalidValue(format!(
            "value is {len} bytes, the limit is {MAX_VALUE_SIZE}"
        )));
    }
    Ok(())
}

/// The engine counts the whole row against its length limit, so a value just
/// under `MAX_VALUE_SIZE` can still be refused with `SQLITE_TOOBIG`.
fn too_big_as_invalid_value(e: rusqlite::Error, len: usize) -> BucketnotesError {
    match e.sqlite_error_code() {
        Some(ErrorCode::TooBig) => BucketnotesError::InvalidValue(format!(
            "value is {len} bytes, too large for the store"
        )),
        _ => e.into(),
    }
}
