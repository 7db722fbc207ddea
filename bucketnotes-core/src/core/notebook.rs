//! High-level note operations over one namespace of a store file.

use crate::core::codec;
use crate::core::namespace::{ensure_namespace, Namespace};
use crate::core::record_store::{self, KeyCursor};
use crate::{Note, Result, Storage, StoreConfig};
use log::{debug, info};
use std::path::Path;

/// An open notebook: one store file with one active namespace.
///
/// `Notebook` is the only interface a front end needs. Construction opens
/// the store and makes sure the namespace exists, so a `Notebook` value is
/// always ready for use. [`close`](Self::close) consumes it; dropping it
/// without closing still releases the store.
pub struct Notebook {
    storage: Storage,
    namespace: Namespace,
    cursor_batch_size: usize,
}

impl Notebook {
    /// Opens the store named by `config` and initialises its namespace.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BucketnotesError::InvalidNamespace`] if the configured
    /// name is unusable (checked before the file is touched),
    /// [`crate::BucketnotesError::StoreUnavailable`] or
    /// [`crate::BucketnotesError::InvalidStore`] if the store cannot be opened
    /// or written.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let namespace = Namespace::new(config.namespace.clone())?;
        let mut storage = Storage::open(&config.path, config.busy_timeout)?;
        ensure_namespace(&mut storage, &namespace)?;

        info!(
            "event=notebook_open path={} namespace={namespace} status=ok",
            config.path.display()
        );
        Ok(Self {
            storage,
            namespace,
            cursor_batch_size: config.cursor_batch_size,
        })
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn path(&self) -> &Path {
        self.storage.path()
    }

    /// Stores a new note under `title`, replacing any note already there.
    ///
    /// A single trailing line ending is removed from each argument before
    /// anything is written, so the stored text is exactly what is later shown.
    /// The creation time is taken now, in local time with its UTC offset.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BucketnotesError::InvalidKey`] if the title is empty,
    /// [`crate::BucketnotesError::Encoding`] if the note cannot be encoded, or
    /// any error from the underlying write.
    pub fn create_note(&mut self, title: &str, content: &str, author: &str) -> Result<()> {
        let title = trim_line_ending(title);
        let note = Note::new(trim_line_ending(content), trim_line_ending(author));
        let record = codec::encode(&note)?;

        record_store::put(&mut self.storage, &self.namespace, title.as_bytes(), &record)?;
        debug!(
            "event=note_create namespace={} title_len={} created_at={}",
            self.namespace,
            title.len(),
            note.created_at.to_rfc3339()
        );
        Ok(())
    }

    /// Looks up the note stored under `title`.
    ///
    /// Returns `Ok(None)` when no such note exists.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BucketnotesError::Decoding`] if a record exists but
    /// cannot be read back, or any error from the underlying read.
    pub fn read_note(&self, title: &str) -> Result<Option<Note>> {
        let title = trim_line_ending(title);
        record_store::get(&self.storage, &self.namespace, title.as_bytes())?
            .map(|record| codec::decode(&record))
            .transpose()
    }

    /// Lists every title in the namespace in ascending byte order.
    ///
    /// The listing reflects the store as of this call. It keeps a read
    /// transaction open, so drop it before reading from this notebook again.
    pub fn list_titles(&self) -> Result<Titles<'_>> {
        let keys = record_store::list_keys(&self.storage, &self.namespace, self.cursor_batch_size)?;
        Ok(Titles { keys })
    }

    /// Releases the store.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BucketnotesError::StoreUnavailable`] if the store
    /// reports a failure while closing.
    pub fn close(self) -> Result<()> {
        info!("event=notebook_close namespace={}", self.namespace);
        self.storage.close()
    }
}

/// Lazy sequence of note titles returned by [`Notebook::list_titles`].
///
/// Titles that are not valid UTF-8 are rendered lossily.
pub struct Titles<'n> {
    keys: KeyCursor<'n>,
}

impl Iterator for Titles<'_> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.keys
            .next()
            .map(|key| key.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }
}

/// Strips one trailing `\n` or `\r\n`.
fn trim_line_ending(text: &str) -> &str {
    match text.strip_suffix('\n') {
        Some(rest) => rest.strip_suffix('\r').unwrap_or(rest),
        None => text,
    }
}
