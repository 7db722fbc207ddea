//! Error types for the Bucketnotes core library.

use thiserror::Error;

/// All errors that can occur within the Bucketnotes core library.
///
/// A missing note is not an error: lookups return `Ok(None)` instead.
#[derive(Debug, Error)]
pub enum BucketnotesError {
    /// The namespace name is empty or otherwise unusable.
    #[error("Invalid namespace: {0}")]
    InvalidNamespace(String),

    /// An operation targeted a namespace that was never initialised.
    #[error("Namespace not found: {0}")]
    NamespaceNotFound(String),

    /// The embedded store rejected the operation (I/O, locking, or transaction failure).
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] rusqlite::Error),

    /// The file opened as a store has a layout this build does not understand.
    #[error("Invalid store: {0}")]
    InvalidStore(String),

    /// A record key is empty or exceeds the maximum key size.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// A record value exceeds the maximum value size.
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// A note could not be serialised into its record form.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// A stored record is empty, truncated, or from an incompatible encoder.
    #[error("Decoding error: {0}")]
    Decoding(String),

    /// An I/O operation on the filesystem failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias that pins the error type to [`BucketnotesError`].
pub type Result<T> = std::result::Result<T, BucketnotesError>;

impl BucketnotesError {
    /// Returns a short, human-readable message suitable for display to the end user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidNamespace(msg) => format!("Invalid bucket name: {msg}"),
            Self::NamespaceNotFound(name) => format!("Bucket \"{name}\" has not been set up"),
            Self::StoreUnavailable(e) => format!("Note store is unavailable: {e}"),
            Self::InvalidStore(msg) => format!("Could not open note store: {msg}"),
            Self::InvalidKey(msg) => format!("Invalid title: {msg}"),
            Self::InvalidValue(msg) => format!("Note is too large: {msg}"),
            Self::Encoding(e) => format!("Could not save note: {e}"),
            Self::Decoding(e) => format!("Stored note is unreadable: {e}"),
            Self::Io(e) => format!("File error: {e}"),
        }
    }

    /// Returns `true` if this error, raised while opening or closing a
    /// notebook, leaves the process without a usable store.
    ///
    /// Errors from individual reads and writes on an open notebook are always
    /// recoverable, whatever their kind; callers report them and carry on.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::StoreUnavailable(_) | Self::InvalidStore(_) | Self::Io(_)
        )
    }
}
