//! Explicit configuration for one store handle.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// How long a writer waits on a lock held by another handle before failing.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Number of keys fetched per round-trip while a listing is iterated.
pub const DEFAULT_CURSOR_BATCH_SIZE: usize = 128;

/// Everything needed to open a [`Notebook`](crate::Notebook): which file, which
/// namespace, and engine tuning.
///
/// The namespace is validated when the notebook opens, not here.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub namespace: String,
    pub busy_timeout: Duration,
    pub cursor_batch_size: usize,
}

impl StoreConfig {
    pub fn new<P: AsRef<Path>>(path: P, namespace: impl Into<String>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            namespace: namespace.into(),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            cursor_batch_size: DEFAULT_CURSOR_BATCH_SIZE,
        }
    }

    #[must_use]
    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    /// Sets the listing batch size. Zero is treated as one.
    #[must_use]
    pub fn with_cursor_batch_size(mut self, cursor_batch_size: usize) -> Self {
        self.cursor_batch_size = cursor_batch_size.max(1);
        self
    }
}
