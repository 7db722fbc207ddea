//! Core library for Bucketnotes — titled notes kept in named buckets of an
//! embedded, transactional store file.
//!
//! The primary entry point is [`Notebook`], which opens a store file for one
//! namespace ("bucket"). Lower-level building blocks are public as well:
//! [`codec`] turns a [`Note`] into a record, [`ensure_namespace`] prepares a
//! namespace, and [`record_store`] reads and writes raw records.
//!
//! Types are re-exported from their respective sub-modules for convenience;
//! consumers should import from the crate root rather than the `core` module.

pub mod core;

pub use crate::core::{codec, record_store};

// Re-export commonly used types.
#[doc(inline)]
pub use crate::core::{
    config::{StoreConfig, DEFAULT_BUSY_TIMEOUT, DEFAULT_CURSOR_BATCH_SIZE},
    error::{BucketnotesError, Result},
    namespace::{ensure_namespace, Namespace},
    note::Note,
    notebook::{Notebook, Titles},
    record_store::KeyCursor,
    storage::Storage,
};
