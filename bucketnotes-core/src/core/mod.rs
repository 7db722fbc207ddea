//! Internal domain modules for the Bucketnotes core library.
//!
//! All public types from these modules are re-exported at the crate root
//! with `#[doc(inline)]`; import from there in preference to this module.

pub mod codec;
pub mod config;
pub mod error;
pub mod namespace;
pub mod note;
pub mod notebook;
pub mod record_store;
pub mod storage;

#[doc(inline)]
pub use config::StoreConfig;
#[doc(inline)]
pub use error::{BucketnotesError, Result};
#[doc(inline)]
pub use namespace::{ensure_namespace, Namespace};
#[doc(inline)]
pub use note::Note;
#[doc(inline)]
pub use notebook::{Notebook, Titles};
#[doc(inline)]
pub use record_store::KeyCursor;
#[doc(inline)]
pub use storage::Storage;
