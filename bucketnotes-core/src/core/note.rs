use chrono::{DateTime, FixedOffset, Local};
use serde::{Deserialize, Serialize};

/// A single persisted note.
///
/// Notes are never edited in place. Writing a note under an existing title
/// replaces the stored record as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub content: String,
    pub created_at: DateTime<FixedOffset>,
    pub author: String,
}

impl Note {
    /// Creates a note stamped with the current local time and its UTC offset.
    pub fn new(content: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            created_at: Local::now().fixed_offset(),
            author: author.into(),
        }
    }
}
