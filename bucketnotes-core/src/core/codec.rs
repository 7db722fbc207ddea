//! Record encoding for notes.
//!
//! A record is one version byte followed by the note serialised as JSON.
//! JSON keeps the record self-describing, and the timestamp travels as an
//! RFC 3339 string with nanoseconds and the original UTC offset, so decoding
//! reproduces the note exactly.

use crate::{BucketnotesError, Note, Result};

/// Layout version written as the first byte of every record.
pub const RECORD_VERSION: u8 = 1;

/// Serialises `note` into its stored byte form.
///
/// # Errors
///
/// Returns [`BucketnotesError::Encoding`] if the note cannot be serialised.
pub fn encode(note: &Note) -> Result<Vec<u8>> {
    let mut bytes = vec![RECORD_VERSION];
    serde_json::to_writer(&mut bytes, note)
        .map_err(|e| BucketnotesError::Encoding(e.to_string()))?;
    Ok(bytes)
}

/// Reconstructs a note from bytes produced by [`encode`].
///
/// # Errors
///
/// Returns [`BucketnotesError::Decoding`] if `bytes` is empty, truncated, or
/// carries a version byte this build does not recognise.
pub fn decode(bytes: &[u8]) -> Result<Note> {
    let (version, payload) = bytes
        .split_first()
        .ok_or_else(|| BucketnotesError::Decoding("record is empty".to_string()))?;

    if *version != RECORD_VERSION {
        return Err(BucketnotesError::Decoding(format!(
            "unsupported record version {version} (expected {RECORD_VERSION})"
        )));
    }

    serde_json::from_slice(payload).map_err(|e| BucketnotesError::Decoding(e.to_string()))
}
