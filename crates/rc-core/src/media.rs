//! The resolved view of a stored video handed to the streaming core.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A stored video as seen by the streaming core: where its bytes live and
/// how many there are.
///
/// Owned by the catalog and resolved fresh for every request; the streaming
/// core never mutates or caches it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRef {
    /// Opaque identifier the video was looked up by.
    pub id: String,
    /// Location of the stored media file.
    pub location: PathBuf,
    /// Total size of the media file in bytes.
    pub total_size: u64,
}

impl VideoRef {
    pub fn new(id: impl Into<String>, location: impl Into<PathBuf>, total_size: u64) -> Self {
        Self {
            id: id.into(),
            location: location.into(),
            total_size,
        }
    }
}
