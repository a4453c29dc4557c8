//! Resolution of a video identifier to its stored file.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use rc_core::VideoRef;

use crate::error::StreamError;

/// Maps a video identifier to its stored location and size.
///
/// Implementations must return `Ok(None)` for unknown identifiers; errors
/// are reserved for failures of the backing store itself.
#[async_trait]
pub trait VideoLookup: Send + Sync {
    async fn lookup(&self, video_id: &str) -> Result<Option<VideoRef>, StreamError>;
}

/// In-memory [`VideoLookup`] keyed by [`VideoRef::id`].
#[derive(Debug, Default)]
pub struct MemoryLookup {
    videos: RwLock<HashMap<String, VideoRef>>,
}

impl MemoryLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a video, replacing any previous entry with the same id.
    pub fn insert(&self, video: VideoRef) -> Option<VideoRef> {
        self.videos.write().insert(video.id.clone(), video)
    }

}

impl FromIterator<VideoRef> for MemoryLookup {
    fn from_iter<I: IntoIterator<Item = VideoRef>>(iter: I) -> Self {
        let videos = iter.into_iter().map(|v| (v.id.clone(), v)).collect();
        Self {
            videos: RwLock::new(videos),
        }
    }
}

#[async_trait]
impl VideoLookup for MemoryLookup {
    async fn lookup(&self, video_id: &str) -> Result<Option<VideoRef>, StreamError> {
        Ok(self.videos.read().get(video_id).cloned())
    }
}
