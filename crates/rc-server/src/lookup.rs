//! Catalog-backed [`VideoLookup`].

use async_trait::async_trait;
use rc_core::VideoRef;
use rc_db::pool::DbPool;
use rc_stream::{StreamError, VideoLookup};

/// Resolves video identifiers against the SQLite catalog.
///
/// Every call hits the database; nothing is cached between requests.
#[derive(Clone)]
pub struct DbLookup {
    db: DbPool,
}

impl DbLookup {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl VideoLookup for DbLookup {
    async fn lookup(&self, video_id: &str) -> Result<Option<VideoRef>, StreamError> {
        let db = self.db.clone();
        let id = video_id.to_string();

        tokio::task::spawn_blocking(move || -> rc_core::Result<Option<VideoRef>> {
            let conn = rc_db::pool::get_conn(&db)?;
            let video = rc_db::queries::videos::find_video(&conn, &id)?;
            Ok(video.map(|v| v.to_ref()))
        })
        .await
        .map_err(|e| StreamError::Backend(format!("spawn_blocking join error: {e}")))?
        .map_err(|e| StreamError::Backend(e.to_string()))
    }
}
