//! Rust structs mapping to database tables.

use rc_core::{VideoId, VideoRef};
use uuid::Uuid;

/// Parse a UUID-based ID from a text column.
fn parse_id<T: From<Uuid>>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<T> {
    let s: String = row.get(idx)?;
    let uuid = Uuid::parse_str(&s).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(T::from(uuid))
}

// ---------------------------------------------------------------------------
// Video
// ---------------------------------------------------------------------------

/// A catalogued video and its stored files.
#[derive(Debug, Clone, PartialEq)]
pub struct Video {
    pub id: VideoId,
    pub title: String,
    pub description: String,
    /// Path of the stored video file.
    pub url: String,
    /// Path of the stored thumbnail.
    pub thumbnail_url: String,
    pub size_bytes: i64,
    pub duration_secs: Option<f64>,
    pub created_at: String,
    pub updated_at: String,
}

impl Video {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            url: row.get(3)?,
            thumbnail_url: row.get(4)?,
            size_bytes: row.get(5)?,
            duration_secs: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    /// The streaming view of this record.
    ///
    /// A negative stored size (never written by this crate) is clamped to 0.
    pub fn to_ref(&self) -> VideoRef {
        VideoRef::new(
            self.id.to_string(),
            &self.url,
            u64::try_from(self.size_bytes).unwrap_or(0),
        )
    }
}
