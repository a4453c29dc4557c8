//! Video catalog CRUD operations.

use chrono::Utc;
use rusqlite::Connection;
use rc_core::{Error, Result, VideoId};

use crate::models::Video;

const COLS: &str = "id, title, description, url, thumbnail_url, size_bytes,
    duration_secs, created_at, updated_at";

/// Create a new video record.
///
/// The caller chooses the id so stored files can be named after it before
/// the record exists.
#[allow(clippy::too_many_arguments)]
pub fn create_video(
    conn: &Connection,
    id: VideoId,
    title: &str,
    description: &str,
    url: &str,
    thumbnail_url: &str,
    size_bytes: i64,
    duration_secs: Option<f64>,
) -> Result<Video> {
    let now = Utc::now().to_rfc3339();

    conn.execute(
        "INSERT INTO videos (id, title, description, url, thumbnail_url, size_bytes,
            duration_secs, created_at, updated_at)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9)",
        rusqlite::params![
            id.to_string(),
            title,
            description,
            url,
            thumbnail_url,
            size_bytes,
            duration_secs,
            now,
            now,
        ],
    )
    .map_err(|e| match e {
        rusqlite::Error::SqliteFailure(ref err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Error::Conflict(format!("video {id} already exists"))
        }
        other => Error::database(other.to_string()),
    })?;

    Ok(Video {
        id,
        title: title.to_string(),
        description: description.to_string(),
        url: url.to_string(),
        thumbnail_url: thumbnail_url.to_string(),
        size_bytes,
        duration_secs,
        created_at: now.clone(),
        updated_at: now,
    })
}

/// Get a video by ID.
pub fn get_video(conn: &Connection, id: VideoId) -> Result<Option<Video>> {
    find_video(conn, &id.to_string())
}

/// Get a video by its raw identifier string.
///
/// Identifiers that are not valid UUIDs simply match nothing.
pub fn find_video(conn: &Connection, id: &str) -> Result<Option<Video>> {
    let q = format!("SELECT {COLS} FROM videos WHERE id = ?1");
    let result = conn.query_row(&q, [id], Video::from_row);
    match result {
        Ok(v) => Ok(Some(v)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// List all videos, newest first.
pub fn list_videos(conn: &Connection) -> Result<Vec<Video>> {
    let q = format!("SELECT {COLS} FROM videos ORDER BY created_at DESC, rowid DESC");
    let mut stmt = conn.prepare(&q).map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([], Video::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

/// Delete a video by ID.
pub fn delete_video(conn: &Connection, id: VideoId) -> Result<bool> {
    let n = conn
        .execute("DELETE FROM videos WHERE id = ?1", [id.to_string()])
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(n > 0)
}

/// Count catalogued videos.
pub fn count_videos(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM videos", [], |row| row.get(0))
        .map_err(|e| Error::database(e.to_string()))
}
