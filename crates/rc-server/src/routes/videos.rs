//! Video catalog route handlers: upload, list, fetch, delete.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use rc_core::VideoId;
use serde::Serialize;

use crate::context::AppContext;
use crate::error::AppError;
use crate::storage::{self, StoredPaths};

pub const MISSING_FILES: &str = "Both video and thumbnail files are required.";
pub const INVALID_FILE_TYPE: &str =
    "Invalid file type. Only video/mp4 and image/jpeg are supported.";

const VIDEO_MIME: &str = "video/mp4";
const THUMBNAIL_MIME: &str = "image/jpeg";

/// Video response.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct VideoResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub thumbnail_url: String,
    pub size_bytes: i64,
    pub duration_secs: Option<f64>,
    pub created_at: String,
    pub updated_at: String,
}

impl VideoResponse {
    fn from_model(v: &rc_db::models::Video) -> Self {
        Self {
            id: v.id.to_string(),
            title: v.title.clone(),
            description: v.description.clone(),
            url: v.url.clone(),
            thumbnail_url: v.thumbnail_url.clone(),
            size_bytes: v.size_bytes,
            duration_secs: v.duration_secs,
            created_at: v.created_at.clone(),
            updated_at: v.updated_at.clone(),
        }
    }
}

/// Multipart form accepted by the upload endpoint (documentation only).
#[allow(dead_code)]
#[derive(utoipa::ToSchema)]
pub struct UploadForm {
    pub title: String,
    pub description: Option<String>,
    #[schema(value_type = String, format = Binary)]
    pub video: Vec<u8>,
    #[schema(value_type = String, format = Binary)]
    pub thumbnail: Vec<u8>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum FilePart {
    #[default]
    Missing,
    WrongType,
    Stored(u64),
}

#[derive(Debug, Default)]
struct ReceivedUpload {
    title: Option<String>,
    description: Option<String>,
    video: FilePart,
    thumbnail: FilePart,
}

impl ReceivedUpload {
    /// Presence is checked before types, then the title.
    fn check(&self) -> Result<(String, u64), rc_core::Error> {
        if self.video == FilePart::Missing || self.thumbnail == FilePart::Missing {
            return Err(rc_core::Error::Validation(MISSING_FILES.into()));
        }
        let FilePart::Stored(size) = self.video else {
            return Err(rc_core::Error::Validation(INVALID_FILE_TYPE.into()));
        };
        if self.thumbnail == FilePart::WrongType {
            return Err(rc_core::Error::Validation(INVALID_FILE_TYPE.into()));
        }
        let title = self
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| rc_core::Error::Validation("title is required".into()))?;
        Ok((title.to_string(), size))
    }
}

async fn receive(
    multipart: &mut Multipart,
    paths: &StoredPaths,
) -> Result<ReceivedUpload, rc_core::Error> {
    let mut upload = ReceivedUpload::default();

    while let Some(mut field) = multipart.next_field().await.map_err(storage::multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        let mime = field.content_type().map(str::to_string);

        match name.as_str() {
            "video" => {
                upload.video = if mime.as_deref() == Some(VIDEO_MIME) {
                    FilePart::Stored(storage::write_field(&mut field, &paths.video).await?)
                } else {
                    FilePart::WrongType
                };
            }
            "thumbnail" => {
                upload.thumbnail = if mime.as_deref() == Some(THUMBNAIL_MIME) {
                    FilePart::Stored(storage::write_field(&mut field, &paths.thumbnail).await?)
                } else {
                    FilePart::WrongType
                };
            }
            "title" => upload.title = Some(field.text().await.map_err(storage::multipart_error)?),
            "description" => {
                upload.description = Some(field.text().await.map_err(storage::multipart_error)?)
            }
            other => tracing::debug!(field = other, "Ignoring unknown upload field"),
        }
    }

    Ok(upload)
}

async fn store_upload(
    ctx: &AppContext,
    multipart: &mut Multipart,
    id: VideoId,
    paths: &StoredPaths,
) -> rc_core::Result<rc_db::models::Video> {
    let upload = receive(multipart, paths).await?;
    let (title, size) = upload.check()?;

    let conn = rc_db::pool::get_conn(&ctx.db)?;
    rc_db::queries::videos::create_video(
        &conn,
        id,
        &title,
        upload.description.as_deref().unwrap_or_default(),
        &paths.video.to_string_lossy(),
        &paths.thumbnail.to_string_lossy(),
        i64::try_from(size).unwrap_or(i64::MAX),
        None,
    )
}

/// POST /video
#[utoipa::path(
    post,
    path = "/video",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Video uploaded", body = VideoResponse),
        (status = 400, description = "Missing file, wrong file type, or missing title")
    )
)]
pub async fn upload_video(
    State(ctx): State<AppContext>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let upload_dir = &ctx.config.storage.upload_dir;
    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(rc_core::Error::from)?;

    let id = VideoId::new();
    let paths = StoredPaths::for_video(upload_dir, id);

    let created = store_upload(&ctx, &mut multipart, id, &paths).await;

    match created {
        Ok(video) => {
            tracing::info!(video_id = %video.id, size_bytes = video.size_bytes, "Video uploaded");
            Ok((StatusCode::CREATED, Json(VideoResponse::from_model(&video))))
        }
        Err(e) => {
            paths.remove().await;
            Err(e.into())
        }
    }
}

/// GET /video
#[utoipa::path(
    get,
    path = "/video",
    responses(
        (status = 200, description = "All videos, newest first", body = Vec<VideoResponse>)
    )
)]
pub async fn list_videos(
    State(ctx): State<AppContext>,
) -> Result<Json<Vec<VideoResponse>>, AppError> {
    let conn = rc_db::pool::get_conn(&ctx.db)?;
    let videos = rc_db::queries::videos::list_videos(&conn)?;
    Ok(Json(videos.iter().map(VideoResponse::from_model).collect()))
}

/// GET /video/:id
#[utoipa::path(
    get,
    path = "/video/{id}",
    params(("id" = String, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Video details", body = VideoResponse),
        (status = 404, description = "Video not found")
    )
)]
pub async fn get_video(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<VideoResponse>, AppError> {
    let conn = rc_db::pool::get_conn(&ctx.db)?;
    let video = rc_db::queries::videos::find_video(&conn, &id)?
        .ok_or_else(|| rc_core::Error::not_found("video", &id))?;
    Ok(Json(VideoResponse::from_model(&video)))
}

/// DELETE /video/:id
#[utoipa::path(
    delete,
    path = "/video/{id}",
    params(("id" = String, Path, description = "Video ID")),
    responses(
        (status = 204, description = "Video deleted"),
        (status = 404, description = "Video not found")
    )
)]
pub async fn delete_video(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let video = {
        let conn = rc_db::pool::get_conn(&ctx.db)?;
        let video = rc_db::queries::videos::find_video(&conn, &id)?
            .ok_or_else(|| rc_core::Error::not_found("video", &id))?;
        if !rc_db::queries::videos::delete_video(&conn, video.id)? {
            return Err(rc_core::Error::not_found("video", &id).into());
        }
        video
    };

    storage::remove_quietly(std::path::Path::new(&video.url)).await;
    storage::remove_quietly(std::path::Path::new(&video.thumbnail_url)).await;
    tracing::info!(video_id = %video.id, "Video deleted");

    Ok(StatusCode::NO_CONTENT)
}
