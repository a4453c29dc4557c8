//! Direct video streaming with HTTP range request support.
//!
//! The body is streamed from the file in bounded chunks, so memory stays
//! flat regardless of file size. A client disconnect drops the body, which
//! closes the file.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use futures::TryStreamExt;
use rc_stream::{StreamResult, StreamStatus};

use crate::context::AppContext;
use crate::error::AppError;

/// GET /stream/:video_id
#[utoipa::path(
    get,
    path = "/stream/{video_id}",
    params(
        ("video_id" = String, Path, description = "Video ID"),
        ("Range" = Option<String>, Header, description = "Single byte range, `bytes=<start>-[<end>]`")
    ),
    responses(
        (status = 200, description = "Whole file (no Range header)", content_type = "video/mp4"),
        (status = 206, description = "Requested byte span", content_type = "video/mp4"),
        (status = 400, description = "Malformed Range header"),
        (status = 404, description = "Video not found"),
        (status = 416, description = "Range outside the file")
    )
)]
pub async fn stream_video(
    State(ctx): State<AppContext>,
    Path(video_id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let range_header = headers
        .get(header::RANGE)
        .map(|v| {
            v.to_str().map_err(|_| {
                rc_core::Error::Validation("malformed range header: not visible ASCII".into())
            })
        })
        .transpose()?;

    let result = ctx.responder.respond(&video_id, range_header).await?;

    Ok(stream_response(&video_id, result)?)
}

/// Turn a [`StreamResult`] into an HTTP response with a streaming body.
pub fn stream_response(video_id: &str, result: StreamResult) -> Result<Response, rc_core::Error> {
    let status = match result.status {
        StreamStatus::Ok => StatusCode::OK,
        StreamStatus::PartialContent => StatusCode::PARTIAL_CONTENT,
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&result.content_type).map_err(|_| {
            rc_core::Error::Internal(format!("invalid content type {:?}", result.content_type))
        })?,
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(result.content_length));
    if result.accept_ranges {
        headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    }
    if let Some(range) = result.content_range {
        // Digits, spaces, '-' and '/' only; always a valid header value.
        if let Ok(value) = HeaderValue::from_str(&range.to_string()) {
            headers.insert(header::CONTENT_RANGE, value);
        }
    }

    let video_id = video_id.to_string();
    let body = result.body.inspect_err(move |e| {
        tracing::warn!(video_id = %video_id, error = %e, "Aborting stream mid-body");
    });

    Ok((status, headers, Body::from_stream(body)).into_response())
}
