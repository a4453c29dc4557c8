//! Turns a video id and an optional `Range` header into a stream response.
//!
//! Each call walks `Resolving -> RangeParsing -> Streaming`, failing with
//! [`StreamError::NotFound`] while resolving or [`StreamError::InvalidRange`]
//! while parsing. The byte source is only opened once the range has been
//! validated.

use std::fmt;
use std::sync::Arc;

use rc_core::config::{NoRangePolicy, StreamingConfig};

use crate::error::StreamError;
use crate::lookup::VideoLookup;
use crate::range::{self, ContentRange};
use crate::source::{ByteSource, ByteStream};

/// Status line of a successful stream response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStatus {
    /// `200 OK`: the whole resource.
    Ok,
    /// `206 Partial Content`: the span named by `content_range`.
    PartialContent,
}

impl StreamStatus {
    pub fn as_u16(self) -> u16 {
        match self {
            StreamStatus::Ok => 200,
            StreamStatus::PartialContent => 206,
        }
    }
}

/// Everything the HTTP layer needs to answer a stream request.
///
/// Built per request and consumed once.
pub struct StreamResult {
    pub status: StreamStatus,
    pub content_length: u64,
    pub content_range: Option<ContentRange>,
    pub accept_ranges: bool,
    pub content_type: String,
    pub body: ByteStream,
}

impl fmt::Debug for StreamResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamResult")
            .field("status", &self.status)
            .field("content_length", &self.content_length)
            .field("content_range", &self.content_range)
            .field("accept_ranges", &self.accept_ranges)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Knobs for [`Responder`].
#[derive(Debug, Clone)]
pub struct ResponderOptions {
    pub no_range_policy: NoRangePolicy,
    pub content_type: String,
}

impl Default for ResponderOptions {
    fn default() -> Self {
        Self::from(&StreamingConfig::default())
    }
}

impl From<&StreamingConfig> for ResponderOptions {
    fn from(config: &StreamingConfig) -> Self {
        Self {
            no_range_policy: config.no_range_policy,
            content_type: config.content_type.clone(),
        }
    }
}

/// Stream responder with its collaborators injected.
///
/// Cheap to clone; holds no per-request state.
#[derive(Clone)]
pub struct Responder {
    lookup: Arc<dyn VideoLookup>,
    source: Arc<dyn ByteSource>,
    options: ResponderOptions,
}

impl Responder {
    pub fn new(
        lookup: Arc<dyn VideoLookup>,
        source: Arc<dyn ByteSource>,
        options: ResponderOptions,
    ) -> Self {
        Self {
            lookup,
            source,
            options,
        }
    }

    /// Resolve `video_id` and open the span named by `range_header`.
    pub async fn respond(
        &self,
        video_id: &str,
        range_header: Option<&str>,
    ) -> Result<StreamResult, StreamError> {
        respond(
            video_id,
            range_header,
            self.lookup.as_ref(),
            self.source.as_ref(),
            &self.options,
        )
        .await
    }
}

/// Resolve `video_id` through `lookup`, validate `range_header`, and open
/// exactly the requested span from `source`.
pub async fn respond(
    video_id: &str,
    range_header: Option<&str>,
    lookup: &dyn VideoLookup,
    source: &dyn ByteSource,
    options: &ResponderOptions,
) -> Result<StreamResult, StreamError> {
    let Some(video) = lookup.lookup(video_id).await? else {
        tracing::debug!(video_id, "Stream request for unknown video");
        return Err(StreamError::NotFound(video_id.to_string()));
    };

    let total = video.total_size;
    let range = range::parse(range_header, total).map_err(|e| {
        tracing::debug!(video_id, range = ?range_header, error = %e, "Rejected range");
        StreamError::InvalidRange(e)
    })?;

    match range {
        Some(range) => {
            let length = range.len();
            let body = source.open(&video.location, range.start, length).await?;
            tracing::debug!(
                video_id,
                start = range.start,
                end = range.end,
                total,
                "Streaming partial content"
            );
            Ok(StreamResult {
                status: StreamStatus::PartialContent,
                content_length: length,
                content_range: Some(range.content_range(total)),
                accept_ranges: true,
                content_type: options.content_type.clone(),
                body,
            })
        }
        None => match options.no_range_policy {
            NoRangePolicy::ServeFull => {
                let body = source.open(&video.location, 0, total).await?;
                tracing::debug!(video_id, total, "Streaming full content");
                Ok(StreamResult {
                    status: StreamStatus::Ok,
                    content_length: total,
                    content_range: None,
                    accept_ranges: true,
                    content_type: options.content_type.clone(),
                    body,
                })
            }
            NoRangePolicy::Reject => {
                tracing::debug!(video_id, "Rejected stream request without Range");
                Err(StreamError::RangeRequired)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RangeError;
    use crate::lookup::MemoryLookup;
    use crate::source::{bounded, FileByteSource};
    use async_trait::async_trait;
    use bytes::Bytes;
    use futures::TryStreamExt;
    use rc_core::VideoRef;
    use std::collections::HashMap;
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory byte source that counts how often it was opened.
    #[derive(Default)]
    struct MemorySource {
        files: HashMap<PathBuf, Bytes>,
        opens: AtomicUsize,
    }

    impl MemorySource {
        fn with_file(path: &str, data: Vec<u8>) -> Self {
            let mut files = HashMap::new();
            files.insert(PathBuf::from(path), Bytes::from(data));
            Self {
                files,
                opens: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ByteSource for MemorySource {
        async fn open(
            &self,
            location: &Path,
            start: u64,
            length: u64,
        ) -> Result<ByteStream, StreamError> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            let data = self.files.get(location).cloned().ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such file")
            })?;
            let tail = data.slice((start as usize).min(data.len())..);
            Ok(bounded(std::io::Cursor::new(tail), length, 7))
        }
    }

    fn fixture(total: usize) -> (MemoryLookup, MemorySource, Vec<u8>) {
        let data: Vec<u8> = (0..=255u8).cycle().take(total).collect();
        let lookup = MemoryLookup::new();
        lookup.insert(VideoRef::new("vid", "/media/vid.mp4", total as u64));
        let source = MemorySource::with_file("/media/vid.mp4", data.clone());
        (lookup, source, data)
    }

    async fn body_of(result: StreamResult) -> Vec<u8> {
        let chunks: Vec<Bytes> = result.body.try_collect().await.unwrap();
        chunks.concat()
    }

    #[tokio::test]
    async fn serves_requested_span() {
        let (lookup, source, data) = fixture(2048);
        let options = ResponderOptions::default();
        let result = respond("vid", Some("bytes=100-199"), &lookup, &source, &options)
            .await
            .unwrap();

        assert_eq!(result.status, StreamStatus::PartialContent);
        assert_eq!(result.status.as_u16(), 206);
        assert_eq!(result.content_length, 100);
        assert_eq!(
            result.content_range.unwrap().to_string(),
            "bytes 100-199/2048"
        );
        assert!(result.accept_ranges);
        assert_eq!(result.content_type, "video/mp4");
        assert_eq!(body_of(result).await, &data[100..200]);
    }

    #[tokio::test]
    async fn open_range_serves_tail() {
        let (lookup, source, data) = fixture(500);
        let result = respond(
            "vid",
            Some("bytes=450-"),
            &lookup,
            &source,
            &ResponderOptions::default(),
        )
        .await
        .unwrap();
        assert_eq!(result.content_length, 50);
        assert_eq!(
            result.content_range.unwrap().to_string(),
            "bytes 450-499/500"
        );
        assert_eq!(body_of(result).await, &data[450..]);
    }

    #[tokio::test]
    async fn unknown_video_is_not_found_before_range_checks() {
        let (lookup, source, _) = fixture(10);
        let err = respond(
            "nope",
            Some("garbage"),
            &lookup,
            &source,
            &ResponderOptions::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, StreamError::NotFound(ref id) if id == "nope"));
        assert_eq!(source.opens.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalid_range_never_opens_source() {
        let (lookup, source, _) = fixture(100);
        let options = ResponderOptions::default();

        let err = respond("vid", Some("bytes=0-100"), &lookup, &source, &options)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StreamError::InvalidRange(RangeError::Unsatisfiable { total: 100, .. })
        ));
        assert_eq!(err.http_status(), 416);

        let err = respond("vid", Some("bytes=0-1,5-6"), &lookup, &source, &options)
            .await
            .unwrap_err();
        assert!(matches!(err, StreamError::InvalidRange(RangeError::Malformed(_))));
        assert_eq!(err.http_status(), 400);

        assert_eq!(source.opens.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn no_range_serves_full_by_default() {
        let (lookup, source, data) = fixture(300);
        let result = respond("vid", None, &lookup, &source, &ResponderOptions::default())
            .await
            .unwrap();
        assert_eq!(result.status, StreamStatus::Ok);
        assert_eq!(result.content_length, 300);
        assert!(result.content_range.is_none());
        assert!(result.accept_ranges);
        assert_eq!(body_of(result).await, data);
    }

    #[tokio::test]
    async fn no_range_rejected_under_reject_policy() {
        let (lookup, source, _) = fixture(300);
        let options = ResponderOptions {
            no_range_policy: NoRangePolicy::Reject,
            ..ResponderOptions::default()
        };
        let err = respond("vid", None, &lookup, &source, &options)
            .await
            .unwrap_err();
        assert!(matches!(err, StreamError::RangeRequired));
        assert_eq!(source.opens.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn stored_size_larger_than_file_errors_mid_stream() {
        let lookup = MemoryLookup::new();
        lookup.insert(VideoRef::new("vid", "/media/vid.mp4", 1000));
        let source = MemorySource::with_file("/media/vid.mp4", vec![1u8; 600]);

        let result = respond(
            "vid",
            Some("bytes=500-999"),
            &lookup,
            &source,
            &ResponderOptions::default(),
        )
        .await
        .unwrap();
        assert_eq!(result.content_length, 500);

        let err = result
            .body
            .try_collect::<Vec<Bytes>>()
            .await
            .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
    }

    #[tokio::test]
    async fn identical_requests_yield_identical_bodies() {
        let (lookup, source, _) = fixture(4096);
        let responder = Responder::new(
            Arc::new(lookup),
            Arc::new(source),
            ResponderOptions::default(),
        );

        let first = responder.respond("vid", Some("bytes=17-3001")).await.unwrap();
        let second = responder.respond("vid", Some("bytes=17-3001")).await.unwrap();
        assert_eq!(first.content_range, second.content_range);
        assert_eq!(body_of(first).await, body_of(second).await);
    }

    #[tokio::test]
    async fn custom_content_type_is_used() {
        let (lookup, source, _) = fixture(10);
        let options = ResponderOptions {
            content_type: "video/webm".into(),
            ..ResponderOptions::default()
        };
        let result = respond("vid", Some("bytes=0-"), &lookup, &source, &options)
            .await
            .unwrap();
        assert_eq!(result.content_type, "video/webm");
    }

    #[tokio::test]
    async fn full_file_range_from_disk() {
        let total = 1_430_145usize;
        let data: Vec<u8> = (0..total).map(|i| (i % 251) as u8).collect();
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(&data).unwrap();
        tmp.flush().unwrap();

        let lookup = MemoryLookup::new();
        lookup.insert(VideoRef::new("sample", tmp.path(), total as u64));
        let responder = Responder::new(
            Arc::new(lookup),
            Arc::new(FileByteSource::default()),
            ResponderOptions::default(),
        );

        let result = responder
            .respond("sample", Some("bytes=0-1430144"))
            .await
            .unwrap();
        assert_eq!(result.status, StreamStatus::PartialContent);
        assert_eq!(result.content_length, total as u64);
        assert_eq!(
            result.content_range.unwrap().to_string(),
            "bytes 0-1430144/1430145"
        );
        assert_eq!(result.content_type, "video/mp4");
        assert_eq!(body_of(result).await, data);
    }
}
