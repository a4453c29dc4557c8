//! Positional, bounded reads of stored media.
//!
//! A [`ByteSource`] opens a lazy [`ByteStream`] over `length` bytes starting
//! at `start`. The stream owns the underlying handle: dropping it (because
//! the body finished or the client went away) closes the handle and stops
//! further reads.

use std::io;
use std::path::Path;
use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use rc_core::config::DEFAULT_CHUNK_SIZE;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt};

use crate::error::StreamError;

/// Lazy body of a stream response.
pub type ByteStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;

/// Opens bounded, positional reads of stored media.
#[async_trait]
pub trait ByteSource: Send + Sync {
    /// Open `length` bytes of `location` starting at offset `start`.
    ///
    /// The returned stream must yield exactly `length` bytes or end with an
    /// error; it must never read before `start` or past `start + length`.
    async fn open(&self, location: &Path, start: u64, length: u64)
        -> Result<ByteStream, StreamError>;
}

/// [`ByteSource`] reading from the local file system.
#[derive(Debug, Clone)]
pub struct FileByteSource {
    chunk_size: usize,
}

impl FileByteSource {
    /// Build a source that reads in chunks of `chunk_size` bytes.
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: if chunk_size == 0 {
                DEFAULT_CHUNK_SIZE
            } else {
                chunk_size
            },
        }
    }
}

impl Default for FileByteSource {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

#[async_trait]
impl ByteSource for FileByteSource {
    async fn open(
        &self,
        location: &Path,
        start: u64,
        length: u64,
    ) -> Result<ByteStream, StreamError> {
        let mut file = tokio::fs::File::open(location).await?;
        if start > 0 {
            file.seek(io::SeekFrom::Start(start)).await?;
        }
        tracing::trace!(
            location = %location.display(),
            start,
            length,
            "Opened byte source"
        );
        Ok(bounded(file, length, self.chunk_size))
    }
}

/// Stream exactly `length` bytes from `reader` in chunks of at most
/// `chunk_size` bytes.
///
/// If the reader runs dry first, the stream ends with an
/// [`io::ErrorKind::UnexpectedEof`] error rather than a short body.
pub fn bounded<R>(reader: R, length: u64, chunk_size: usize) -> ByteStream
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let chunk_size = chunk_size.max(1);
    let stream = async_stream::stream! {
        let mut reader = reader;
        let mut remaining = length;
        let mut buf = vec![0u8; usize::try_from(length).map_or(chunk_size, |l| l.min(chunk_size))];

        while remaining > 0 {
            let want = usize::try_from(remaining).map_or(buf.len(), |r| r.min(buf.len()));
            match reader.read(&mut buf[..want]).await {
                Ok(0) => {
                    yield Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!("source ended with {remaining} of {length} bytes unread"),
                    ));
                    break;
                }
                Ok(n) => {
                    remaining -= n as u64;
                    yield Ok(Bytes::copy_from_slice(&buf[..n]));
                }
                Err(e) => {
                    yield Err(e);
                    break;
                }
            }
        }
    };
    Box::pin(stream)
}
