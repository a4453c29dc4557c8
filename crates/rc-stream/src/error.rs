//! Error types for range parsing and stream responses.
//!
//! Every error here is scoped to a single request; none is fatal to the
//! process and none is retried.

/// Why a `Range` header could not be turned into a [`crate::ByteRange`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    /// The header is not a single `bytes=<start>-[<end>]` range.
    #[error("malformed range header: {0}")]
    Malformed(String),

    /// The header is well-formed but lies outside the resource.
    #[error("range {start}-{} not satisfiable for {total} bytes", .end.map(|e| e.to_string()).unwrap_or_default())]
    Unsatisfiable {
        start: u64,
        /// The explicit end bound, if the header carried one.
        end: Option<u64>,
        total: u64,
    },
}

/// Failure of a single stream request.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The lookup has no video with this identifier.
    #[error("video not found: {0}")]
    NotFound(String),

    /// The `Range` header was malformed or unsatisfiable.
    #[error("invalid range: {0}")]
    InvalidRange(#[from] RangeError),

    /// No `Range` header was sent and the responder refuses full-content
    /// responses.
    #[error("a Range header is required")]
    RangeRequired,

    /// The byte source failed to open or read.
    #[error("byte source error: {0}")]
    Io(#[from] std::io::Error),

    /// The lookup backend failed (as opposed to the video being unknown).
    #[error("lookup failed: {0}")]
    Backend(String),
}

impl StreamError {
    /// Map this error to the HTTP status the boundary should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            StreamError::NotFound(_) => 404,
            StreamError::InvalidRange(RangeError::Malformed(_)) => 400,
            StreamError::InvalidRange(RangeError::Unsatisfiable { .. }) => 416,
            StreamError::RangeRequired => 400,
            StreamError::Io(_) => 500,
            StreamError::Backend(_) => 500,
        }
    }
}

impl From<StreamError> for rc_core::Error {
    fn from(e: StreamError) -> Self {
        match e {
            StreamError::NotFound(id) => rc_core::Error::not_found("video", id),
            StreamError::InvalidRange(RangeError::Malformed(msg)) => {
                rc_core::Error::Validation(format!("malformed range header: {msg}"))
            }
            StreamError::InvalidRange(err @ RangeError::Unsatisfiable { total, .. }) => {
                rc_core::Error::RangeNotSatisfiable {
                    reason: err.to_string(),
                    total,
                }
            }
            StreamError::RangeRequired => {
                rc_core::Error::Validation("a Range header is required".into())
            }
            StreamError::Io(source) => rc_core::Error::Io { source },
            StreamError::Backend(msg) => rc_core::Error::Internal(msg),
        }
    }
}
