//! rc-stream: HTTP range-based media streaming core.
//!
//! Given a video identifier and an optional `Range` header, the
//! [`Responder`] resolves the video through a [`VideoLookup`], validates the
//! range with [`range::parse`], and opens a [`ByteSource`] bounded to exactly
//! the requested span. The result is a transport-agnostic [`StreamResult`]
//! that the HTTP layer turns into a `200`/`206` response.
//!
//! The crate holds no state between calls: every request re-resolves the
//! video and re-opens the byte source.

pub mod error;
pub mod lookup;
pub mod range;
pub mod responder;
pub mod source;

pub use error::{RangeError, StreamError};
pub use lookup::{MemoryLookup, VideoLookup};
pub use range::{ByteRange, ContentRange};
pub use responder::{respond, Responder, ResponderOptions, StreamResult, StreamStatus};
pub use source::{ByteSource, ByteStream, FileByteSource};
