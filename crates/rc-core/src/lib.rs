//! rc-core: shared types, IDs, errors, and configuration.
//!
//! This crate is the foundational dependency for the other rc-* crates,
//! providing the typed video identifier, the unified error type, the
//! [`VideoRef`] handed to the streaming core, and application configuration.

pub mod config;
pub mod error;
pub mod ids;
pub mod media;

// Re-export the most commonly used items at the crate root.
pub use error::{Error, Result};
pub use ids::VideoId;
pub use media::VideoRef;
