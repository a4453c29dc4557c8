//! Route handlers for the HTTP API.

pub mod health;
pub mod stream;
pub mod videos;
