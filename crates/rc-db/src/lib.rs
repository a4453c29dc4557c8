//! rc-db: database access and persistence layer.
//!
//! This crate provides SQLite-backed storage for the video catalog with
//! connection pooling, embedded migrations, typed models, and queries.

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
