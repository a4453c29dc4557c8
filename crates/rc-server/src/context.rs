//! Application context shared by all request handlers (via Axum state).

use std::sync::Arc;

use rc_core::config::Config;
use rc_db::pool::DbPool;
use rc_stream::{ByteSource, FileByteSource, Responder, ResponderOptions, VideoLookup};

use crate::lookup::DbLookup;

/// Application context shared by all request handlers.
///
/// This is cheaply cloneable because it only holds `Arc`s and a pool handle.
#[derive(Clone)]
pub struct AppContext {
    /// Database connection pool.
    pub db: DbPool,
    /// Immutable application configuration snapshot.
    pub config: Arc<Config>,
    /// Stream responder wired to the catalog and the file system.
    pub responder: Responder,
}

impl AppContext {
    /// Build a context whose responder resolves videos through the catalog
    /// and reads them from local files.
    pub fn new(db: DbPool, config: Config) -> Self {
        let lookup: Arc<dyn VideoLookup> = Arc::new(DbLookup::new(db.clone()));
        let source: Arc<dyn ByteSource> = Arc::new(FileByteSource::new(
            config.streaming.effective_chunk_size(),
        ));
        let responder = Responder::new(lookup, source, ResponderOptions::from(&config.streaming));
        Self::with_responder(db, config, responder)
    }

    /// Build a context around an explicitly wired responder.
    pub fn with_responder(db: DbPool, config: Config, responder: Responder) -> Self {
        Self {
            db,
            config: Arc::new(config),
            responder,
        }
    }
}
