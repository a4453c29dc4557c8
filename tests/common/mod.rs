//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which creates an in-memory DB, a temporary upload
//! directory, and a full [`AppContext`]. The [`TestHarness::with_server`]
//! constructor starts Axum on a random port for HTTP-level testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;

use rc_core::config::Config;
use rc_core::VideoId;
use rc_db::pool::{init_memory_pool, DbPool};
use rc_server::context::AppContext;
use rc_server::router::build_router;
use tempfile::TempDir;

/// Test harness wrapping a fully-constructed [`AppContext`] backed by an
/// in-memory database.
pub struct TestHarness {
    pub ctx: AppContext,
    pub db: DbPool,
    /// Holds uploads and fixture files; removed on drop.
    pub dir: TempDir,
}

impl TestHarness {
    /// Create a new harness with default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a new harness with a custom configuration. The upload directory
    /// is always redirected into a temp dir.
    pub fn with_config(mut config: Config) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        config.storage.upload_dir = dir.path().join("uploads");

        let db = init_memory_pool().expect("failed to create in-memory pool");
        let ctx = AppContext::new(db.clone(), config);

        Self { ctx, db, dir }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        Self::with_server_config(Config::default()).await
    }

    /// Start an Axum server with custom config on a random port.
    pub async fn with_server_config(config: Config) -> (Self, SocketAddr) {
        let harness = Self::with_config(config);
        let app = build_router(harness.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (harness, addr)
    }

    /// Get a database connection from the pool.
    pub fn conn(&self) -> rc_db::pool::PooledConnection {
        rc_db::pool::get_conn(&self.db).expect("failed to get db connection")
    }

    /// Write a fixture file of `len` patterned bytes and return its path and
    /// contents.
    pub fn write_fixture(&self, name: &str, len: usize) -> (PathBuf, Vec<u8>) {
        let data = fixture_bytes(len);
        let path = self.dir.path().join(name);
        std::fs::write(&path, &data).expect("failed to write fixture");
        (path, data)
    }

    /// Catalogue a video backed by a fixture file of `len` bytes.
    pub fn register_video(&self, title: &str, len: usize) -> (VideoId, Vec<u8>) {
        let id = VideoId::new();
        let (path, data) = self.write_fixture(&format!("{id}.mp4"), len);
        self.register_path(id, title, &path, len as i64);
        (id, data)
    }

    /// Catalogue `path` with an explicit stored size, which may disagree with
    /// the file on disk.
    pub fn register_path(&self, id: VideoId, title: &str, path: &std::path::Path, size: i64) {
        rc_db::queries::videos::create_video(
            &self.conn(),
            id,
            title,
            "This is a test video",
            path.to_str().expect("utf-8 temp path"),
            "",
            size,
            None,
        )
        .expect("failed to create video");
    }
}

/// Deterministic byte pattern with period 251, so shifted spans differ.
pub fn fixture_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}
