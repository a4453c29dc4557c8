//! Axum router construction.
//!
//! Builds the application router with all routes, the OpenAPI document, and
//! middleware layers.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::context::AppContext;
use crate::middleware::request_id::request_id_middleware;
use crate::routes;

#[derive(OpenApi)]
#[openapi(
    info(title = "reelcast", description = "Video upload and range streaming API"),
    paths(
        routes::health::health_check,
        routes::videos::upload_video,
        routes::videos::list_videos,
        routes::videos::get_video,
        routes::videos::delete_video,
        routes::stream::stream_video,
    ),
    components(schemas(
        routes::health::HealthResponse,
        routes::videos::VideoResponse,
        routes::videos::UploadForm,
    ))
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router.
pub fn build_router(ctx: AppContext) -> Router {
    let upload_limit = usize::try_from(ctx.config.storage.max_upload_bytes).unwrap_or(usize::MAX);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers(Any);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route(
            "/video",
            get(routes::videos::list_videos).post(routes::videos::upload_video),
        )
        .route(
            "/video/{id}",
            get(routes::videos::get_video).delete(routes::videos::delete_video),
        )
        .route("/stream/{video_id}", get(routes::stream::stream_video))
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}
