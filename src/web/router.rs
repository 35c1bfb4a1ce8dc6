//! Router configuration.

use axum::{routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{get_feed, refresh_all, refresh_feed, status_page, test_feed, AppState};

/// Create the main router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(status_page))
        .route("/rss/:feed_id", get(get_feed))
        .route("/test/:feed_id", get(test_feed))
        .route("/refresh/:feed_id", get(refresh_feed))
        .route("/refresh-all", get(refresh_all))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new()),
        )
        .with_state(app_state)
}

/// Create the health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
