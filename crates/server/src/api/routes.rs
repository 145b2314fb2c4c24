use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::middleware::metrics_middleware;
use super::videos;
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .route("/videos", get(videos::list_videos))
        .route("/videos/", get(videos::list_videos))
        .route(
            "/videos/{id}",
            get(videos::get_video).patch(videos::update_warnings),
        )
        .route("/videos/{id}/transcript", get(videos::get_transcript))
        .route_layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
