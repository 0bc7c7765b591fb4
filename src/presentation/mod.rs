// Presentation layer - HTTP surface over the published views
pub mod app_state;
pub mod handlers;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    get_views, health_check, load_historical, refresh_metrics, set_live_window, stream_views,
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/views", get(get_views))
        .route("/views/stream", get(stream_views))
        .route("/refresh", post(refresh_metrics))
        .route("/live-graph", post(set_live_window))
        .route("/historical", post(load_historical))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
