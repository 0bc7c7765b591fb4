// HTTP request handlers
use crate::application::events::Command;
use crate::application::widgets::DashboardViews;
use crate::error::SyncError;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::stream::Stream;
use futures::StreamExt;
use serde::Deserialize;
use std::sync::Arc;
use tokio_stream::wrappers::WatchStream;

#[derive(Deserialize)]
pub struct WindowQuery {
    pub minutes: u32,
}

#[derive(Deserialize)]
pub struct DaysQuery {
    pub days: u32,
}

impl IntoResponse for SyncError {
    fn into_response(self) -> Response {
        let status = match &self {
            SyncError::Config(_) => StatusCode::BAD_REQUEST,
            SyncError::Closed => StatusCode::SERVICE_UNAVAILABLE,
            SyncError::Network(_) | SyncError::Decode(_) => StatusCode::BAD_GATEWAY,
        };
        (status, self.to_string()).into_response()
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Current views of every dashboard surface
pub async fn get_views(State(state): State<Arc<AppState>>) -> Json<DashboardViews> {
    Json(state.context.current_views())
}

/// Push the views again whenever any surface changes
pub async fn stream_views(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let stream = WatchStream::new(state.context.views()).map(|views| Event::default().json_data(views));
    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Manual refresh of the realtime metrics
pub async fn refresh_metrics(State(state): State<Arc<AppState>>) -> Result<StatusCode, SyncError> {
    state.context.send(Command::RefreshMetrics).await?;
    Ok(StatusCode::ACCEPTED)
}

/// Refetch the live graph for a new window
pub async fn set_live_window(
    Query(query): Query<WindowQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, SyncError> {
    state
        .context
        .send(Command::SetLiveWindow {
            minutes: query.minutes,
        })
        .await?;
    Ok(StatusCode::ACCEPTED)
}

/// Reload the historical analysis for a new day count
pub async fn load_historical(
    Query(query): Query<DaysQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, SyncError> {
    state
        .context
        .send(Command::LoadHistorical { days: query.days })
        .await?;
    Ok(StatusCode::ACCEPTED)
}
