// Application state for HTTP handlers
use crate::application::sync_context::SyncContext;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub context: Arc<SyncContext>,
}
