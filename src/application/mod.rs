// Application layer - fetcher, listener, projections and the sync loop
pub mod dashboard_source;
pub mod events;
pub mod indicator;
pub mod snapshot_fetcher;
pub mod stream_listener;
pub mod sync_context;
pub mod widgets;
