// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod http_backend;
pub mod sse;
pub mod wire;
