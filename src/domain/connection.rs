// Connection state shown by the live indicator
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Connected,
    Disconnected,
    Updating,
    Error,
}

impl ConnectionState {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Connected => "LIVE",
            ConnectionState::Disconnected => "OFFLINE",
            ConnectionState::Updating => "UPDATING",
            ConnectionState::Error => "ERROR",
        }
    }
}

/// Lifecycle of the live stream listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Idle,
    Connecting,
    Open,
    ClosedByError,
}
