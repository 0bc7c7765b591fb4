// Error taxonomy shared by the fetcher, listener and sync context
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("network error: {0}")]
    Network(String),

    #[error("failed to decode payload: {0}")]
    Decode(String),

    #[error("invalid parameter: {0}")]
    Config(String),

    #[error("sync context has shut down")]
    Closed,
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SyncError::Decode(err.to_string())
        } else {
            SyncError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Decode(err.to_string())
    }
}

pub type SyncResult<T> = Result<T, SyncError>;
