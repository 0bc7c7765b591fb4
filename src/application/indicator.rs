// Connection state indicator
use crate::domain::connection::ConnectionState;
use std::time::Duration;
use tokio::time::Instant;

/// Outcomes reported by the fetcher and the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    StreamOpened,
    StreamLost,
    RefreshSucceeded,
    /// A fetch returned data or the stream delivered a record.
    DataReceived,
    FetchFailed,
}

/// Derives the displayed connection state. `Updating` reverts to
/// `Connected` once `revert_after` has passed without a newer outcome.
/// `Error` clears on the next successful data outcome.
#[derive(Debug, Clone)]
pub struct ConnectionIndicator {
    state: ConnectionState,
    stream_open: bool,
    revert_after: Duration,
    revert_at: Option<Instant>,
}

impl ConnectionIndicator {
    pub fn new(revert_after: Duration) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            stream_open: false,
            revert_after,
            revert_at: None,
        }
    }

    /// Record an outcome. Returns true when the displayed state changed.
    pub fn observe(&mut self, outcome: Outcome, now: Instant) -> bool {
        let before = self.state;
        match outcome {
            Outcome::StreamOpened => {
                self.stream_open = true;
                self.settle(ConnectionState::Connected);
            }
            Outcome::StreamLost => {
                self.stream_open = false;
                self.settle(ConnectionState::Disconnected);
            }
            Outcome::FetchFailed => self.settle(ConnectionState::Error),
            Outcome::RefreshSucceeded => {
                self.state = ConnectionState::Updating;
                self.revert_at = Some(now + self.revert_after);
            }
            // Leaves a pending revert alone
            Outcome::DataReceived => {
                if self.state == ConnectionState::Error {
                    self.settle(self.link_state());
                }
            }
        }
        self.state != before
    }

    fn settle(&mut self, state: ConnectionState) {
        self.revert_at = None;
        self.state = state;
    }

    fn link_state(&self) -> ConnectionState {
        if self.stream_open {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    /// Apply the timed revert. Returns true when the state changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.revert_at {
            Some(deadline) if now >= deadline => {
                self.revert_at = None;
                self.state = ConnectionState::Connected;
                true
            }
            _ => false,
        }
    }

    pub fn revert_deadline(&self) -> Option<Instant> {
        self.revert_at
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }
}
