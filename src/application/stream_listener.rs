// Live stream listener - persistent push channel with fixed-delay reconnect
use crate::application::dashboard_source::{FrameStream, LiveStreamSource};
use crate::application::events::{StreamEvent, SyncEvent};
use crate::domain::connection::ListenerState;
use crate::infrastructure::wire::decode_telemetry;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

enum PumpEnd {
    Lost(String),
    Shutdown,
    ConsumerGone,
}

/// Resolves once shutdown is requested or the shutdown sender is gone.
pub async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}

pub struct LiveStreamListener {
    source: Arc<dyn LiveStreamSource>,
    reconnect_delay: Duration,
    state_tx: watch::Sender<ListenerState>,
}

impl LiveStreamListener {
    pub fn new(source: Arc<dyn LiveStreamSource>, reconnect_delay: Duration) -> Self {
        let (state_tx, _) = watch::channel(ListenerState::Idle);
        Self {
            source,
            reconnect_delay,
            state_tx,
        }
    }

    pub fn state(&self) -> watch::Receiver<ListenerState> {
        self.state_tx.subscribe()
    }

    fn set_state(&self, state: ListenerState) {
        self.state_tx.send_replace(state);
    }

    /// Connect, forward decoded records, reconnect after the fixed delay on
    /// failure. Returns once shutdown is requested or the consumer is gone.
    pub async fn run(self, events: mpsc::Sender<SyncEvent>, mut shutdown: watch::Receiver<bool>) {
        let mut attempt: u64 = 0;

        loop {
            if *shutdown.borrow() {
                break;
            }

            attempt += 1;
            self.set_state(ListenerState::Connecting);
            debug!("Opening real-time connection (attempt {})", attempt);

            let opened = tokio::select! {
                _ = shutdown_requested(&mut shutdown) => break,
                opened = self.source.open() => opened,
            };

            let reason = match opened {
                Ok(frames) => {
                    self.set_state(ListenerState::Open);
                    info!("Real-time connection established");
                    if events.send(SyncEvent::Stream(StreamEvent::Opened)).await.is_err() {
                        break;
                    }
                    match self.pump(frames, &events, &mut shutdown).await {
                        PumpEnd::Lost(reason) => reason,
                        PumpEnd::Shutdown | PumpEnd::ConsumerGone => break,
                    }
                }
                Err(e) => e.to_string(),
            };

            self.set_state(ListenerState::ClosedByError);
            warn!(
                "Real-time connection lost ({}), retrying in {} ms",
                reason,
                self.reconnect_delay.as_millis()
            );
            if events
                .send(SyncEvent::Stream(StreamEvent::Lost(reason)))
                .await
                .is_err()
            {
                break;
            }

            tokio::select! {
                _ = shutdown_requested(&mut shutdown) => break,
                _ = tokio::time::sleep(self.reconnect_delay) => {}
            }
        }

        self.set_state(ListenerState::Idle);
        info!("Real-time listener stopped");
    }

    async fn pump(
        &self,
        mut frames: FrameStream,
        events: &mpsc::Sender<SyncEvent>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> PumpEnd {
        loop {
            let frame = tokio::select! {
                _ = shutdown_requested(shutdown) => return PumpEnd::Shutdown,
                frame = frames.next() => frame,
            };

            match frame {
                None => return PumpEnd::Lost("stream ended".to_string()),
                Some(Err(e)) => return PumpEnd::Lost(e.to_string()),
                Some(Ok(payload)) => match decode_telemetry(&payload) {
                    Ok(record) => {
                        debug!("Stream record at {}", record.timestamp);
                        if events
                            .send(SyncEvent::Stream(StreamEvent::Record(record)))
                            .await
                            .is_err()
                        {
                            return PumpEnd::ConsumerGone;
                        }
                    }
                    Err(e) => warn!("Skipping malformed stream payload: {}", e),
                },
            }
        }
    }
}
