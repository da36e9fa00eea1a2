//! Subscriber loop feeding the dashboard.
//!
//! The subscriber pulls events from a [`MessageSource`], decodes payloads and
//! pushes [`DashboardEvent`]s onto a bounded queue. It never touches UI
//! state; the UI drains the queue on its own tick.

use crate::error::{MqttError, PayloadError, Result};
use crate::reading::Reading;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Broker link state as seen by the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Connected,
    Disconnected,
}

/// Events delivered from the subscriber to the UI
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    Reading(Reading),
    Link(LinkState),
    /// A message arrived but could not be turned into a reading
    Dropped,
}

/// Event produced by a message source
#[derive(Debug)]
pub enum SourceEvent {
    Connected,
    Message { topic: String, payload: Vec<u8> },
    Other,
}

/// Transport the subscriber reads from
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageSource: Send {
    /// Wait for the next event from the broker
    async fn next_event(&mut self) -> std::result::Result<SourceEvent, MqttError>;

    /// Disconnect from the broker
    async fn close(&mut self) -> std::result::Result<(), MqttError>;
}

/// Backoff applied between reconnection attempts
#[derive(Debug, Clone, Copy)]
pub struct ReconnectPolicy {
    pub enabled: bool,
    pub initial: Duration,
    pub max: Duration,
}

impl ReconnectPolicy {
    pub fn from_config(config: &crate::config::ServiceConfig) -> Self {
        Self {
            enabled: config.auto_reconnect,
            initial: Duration::from_millis(config.reconnect_delay_ms),
            max: Duration::from_millis(config.max_reconnect_delay_ms),
        }
    }
}

pub struct Subscriber<S: MessageSource> {
    source: S,
    events: mpsc::Sender<DashboardEvent>,
    reconnect: ReconnectPolicy,
}

impl<S: MessageSource> Subscriber<S> {
    pub fn new(source: S, events: mpsc::Sender<DashboardEvent>, reconnect: ReconnectPolicy) -> Self {
        Self {
            source,
            events,
            reconnect,
        }
    }

    /// Run until `shutdown` is cancelled, the queue closes, or the link fails fatally.
    ///
    /// A failure before the first successful connection is always fatal.
    pub async fn run(mut self, shutdown: CancellationToken) -> Result<()> {
        let mut connected_once = false;
        let mut delay = self.reconnect.initial;

        loop {
            let event = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                event = self.source.next_event() => event,
            };

            match event {
                Ok(SourceEvent::Connected) => {
                    connected_once = true;
                    delay = self.reconnect.initial;
                    tracing::info!("Subscriber connected");
                    if !emit(&self.events, DashboardEvent::Link(LinkState::Connected), &shutdown).await {
                        break;
                    }
                }
                Ok(SourceEvent::Message { topic, payload }) => {
                    if !emit(&self.events, decode_event(&topic, &payload), &shutdown).await {
                        break;
                    }
                }
                Ok(SourceEvent::Other) => {}
                Err(e) => {
                    if !connected_once || !self.reconnect.enabled {
                        return Err(e.into());
                    }

                    tracing::error!("Broker link lost: {}", e);
                    if !emit(&self.events, DashboardEvent::Link(LinkState::Disconnected), &shutdown).await {
                        break;
                    }

                    tracing::warn!("Reconnecting in {:?}", delay);
                    tokio::select! {
                        biased;
                        _ = shutdown.cancelled() => break,
                        _ = tokio::time::sleep(delay) => {}
                    }
                    delay = (delay * 2).min(self.reconnect.max);
                }
            }
        }

        tracing::info!("Subscriber stopping");
        self.source.close().await?;
        Ok(())
    }
}

/// Returns false once the receiving side is gone or shutdown is requested
async fn emit(
    events: &mpsc::Sender<DashboardEvent>,
    event: DashboardEvent,
    shutdown: &CancellationToken,
) -> bool {
    // A full queue must not hold up shutdown.
    tokio::select! {
        biased;
        _ = shutdown.cancelled() => false,
        sent = events.send(event) => {
            if sent.is_err() {
                tracing::debug!("Event queue closed");
            }
            sent.is_ok()
        }
    }
}

/// Turn one raw message into the event the UI should see
pub fn decode_event(topic: &str, payload: &[u8]) -> DashboardEvent {
    match Reading::decode(payload) {
        Ok(reading) => {
            tracing::debug!(topic, name = %reading.name, temp = reading.temp, "Reading received");
            DashboardEvent::Reading(reading)
        }
        Err(PayloadError::MissingField(field)) => {
            tracing::debug!(topic, "Dropping reading without {}", field);
            DashboardEvent::Dropped
        }
        Err(e @ PayloadError::Malformed(_)) => {
            tracing::error!(topic, "{}", e);
            DashboardEvent::Dropped
        }
        Err(e) => {
            tracing::error!(topic, "Error processing message: {}", e);
            DashboardEvent::Dropped
        }
    }
}
