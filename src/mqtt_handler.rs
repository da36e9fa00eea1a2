use crate::config::MqttConfig;
use crate::error::MqttError;
use crate::subscriber::{MessageSource, SourceEvent};
use async_trait::async_trait;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS};
use std::time::Duration;

/// Requests buffered between the client handle and the event loop
const REQUEST_CAPACITY: usize = 16;

const DISCONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// MQTT transport backed by rumqttc
pub struct MqttHandler {
    client: AsyncClient,
    eventloop: EventLoop,
    topic: String,
    qos: QoS,
}

impl MqttHandler {
    /// Creates a new MQTT handler with the given configuration.
    ///
    /// No network traffic happens until the first [`MessageSource::next_event`].
    pub fn new(config: &MqttConfig) -> Result<Self, MqttError> {
        let (client, eventloop) = AsyncClient::new(mqtt_options(config), REQUEST_CAPACITY);
        Ok(Self {
            client,
            eventloop,
            topic: config.topic.clone(),
            qos: qos_from_level(config.qos)?,
        })
    }

    async fn subscribe(&mut self) -> Result<(), MqttError> {
        self.client
            .subscribe(self.topic.as_str(), self.qos)
            .await
            .map_err(|e| MqttError::SubscriptionError(format!("{}: {}", self.topic, e)))
    }
}

#[async_trait]
impl MessageSource for MqttHandler {
    async fn next_event(&mut self) -> Result<SourceEvent, MqttError> {
        let event = self
            .eventloop
            .poll()
            .await
            .map_err(|e| MqttError::ConnectionError(e.to_string()))?;

        match classify(event) {
            PollAction::Subscribe => {
                self.subscribe().await?;
                tracing::info!("Subscribed to {}", self.topic);
                Ok(SourceEvent::Connected)
            }
            PollAction::Forward(event) => Ok(event),
        }
    }

    async fn close(&mut self) -> Result<(), MqttError> {
        self.client
            .disconnect()
            .await
            .map_err(|e| MqttError::DisconnectionError(e.to_string()))?;

        // The DISCONNECT packet only leaves once the event loop is polled.
        let flush = async {
            loop {
                match self.eventloop.poll().await {
                    Ok(Event::Outgoing(Outgoing::Disconnect)) | Err(_) => break,
                    Ok(_) => {}
                }
            }
        };
        if tokio::time::timeout(DISCONNECT_TIMEOUT, flush).await.is_err() {
            tracing::warn!("Timed out waiting for broker disconnect");
        }
        Ok(())
    }
}

/// What the transport does with one polled event
#[derive(Debug)]
enum PollAction {
    /// The broker accepted a connection; the session may be fresh
    Subscribe,
    Forward(SourceEvent),
}

fn classify(event: Event) -> PollAction {
    match event {
        Event::Incoming(Packet::ConnAck(_)) => PollAction::Subscribe,
        Event::Incoming(Packet::Publish(publish)) => PollAction::Forward(SourceEvent::Message {
            topic: publish.topic,
            payload: publish.payload.to_vec(),
        }),
        _ => PollAction::Forward(SourceEvent::Other),
    }
}

/// Unique per process, so dashboards sharing a broker do not evict each other
fn default_client_id() -> String {
    format!(
        "thermo-dashboard-{}-{}",
        std::process::id(),
        chrono::Utc::now().timestamp_millis()
    )
}

/// Builds rumqttc options from configuration
fn mqtt_options(config: &MqttConfig) -> MqttOptions {
    let client_id = config.client_id.clone().unwrap_or_else(default_client_id);
    let mut options = MqttOptions::new(client_id.as_str(), config.host.as_str(), config.port);
    options
        .set_keep_alive(Duration::from_secs(config.keep_alive_secs))
        .set_clean_session(config.clean_session);

    if let (Some(username), Some(password)) = (&config.username, &config.password) {
        options.set_credentials(username.as_str(), password.as_str());
    }

    tracing::debug!(
        "MQTT options: {}:{} as {}",
        config.host,
        config.port,
        client_id
    );
    options
}

fn qos_from_level(level: u8) -> Result<QoS, MqttError> {
    match level {
        0 => Ok(QoS::AtMostOnce),
        1 => Ok(QoS::AtLeastOnce),
        2 => Ok(QoS::ExactlyOnce),
        other => Err(MqttError::SubscriptionError(format!(
            "invalid QoS level {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rumqttc::{ConnAck, ConnectReturnCode, Publish};

    #[test]
    fn test_qos_from_level() {
        assert_eq!(qos_from_level(0).unwrap(), QoS::AtMostOnce);
        assert_eq!(qos_from_level(1).unwrap(), QoS::AtLeastOnce);
        assert_eq!(qos_from_level(2).unwrap(), QoS::ExactlyOnce);
        assert!(qos_from_level(3).is_err());
    }

    #[test]
    fn test_mqtt_options_from_config() {
        let config = MqttConfig {
            host: "broker.local".to_string(),
            port: 1884,
            keep_alive_secs: 30,
            ..Default::default()
        };
        let options = mqtt_options(&config);
        assert_eq!(
            options.broker_address(),
            ("broker.local".to_string(), 1884)
        );
        assert_eq!(options.keep_alive(), Duration::from_secs(30));
        assert!(options.client_id().starts_with("thermo-dashboard-"));
    }

    #[test]
    fn test_configured_client_id_is_used_verbatim() {
        let config = MqttConfig {
            client_id: Some("bench-display".to_string()),
            ..Default::default()
        };
        assert_eq!(mqtt_options(&config).client_id(), "bench-display");
    }

    #[test]
    fn test_default_client_id_is_per_process() {
        let id = default_client_id();
        let expected = format!("thermo-dashboard-{}-", std::process::id());
        assert!(id.starts_with(&expected));
        assert!(id.len() > expected.len());
        assert_ne!(id, "thermo-dashboard");
    }

    #[test]
    fn test_connack_requests_subscription() {
        let connack = ConnAck::new(ConnectReturnCode::Success, false);
        assert!(matches!(
            classify(Event::Incoming(Packet::ConnAck(connack))),
            PollAction::Subscribe
        ));

        // A resumed session is acknowledged the same way and still resubscribes.
        let resumed = ConnAck::new(ConnectReturnCode::Success, true);
        assert!(matches!(
            classify(Event::Incoming(Packet::ConnAck(resumed))),
            PollAction::Subscribe
        ));
    }

    #[test]
    fn test_publish_is_forwarded_as_message() {
        let publish = Publish::new(
            "z/workshop/data",
            QoS::AtMostOnce,
            br#"{"name":"A","temp":20}"#.to_vec(),
        );
        match classify(Event::Incoming(Packet::Publish(publish))) {
            PollAction::Forward(SourceEvent::Message { topic, payload }) => {
                assert_eq!(topic, "z/workshop/data");
                assert_eq!(payload, br#"{"name":"A","temp":20}"#.to_vec());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_other_packets_are_ignored() {
        for event in [
            Event::Incoming(Packet::PingResp),
            Event::Outgoing(Outgoing::PingReq),
            Event::Outgoing(Outgoing::Disconnect),
        ] {
            assert!(matches!(
                classify(event),
                PollAction::Forward(SourceEvent::Other)
            ));
        }
    }

    #[tokio::test]
    async fn test_handler_is_sendable_across_tasks() {
        let config = MqttConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            ..Default::default()
        };
        let mut handler = MqttHandler::new(&config).unwrap();
        // Fails to connect, but the future must be spawnable.
        let result = tokio::spawn(async move { handler.next_event().await })
            .await
            .unwrap();
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_handler_creation_does_not_connect() {
        let config = MqttConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            ..Default::default()
        };
        let handler = MqttHandler::new(&config).unwrap();
        assert_eq!(handler.topic, "z/workshop/data");
    }
}
