// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `rumqttc` implementation of [`Transport`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use rumqttc::{AsyncClient, ConnectionError, EventLoop, MqttOptions, QoS};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::validate_topic_level;
use crate::error::{ConfigError, ProtocolError};
use crate::protocol::{InboundMessage, Transport};

/// Global counter for generating unique client IDs.
static CLIENT_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Capacity of the request queue between client and event loop.
///
/// One connect cycle queues five subscriptions and eight discovery
/// publishes.
const REQUEST_CAPACITY: usize = 16;

/// Capacity of the inbound message queue.
const INBOUND_CAPACITY: usize = 32;

/// MQTT transport backed by `rumqttc`.
///
/// Each [`connect`](Transport::connect) builds a fresh client and drives the
/// handshake to completion. Once the broker acknowledges, the event loop moves
/// into a background task that forwards inbound publishes and clears the
/// connected flag when the connection drops. Nothing is retried here; the
/// caller decides when to call `connect` again.
///
/// # Examples
///
/// ```no_run
/// use pumpbridge::protocol::{MqttTransport, Transport};
///
/// # async fn example() -> pumpbridge::Result<()> {
/// let mut transport = MqttTransport::builder()
///     .host("192.168.1.50")
///     .credentials("pump", "secret")
///     .client_id("wpc01")
///     .build()?;
///
/// transport.connect().await?;
/// assert!(transport.is_connected());
/// # Ok(())
/// # }
/// ```
pub struct MqttTransport {
    options: MqttOptions,
    host: String,
    port: u16,
    connection_timeout: Duration,
    client: Option<AsyncClient>,
    event_task: Option<JoinHandle<()>>,
    connected: Arc<AtomicBool>,
    inbound_tx: mpsc::Sender<InboundMessage>,
    inbound_rx: mpsc::Receiver<InboundMessage>,
}

impl MqttTransport {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> MqttTransportBuilder {
        MqttTransportBuilder::default()
    }

    /// Returns the broker host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the broker port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the MQTT client id.
    #[must_use]
    pub fn client_id(&self) -> String {
        self.options.client_id()
    }

    /// Sends DISCONNECT to the broker.
    ///
    /// # Errors
    ///
    /// Returns error if the request cannot be queued.
    pub async fn disconnect(&mut self) -> Result<(), ProtocolError> {
        tracing::info!(host = %self.host, port = self.port, "Disconnecting from MQTT broker");

        self.connected.store(false, Ordering::Release);
        if let Some(client) = self.client.take() {
            client.disconnect().await?;
        }
        Ok(())
    }

    fn client(&self) -> Result<&AsyncClient, ProtocolError> {
        self.client.as_ref().ok_or(ProtocolError::NotConnected)
    }
}

impl Transport for MqttTransport {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    async fn connect(&mut self) -> Result<(), ProtocolError> {
        if let Some(task) = self.event_task.take() {
            task.abort();
        }
        self.client = None;
        self.connected.store(false, Ordering::Release);

        tracing::debug!(host = %self.host, port = self.port, "Connecting to MQTT broker");

        let (client, mut event_loop) = AsyncClient::new(self.options.clone(), REQUEST_CAPACITY);

        let handshake = wait_for_connack(&mut event_loop);
        let outcome = tokio::time::timeout(self.connection_timeout, handshake).await;

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(ConnectionError::ConnectionRefused(code))) => {
                return Err(ProtocolError::ConnectionRefused { code: code as u8 });
            }
            Ok(Err(e)) => return Err(ProtocolError::ConnectionFailed(e.to_string())),
            Err(_) => {
                // Safe: timeout in practical use will never exceed u64::MAX milliseconds
                #[allow(clippy::cast_possible_truncation)]
                let timeout_ms = self.connection_timeout.as_millis() as u64;
                return Err(ProtocolError::Timeout(timeout_ms));
            }
        }

        tracing::info!(host = %self.host, port = self.port, "Connected to MQTT broker");
        self.connected.store(true, Ordering::Release);

        let connected = Arc::clone(&self.connected);
        let inbound_tx = self.inbound_tx.clone();
        self.event_task = Some(tokio::spawn(async move {
            handle_mqtt_events(event_loop, connected, inbound_tx).await;
        }));
        self.client = Some(client);

        Ok(())
    }

    async fn subscribe(&mut self, topic: &str) -> Result<(), ProtocolError> {
        self.client()?.subscribe(topic, QoS::AtMostOnce).await?;
        Ok(())
    }

    async fn publish(
        &mut self,
        topic: &str,
        payload: String,
        retain: bool,
    ) -> Result<(), ProtocolError> {
        self.client()?
            .publish(topic, QoS::AtMostOnce, retain, payload)
            .await?;
        Ok(())
    }

    async fn next_message(&mut self) -> Option<InboundMessage> {
        self.inbound_rx.recv().await
    }
}

impl Drop for MqttTransport {
    fn drop(&mut self) {
        if let Some(task) = self.event_task.take() {
            task.abort();
        }
    }
}

impl std::fmt::Debug for MqttTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MqttTransport")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("client_id", &self.options.client_id())
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

/// Polls the event loop until the broker acknowledges the connection.
async fn wait_for_connack(event_loop: &mut EventLoop) -> Result<(), ConnectionError> {
    use rumqttc::{Event, Packet};

    loop {
        if let Event::Incoming(Packet::ConnAck(connack)) = event_loop.poll().await? {
            tracing::debug!(?connack, "MQTT connection acknowledged");
            return Ok(());
        }
    }
}

/// Handles MQTT events in the background until the connection drops.
async fn handle_mqtt_events(
    mut event_loop: EventLoop,
    connected: Arc<AtomicBool>,
    inbound_tx: mpsc::Sender<InboundMessage>,
) {
    use rumqttc::{Event, Packet};

    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::SubAck(suback))) => {
                tracing::debug!(?suback, "MQTT subscription acknowledged");
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                let payload = String::from_utf8_lossy(&publish.payload).into_owned();
                tracing::debug!(
                    topic = %publish.topic,
                    payload = %payload,
                    "MQTT message received"
                );
                let message = InboundMessage::new(publish.topic, payload);
                if inbound_tx.send(message).await.is_err() {
                    break;
                }
            }
            Ok(Event::Incoming(Packet::Disconnect)) => {
                tracing::info!("MQTT broker disconnected");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "MQTT event loop error");
                break;
            }
        }
    }

    connected.store(false, Ordering::Release);
}

/// Parses an MQTT URL into host and port.
fn parse_mqtt_url(url: &str) -> Result<(String, u16), ConfigError> {
    let url = url
        .strip_prefix("mqtt://")
        .or_else(|| url.strip_prefix("tcp://"))
        .unwrap_or(url);

    let (host, port) = if let Some((h, p)) = url.rsplit_once(':') {
        let port = p
            .parse()
            .map_err(|_| ConfigError::InvalidAddress(format!("invalid port: {p}")))?;
        (h.to_string(), port)
    } else {
        (url.to_string(), 1883)
    };

    if host.is_empty() {
        return Err(ConfigError::InvalidAddress(format!("missing host in {url:?}")));
    }

    Ok((host, port))
}

/// Builder for [`MqttTransport`].
///
/// # Examples
///
/// ```
/// use pumpbridge::protocol::MqttTransportBuilder;
/// use std::time::Duration;
///
/// let transport = MqttTransportBuilder::default()
///     .broker_url("mqtt://192.168.1.50:1884")
///     .credentials("pump", "secret")
///     .client_id("wpc01")
///     .keep_alive(Duration::from_secs(15))
///     .build()
///     .unwrap();
///
/// assert_eq!(transport.host(), "192.168.1.50");
/// assert_eq!(transport.port(), 1884);
/// ```
#[derive(Debug)]
pub struct MqttTransportBuilder {
    host: String,
    port: u16,
    broker_url: Option<String>,
    credentials: Option<(String, String)>,
    client_id: Option<String>,
    keep_alive: Duration,
    connection_timeout: Duration,
}

impl Default for MqttTransportBuilder {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 1883,
            broker_url: None,
            credentials: None,
            client_id: None,
            keep_alive: Duration::from_secs(30),
            connection_timeout: Duration::from_secs(10),
        }
    }
}

impl MqttTransportBuilder {
    /// Sets the broker host address.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the broker port (default: 1883).
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets host and port from a URL.
    ///
    /// Accepts `mqtt://host:port`, `tcp://host:port` or `host[:port]`. Takes
    /// precedence over [`host`](Self::host) and [`port`](Self::port).
    #[must_use]
    pub fn broker_url(mut self, url: impl Into<String>) -> Self {
        self.broker_url = Some(url.into());
        self
    }

    /// Sets authentication credentials.
    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    /// Sets the MQTT client id.
    ///
    /// Firmware normally uses the device id. When unset a unique id is
    /// generated.
    #[must_use]
    pub fn client_id(mut self, id: impl Into<String>) -> Self {
        self.client_id = Some(id.into());
        self
    }

    /// Sets the keep-alive interval (default: 30 seconds).
    #[must_use]
    pub fn keep_alive(mut self, duration: Duration) -> Self {
        self.keep_alive = duration;
        self
    }

    /// Sets how long a handshake may take (default: 10 seconds).
    #[must_use]
    pub fn connection_timeout(mut self, duration: Duration) -> Self {
        self.connection_timeout = duration;
        self
    }

    /// Validates the configuration and creates an unconnected transport.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Host is not set
    /// - The broker URL cannot be parsed
    /// - The client id is empty or contains topic wildcards
    pub fn build(self) -> Result<MqttTransport, ConfigError> {
        let (host, port) = match &self.broker_url {
            Some(url) => parse_mqtt_url(url)?,
            None => (self.host, self.port),
        };

        if host.is_empty() {
            return Err(ConfigError::EmptyField("broker host"));
        }

        let client_id = match self.client_id {
            Some(id) if id.is_empty() => return Err(ConfigError::EmptyField("client id")),
            Some(id) => {
                validate_topic_level("client id", &id)?;
                id
            }
            None => {
                let counter = CLIENT_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
                format!("pumpbridge_{}_{}", std::process::id(), counter)
            }
        };

        let mut options = MqttOptions::new(client_id, &host, port);
        options.set_keep_alive(self.keep_alive);
        options.set_clean_session(true);

        if let Some((username, password)) = self.credentials {
            options.set_credentials(username, password);
        }

        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_CAPACITY);

        Ok(MqttTransport {
            options,
            host,
            port,
            connection_timeout: self.connection_timeout,
            client: None,
            event_task: None,
            connected: Arc::new(AtomicBool::new(false)),
            inbound_tx,
            inbound_rx,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_mqtt_url_with_port() {
        let (host, port) = parse_mqtt_url("mqtt://192.168.1.50:1883").unwrap();
        assert_eq!(host, "192.168.1.50");
        assert_eq!(port, 1883);
    }

    #[test]
    fn parse_mqtt_url_default_port() {
        let (host, port) = parse_mqtt_url("192.168.1.50").unwrap();
        assert_eq!(host, "192.168.1.50");
        assert_eq!(port, 1883);
    }

    #[test]
    fn parse_mqtt_url_tcp_scheme() {
        let (host, port) = parse_mqtt_url("tcp://broker.local:8883").unwrap();
        assert_eq!(host, "broker.local");
        assert_eq!(port, 8883);
    }

    #[test]
    fn parse_mqtt_url_invalid_port() {
        let result = parse_mqtt_url("mqtt://broker:http");
        assert!(matches!(result, Err(ConfigError::InvalidAddress(_))));
    }

    #[test]
    fn parse_mqtt_url_missing_host() {
        assert!(parse_mqtt_url("mqtt://:1883").is_err());
    }

    #[test]
    fn builder_default_values() {
        let builder = MqttTransportBuilder::default();
        assert_eq!(builder.port, 1883);
        assert!(builder.host.is_empty());
        assert!(builder.credentials.is_none());
        assert_eq!(builder.keep_alive, Duration::from_secs(30));
        assert_eq!(builder.connection_timeout, Duration::from_secs(10));
    }

    #[test]
    fn builder_chain() {
        let builder = MqttTransportBuilder::default()
            .host("192.168.1.50")
            .port(8883)
            .credentials("admin", "secret")
            .client_id("wpc01")
            .keep_alive(Duration::from_secs(45))
            .connection_timeout(Duration::from_secs(15));

        assert_eq!(builder.host, "192.168.1.50");
        assert_eq!(builder.port, 8883);
        assert_eq!(
            builder.credentials,
            Some(("admin".to_string(), "secret".to_string()))
        );
        assert_eq!(builder.client_id, Some("wpc01".to_string()));
        assert_eq!(builder.keep_alive, Duration::from_secs(45));
        assert_eq!(builder.connection_timeout, Duration::from_secs(15));
    }

    #[test]
    fn build_missing_host_fails() {
        let result = MqttTransportBuilder::default().build();
        assert!(matches!(result, Err(ConfigError::EmptyField("broker host"))));
    }

    #[test]
    fn build_rejects_wildcard_client_id() {
        let result = MqttTransport::builder()
            .host("localhost")
            .client_id("pump/#")
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidTopicLevel { field: "client id", .. })
        ));
    }

    #[test]
    fn build_rejects_empty_client_id() {
        let result = MqttTransport::builder()
            .host("localhost")
            .client_id("")
            .build();
        assert!(matches!(result, Err(ConfigError::EmptyField("client id"))));
    }

    #[tokio::test]
    async fn build_uses_given_client_id() {
        let transport = MqttTransport::builder()
            .host("localhost")
            .client_id("wpc01")
            .build()
            .unwrap();
        assert_eq!(transport.client_id(), "wpc01");
        assert!(!transport.is_connected());
    }

    #[test]
    fn build_generates_unique_client_ids() {
        let a = MqttTransport::builder().host("localhost").build().unwrap();
        let b = MqttTransport::builder().host("localhost").build().unwrap();
        assert_ne!(a.client_id(), b.client_id());
        assert!(a.client_id().starts_with("pumpbridge_"));
    }

    #[test]
    fn broker_url_overrides_host_and_port() {
        let transport = MqttTransport::builder()
            .host("ignored")
            .port(1)
            .broker_url("tcp://broker.local:8883")
            .build()
            .unwrap();
        assert_eq!(transport.host(), "broker.local");
        assert_eq!(transport.port(), 8883);
    }

    #[tokio::test]
    async fn publish_before_connect_is_rejected() {
        let mut transport = MqttTransport::builder().host("localhost").build().unwrap();
        let result = transport.publish("t", "p".to_string(), false).await;
        assert!(matches!(result, Err(ProtocolError::NotConnected)));

        let result = transport.subscribe("t").await;
        assert!(matches!(result, Err(ProtocolError::NotConnected)));
    }
}
