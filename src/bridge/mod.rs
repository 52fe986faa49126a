// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The device state bridge.
//!
//! [`Bridge`] ties the process state to the broker:
//!
//! ```text
//! broker message ──► handle_message ──► TopicTable::resolve
//!                                            │
//!                          ProcessState::apply ◄┘
//!                                            │
//!                                  publish_state (retained)
//!
//! connect ──► subscribe command topics ──► publish_discovery (retained)
//! ```
//!
//! Every operation runs to completion inside the caller's task; the only
//! suspension points are calls into the [`Transport`]. Nothing here is
//! retried. Publishing while disconnected is skipped and publish failures are
//! logged, so the next cycle simply publishes fresh values again.

mod runtime;

use crate::command::Command;
use crate::config::DeviceIdentity;
use crate::discovery;
use crate::error::ProtocolError;
use crate::protocol::{TopicTable, Transport};
use crate::state::ProcessState;

/// Bridges a pump controller's state to Home Assistant over MQTT.
///
/// # Examples
///
/// ```no_run
/// use pumpbridge::{Bridge, DeviceIdentity};
/// use pumpbridge::protocol::MqttTransport;
///
/// # async fn example() -> pumpbridge::Result<()> {
/// let identity = DeviceIdentity::new("wpc01", "Water Pump", "Acme", "WPC-1", "1.0.0")?;
/// let transport = MqttTransport::builder()
///     .host("192.168.1.50")
///     .credentials("pump", "secret")
///     .client_id(identity.id())
///     .build()?;
///
/// let mut bridge = Bridge::new(identity, transport);
/// bridge.connect().await?;
///
/// bridge.state_mut().set_pressure(2.3);
/// bridge.publish_state().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Bridge<T: Transport> {
    transport: T,
    identity: DeviceIdentity,
    topics: TopicTable,
    state: ProcessState,
}

impl<T: Transport> Bridge<T> {
    /// Creates a bridge with a zeroed process state.
    #[must_use]
    pub fn new(identity: DeviceIdentity, transport: T) -> Self {
        Self::with_state(identity, transport, ProcessState::new())
    }

    /// Creates a bridge around an existing process state.
    #[must_use]
    pub fn with_state(identity: DeviceIdentity, transport: T, state: ProcessState) -> Self {
        let topics = TopicTable::new(identity.id());
        Self {
            transport,
            identity,
            topics,
            state,
        }
    }

    /// Returns the device identity.
    #[must_use]
    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Returns the topic table.
    #[must_use]
    pub fn topics(&self) -> &TopicTable {
        &self.topics
    }

    /// Returns the process state.
    #[must_use]
    pub fn state(&self) -> &ProcessState {
        &self.state
    }

    /// Returns the process state for sensor and control logic to update.
    pub fn state_mut(&mut self) -> &mut ProcessState {
        &mut self.state
    }

    /// Returns the transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the transport mutably.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Returns whether the transport reports a live connection.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Handles one inbound broker message.
    ///
    /// Resolves the topic against the command topics, applies the decoded
    /// command and then republishes the full state. The state is republished
    /// exactly once per call, whether or not the message matched anything.
    ///
    /// Returns the applied command. Unknown topics and reboot payloads other
    /// than `"PRESS"` yield `None` and leave the state untouched.
    pub async fn handle_message(&mut self, topic: &str, payload: &str) -> Option<Command> {
        let command = match self.topics.resolve(topic) {
            Some(command_topic) => {
                let command = Command::parse(command_topic, payload);
                if command.is_none() {
                    tracing::debug!(
                        topic = %topic,
                        payload = %payload,
                        "Ignoring payload for command topic"
                    );
                }
                command
            }
            None => {
                tracing::trace!(topic = %topic, "Ignoring message on unknown topic");
                None
            }
        };

        if let Some(command) = &command {
            let changed = self.state.apply(command);
            tracing::debug!(
                topic = %topic,
                payload = %payload,
                ?command,
                changed,
                "Applied command"
            );
            if matches!(command, Command::Reboot) {
                tracing::info!(device = %self.identity.id(), "Reboot requested via MQTT");
            }
        }

        self.publish_state().await;
        command
    }

    /// Publishes the current state, retained, on the state topic.
    ///
    /// Does nothing while disconnected. A failed publish is logged and not
    /// reported to the caller.
    pub async fn publish_state(&mut self) {
        if !self.transport.is_connected() {
            tracing::trace!("Not connected, skipping state publish");
            return;
        }

        let payload = match self.state.snapshot().to_json() {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize state");
                return;
            }
        };

        tracing::debug!(topic = %self.topics.state(), payload = %payload, "Publishing state");

        if let Err(e) = self
            .transport
            .publish(self.topics.state(), payload, true)
            .await
        {
            tracing::warn!(topic = %self.topics.state(), error = %e, "State publish failed");
        }
    }

    /// Publishes every discovery descriptor, retained.
    ///
    /// Does nothing while disconnected. Each descriptor is attempted even if
    /// an earlier one failed; failures are logged. Republishing is harmless:
    /// the broker keeps only the latest retained copy.
    pub async fn publish_discovery(&mut self) {
        if !self.transport.is_connected() {
            tracing::trace!("Not connected, skipping discovery publish");
            return;
        }

        let configs = discovery::build_configs(&self.identity, &self.topics);
        tracing::info!(
            device = %self.identity.id(),
            count = configs.len(),
            "Publishing discovery configs"
        );

        for config in configs {
            let payload = match config.descriptor.to_json() {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::warn!(topic = %config.topic, error = %e, "Failed to serialize discovery config");
                    continue;
                }
            };

            tracing::debug!(topic = %config.topic, payload = %payload, "Publishing discovery config");

            if let Err(e) = self.transport.publish(&config.topic, payload, true).await {
                tracing::warn!(topic = %config.topic, error = %e, "Discovery publish failed");
            }
        }
    }

    /// Connects to the broker, subscribes to the command topics and
    /// announces the device.
    ///
    /// Makes a single attempt. Calling it again is the caller's retry.
    ///
    /// # Errors
    ///
    /// Returns the transport's error if the handshake fails. Nothing is
    /// subscribed or published in that case.
    pub async fn connect(&mut self) -> Result<(), ProtocolError> {
        if let Err(e) = self.transport.connect().await {
            tracing::warn!(device = %self.identity.id(), error = %e, "MQTT connection failed");
            return Err(e);
        }

        tracing::info!(device = %self.identity.id(), "MQTT connected");

        for topic in self.topics.subscriptions() {
            match self.transport.subscribe(&topic).await {
                Ok(()) => tracing::debug!(topic = %topic, "Subscribed to command topic"),
                Err(e) => tracing::warn!(topic = %topic, error = %e, "Subscription failed"),
            }
        }

        self.publish_discovery().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandTopic;
    use crate::protocol::InboundMessage;
    use crate::types::SwitchState;

    /// In-memory transport recording everything the bridge does.
    #[derive(Debug, Default)]
    struct RecordingTransport {
        connected: bool,
        refuse_with: Option<u8>,
        subscriptions: Vec<String>,
        published: Vec<(String, String, bool)>,
    }

    impl Transport for RecordingTransport {
        fn is_connected(&self) -> bool {
            self.connected
        }

        async fn connect(&mut self) -> Result<(), ProtocolError> {
            if let Some(code) = self.refuse_with {
                return Err(ProtocolError::ConnectionRefused { code });
            }
            self.connected = true;
            Ok(())
        }

        async fn subscribe(&mut self, topic: &str) -> Result<(), ProtocolError> {
            self.subscriptions.push(topic.to_string());
            Ok(())
        }

        async fn publish(
            &mut self,
            topic: &str,
            payload: String,
            retain: bool,
        ) -> Result<(), ProtocolError> {
            self.published.push((topic.to_string(), payload, retain));
            Ok(())
        }

        async fn next_message(&mut self) -> Option<InboundMessage> {
            std::future::pending().await
        }
    }

    fn bridge(connected: bool) -> Bridge<RecordingTransport> {
        let identity = DeviceIdentity::new("wpc01", "Water Pump", "Acme", "WPC-1", "1.0").unwrap();
        let transport = RecordingTransport {
            connected,
            ..Default::default()
        };
        Bridge::new(identity, transport)
    }

    #[tokio::test]
    async fn handle_message_applies_and_republishes() {
        let mut bridge = bridge(true);

        let command = bridge.handle_message("homeassistant/wpc01/main/set", "ON").await;

        assert_eq!(command, Some(Command::MainSwitch(SwitchState::On)));
        assert!(bridge.state().main_switch_on());
        assert_eq!(bridge.transport().published.len(), 1);

        let (topic, payload, retain) = &bridge.transport().published[0];
        assert_eq!(topic, "homeassistant/wpc01/state");
        assert!(payload.contains(r#""main":"ON""#));
        assert!(retain);
    }

    #[tokio::test]
    async fn unknown_topic_still_republishes() {
        let mut bridge = bridge(true);

        let command = bridge.handle_message("homeassistant/other/main/set", "ON").await;

        assert_eq!(command, None);
        assert!(!bridge.state().main_switch_on());
        assert_eq!(bridge.transport().published.len(), 1);
    }

    #[tokio::test]
    async fn reboot_ignores_other_payloads() {
        let mut bridge = bridge(true);
        let topic = bridge.topics().command(CommandTopic::Reboot);

        assert_eq!(bridge.handle_message(&topic, "ON").await, None);
        assert!(!bridge.state().reboot_requested());

        assert_eq!(bridge.handle_message(&topic, "PRESS").await, Some(Command::Reboot));
        assert!(bridge.state().reboot_requested());
    }

    #[tokio::test]
    async fn publish_state_skipped_while_disconnected() {
        let mut bridge = bridge(false);
        bridge.publish_state().await;
        bridge.publish_discovery().await;
        assert!(bridge.transport().published.is_empty());
    }

    #[tokio::test]
    async fn connect_subscribes_then_announces() {
        let mut bridge = bridge(false);

        bridge.connect().await.unwrap();

        assert!(bridge.is_connected());
        assert_eq!(bridge.transport().subscriptions, bridge.topics().subscriptions());
        assert_eq!(bridge.transport().published.len(), 8);
        assert!(bridge.transport().published.iter().all(|(_, _, retain)| *retain));
    }

    #[tokio::test]
    async fn refused_connect_does_nothing_else() {
        let mut bridge = bridge(false);
        bridge.transport_mut().refuse_with = Some(5);

        let result = bridge.connect().await;

        assert!(matches!(result, Err(ProtocolError::ConnectionRefused { code: 5 })));
        assert!(bridge.transport().subscriptions.is_empty());
        assert!(bridge.transport().published.is_empty());
    }

    #[tokio::test]
    async fn with_state_keeps_initial_values() {
        let identity = DeviceIdentity::new("wpc01", "Water Pump", "", "", "").unwrap();
        let mut state = ProcessState::new();
        state.set_temperature(18.5);

        let bridge = Bridge::with_state(identity, RecordingTransport::default(), state);
        assert!((bridge.state().temperature() - 18.5).abs() < f32::EPSILON);
        assert_eq!(bridge.identity().id(), "wpc01");
    }
}
