// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Broker-facing plumbing.
//!
//! - [`Transport`]: the seam between the bridge and an MQTT client
//! - [`MqttTransport`]: `rumqttc` implementation (feature `mqtt`)
//! - [`TopicTable`]: the fixed topic layout for one device

#[cfg(feature = "mqtt")]
mod mqtt;
mod topics;

#[cfg(feature = "mqtt")]
pub use mqtt::{MqttTransport, MqttTransportBuilder};
pub use topics::{TOPIC_PREFIX, TopicTable};

use crate::error::ProtocolError;

/// A message received from the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Topic the message was published on.
    pub topic: String,
    /// Payload, decoded as UTF-8 with invalid sequences replaced.
    pub payload: String,
}

impl InboundMessage {
    /// Creates a new inbound message.
    #[must_use]
    pub fn new(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }
}

/// Connection to an MQTT broker as seen by the bridge.
///
/// Endpoint, client id and credentials are part of the implementation's own
/// configuration; the bridge only asks it to connect.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Returns whether the connection is currently up.
    fn is_connected(&self) -> bool;

    /// Performs a single connection handshake.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the broker refuses the connection, the
    /// network fails, or the handshake times out.
    async fn connect(&mut self) -> Result<(), ProtocolError>;

    /// Subscribes to a topic.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the request cannot be queued.
    async fn subscribe(&mut self, topic: &str) -> Result<(), ProtocolError>;

    /// Publishes a payload.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the message cannot be sent.
    async fn publish(
        &mut self,
        topic: &str,
        payload: String,
        retain: bool,
    ) -> Result<(), ProtocolError>;

    /// Waits for the next inbound message.
    ///
    /// Returns `None` once the transport can never deliver another message.
    async fn next_message(&mut self) -> Option<InboundMessage>;
}
