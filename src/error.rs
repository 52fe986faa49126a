// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the bridge.
//!
//! Configuration problems are reported when identities and transports are
//! built. Protocol errors come from the broker connection. Neither kind is
//! raised from the publish paths: those log and carry on.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error occurred during broker communication.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// A payload could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while validating configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required field was left empty.
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    /// A value that ends up as an MQTT topic level contains a separator or
    /// wildcard character.
    #[error("{field} {value:?} is not a valid MQTT topic level")]
    InvalidTopicLevel {
        /// The offending field.
        field: &'static str,
        /// The rejected value.
        value: String,
    },

    /// Invalid broker URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

/// Errors related to the broker connection.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The MQTT client rejected a request.
    #[cfg(feature = "mqtt")]
    #[error("MQTT error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// The broker answered the handshake with a non-zero return code.
    #[error("connection refused by broker, rc={code}")]
    ConnectionRefused {
        /// CONNACK return code as sent by the broker.
        code: u8,
    },

    /// Connection to the broker failed before a CONNACK arrived.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Handshake timed out.
    #[error("connection timed out after {0} ms")]
    Timeout(u64),

    /// The transport has no live connection.
    #[error("not connected")]
    NotConnected,
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::InvalidTopicLevel {
            field: "device id",
            value: "pump/1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "device id \"pump/1\" is not a valid MQTT topic level"
        );
        assert_eq!(
            ConfigError::EmptyField("host").to_string(),
            "host must not be empty"
        );
    }

    #[test]
    fn protocol_error_display() {
        let err = ProtocolError::ConnectionRefused { code: 5 };
        assert_eq!(err.to_string(), "connection refused by broker, rc=5");
        assert_eq!(
            ProtocolError::Timeout(10_000).to_string(),
            "connection timed out after 10000 ms"
        );
    }

    #[test]
    fn error_from_config_error() {
        let err: Error = ConfigError::EmptyField("device id").into();
        assert!(matches!(
            err,
            Error::Config(ConfigError::EmptyField("device id"))
        ));
    }

    #[test]
    fn error_from_protocol_error() {
        let err: Error = ProtocolError::NotConnected.into();
        assert_eq!(err.to_string(), "protocol error: not connected");
    }
}
