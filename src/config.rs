// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Static configuration of the bridge.
//!
//! Broker endpoint and credentials live with the transport
//! ([`MqttTransportBuilder`](crate::protocol::MqttTransportBuilder)); this
//! module holds what the bridge itself needs: who the device is and how often
//! the runtime loop does its housekeeping.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default interval between periodic state publishes.
const DEFAULT_STATE_INTERVAL: Duration = Duration::from_secs(5);

/// Default interval between reconnect attempts.
const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_secs(5);

/// Identity of the controller as presented to Home Assistant.
///
/// The id doubles as a topic level (`homeassistant/<id>/...`) and as the
/// prefix of every entity's unique id, so it is validated on construction.
///
/// # Examples
///
/// ```
/// use pumpbridge::DeviceIdentity;
///
/// let identity = DeviceIdentity::new("wpc01", "Water Pump", "Acme", "WPC-1", "1.2.0")?;
/// assert_eq!(identity.id(), "wpc01");
///
/// assert!(DeviceIdentity::new("wpc/01", "Water Pump", "Acme", "WPC-1", "1.2.0").is_err());
/// # Ok::<(), pumpbridge::error::ConfigError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    id: String,
    name: String,
    manufacturer: String,
    model: String,
    version: String,
}

impl DeviceIdentity {
    /// Creates a validated device identity.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyField`] if the id or name is empty, and
    /// [`ConfigError::InvalidTopicLevel`] if the id contains `/`, `+` or `#`.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        manufacturer: impl Into<String>,
        model: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let identity = Self {
            id: id.into(),
            name: name.into(),
            manufacturer: manufacturer.into(),
            model: model.into(),
            version: version.into(),
        };
        identity.validate()?;
        Ok(identity)
    }

    /// Checks the invariants `new` enforces.
    ///
    /// Useful after deserializing an identity from a file.
    ///
    /// # Errors
    ///
    /// See [`DeviceIdentity::new`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.id.is_empty() {
            return Err(ConfigError::EmptyField("device id"));
        }
        if self.name.is_empty() {
            return Err(ConfigError::EmptyField("device name"));
        }
        validate_topic_level("device id", &self.id)
    }

    /// Returns the device id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the manufacturer.
    #[must_use]
    pub fn manufacturer(&self) -> &str {
        &self.manufacturer
    }

    /// Returns the model.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the firmware version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }
}

/// Rejects values that would split or wildcard an MQTT topic.
pub(crate) fn validate_topic_level(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.contains(['/', '+', '#']) {
        return Err(ConfigError::InvalidTopicLevel {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Timing of the bridge's runtime loop.
///
/// # Examples
///
/// ```
/// use pumpbridge::RuntimeSettings;
/// use std::time::Duration;
///
/// let settings = RuntimeSettings::default()
///     .with_state_interval(Duration::from_secs(2));
/// assert_eq!(settings.state_interval(), Duration::from_secs(2));
/// assert_eq!(settings.reconnect_interval(), Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeSettings {
    state_interval: Duration,
    reconnect_interval: Duration,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            state_interval: DEFAULT_STATE_INTERVAL,
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
        }
    }
}

impl RuntimeSettings {
    /// Sets how often the full state is republished (default: 5 seconds).
    #[must_use]
    pub fn with_state_interval(mut self, interval: Duration) -> Self {
        self.state_interval = interval;
        self
    }

    /// Sets how often a lost connection is retried (default: 5 seconds).
    #[must_use]
    pub fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = interval;
        self
    }

    /// Returns the state publish interval.
    #[must_use]
    pub fn state_interval(&self) -> Duration {
        self.state_interval
    }

    /// Returns the reconnect interval.
    #[must_use]
    pub fn reconnect_interval(&self) -> Duration {
        self.reconnect_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(id: &str) -> Result<DeviceIdentity, ConfigError> {
        DeviceIdentity::new(id, "Water Pump", "Acme", "WPC-1", "1.0.0")
    }

    #[test]
    fn identity_accessors() {
        let identity = identity("wpc01").unwrap();
        assert_eq!(identity.id(), "wpc01");
        assert_eq!(identity.name(), "Water Pump");
        assert_eq!(identity.manufacturer(), "Acme");
        assert_eq!(identity.model(), "WPC-1");
        assert_eq!(identity.version(), "1.0.0");
    }

    #[test]
    fn identity_rejects_empty_id() {
        assert_eq!(identity(""), Err(ConfigError::EmptyField("device id")));
    }

    #[test]
    fn identity_rejects_empty_name() {
        let result = DeviceIdentity::new("wpc01", "", "Acme", "WPC-1", "1.0.0");
        assert_eq!(result, Err(ConfigError::EmptyField("device name")));
    }

    #[test]
    fn identity_rejects_topic_characters() {
        for id in ["a/b", "a+", "#"] {
            assert!(matches!(
                identity(id),
                Err(ConfigError::InvalidTopicLevel { field: "device id", .. })
            ));
        }
    }

    #[test]
    fn identity_allows_empty_optional_metadata() {
        assert!(DeviceIdentity::new("wpc01", "Pump", "", "", "").is_ok());
    }

    #[test]
    fn deserialized_identity_can_be_validated() {
        let json = r#"{"id":"bad/id","name":"Pump","manufacturer":"","model":"","version":""}"#;
        let identity: DeviceIdentity = serde_json::from_str(json).unwrap();
        assert!(identity.validate().is_err());
    }

    #[test]
    fn runtime_settings_defaults() {
        let settings = RuntimeSettings::default();
        assert_eq!(settings.state_interval(), Duration::from_secs(5));
        assert_eq!(settings.reconnect_interval(), Duration::from_secs(5));
    }

    #[test]
    fn runtime_settings_chain() {
        let settings = RuntimeSettings::default()
            .with_state_interval(Duration::from_secs(30))
            .with_reconnect_interval(Duration::from_secs(2));
        assert_eq!(settings.state_interval(), Duration::from_secs(30));
        assert_eq!(settings.reconnect_interval(), Duration::from_secs(2));
    }
}
