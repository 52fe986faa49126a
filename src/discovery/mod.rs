// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Home Assistant MQTT discovery descriptors.
//!
//! Home Assistant creates entities automatically when it sees a retained
//! config message on `homeassistant/<component>/<object_id>/config`. The
//! controller announces eight entities:
//!
//! | Entity | Component | Reads | Commands |
//! |--------|-----------|-------|----------|
//! | Pressure | sensor | `pressure` | |
//! | Temperature | sensor | `temperature` | |
//! | Flow Rate | sensor | `flow` | |
//! | Pump Motor | switch | `motor` | `motor/set` |
//! | Main Power | switch | `main` | `main/set` |
//! | Manual Override | switch | `override` | `override/set` |
//! | System Error | switch | `error` | `error/set` |
//! | Reboot Device | button | | `reboot/set` |
//!
//! Sensors and switches read from the shared state topic through a value
//! template; every descriptor embeds the same [`DeviceInfo`] so Home
//! Assistant groups them under one device.
//!
//! # Examples
//!
//! ```
//! use pumpbridge::DeviceIdentity;
//! use pumpbridge::discovery;
//! use pumpbridge::protocol::TopicTable;
//!
//! let identity = DeviceIdentity::new("wpc01", "Water Pump", "Acme", "WPC-1", "1.0.0")?;
//! let topics = TopicTable::new(identity.id());
//!
//! let configs = discovery::build_configs(&identity, &topics);
//! assert_eq!(configs.len(), 8);
//! assert_eq!(configs[0].topic, "homeassistant/sensor/wpc01_pressure/config");
//! # Ok::<(), pumpbridge::error::ConfigError>(())
//! ```

use std::fmt;

use serde::Serialize;

use crate::command::CommandTopic;
use crate::config::DeviceIdentity;
use crate::protocol::TopicTable;
use crate::types::{PAYLOAD_OFF, PAYLOAD_ON, PAYLOAD_PRESS};

/// Home Assistant entity platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    /// Read-only measurement.
    Sensor,
    /// On/off entity with state and command topics.
    Switch,
    /// Stateless trigger.
    Button,
}

impl Component {
    /// Returns the component name used in discovery topics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sensor => "sensor",
            Self::Switch => "switch",
            Self::Button => "button",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static description of one announced entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitySpec {
    /// Entity id, also the key read from the state payload.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Platform.
    pub component: Component,
    /// Material Design icon.
    pub icon: &'static str,
    /// Unit of measurement (sensors only).
    pub unit: Option<&'static str>,
    /// Device class (sensors only).
    pub device_class: Option<&'static str>,
    /// Command topic (switches and buttons).
    pub command: Option<CommandTopic>,
}

/// The entities announced for the controller, in publish order.
pub const ENTITIES: [EntitySpec; 8] = [
    EntitySpec {
        id: "pressure",
        name: "Pressure",
        component: Component::Sensor,
        icon: "mdi:gauge",
        unit: Some("bar"),
        device_class: Some("pressure"),
        command: None,
    },
    EntitySpec {
        id: "temperature",
        name: "Temperature",
        component: Component::Sensor,
        icon: "mdi:thermometer",
        unit: Some("°C"),
        device_class: Some("temperature"),
        command: None,
    },
    EntitySpec {
        id: "flow",
        name: "Flow Rate",
        component: Component::Sensor,
        icon: "mdi:water",
        unit: Some("L/min"),
        device_class: None,
        command: None,
    },
    EntitySpec {
        id: "motor",
        name: "Pump Motor",
        component: Component::Switch,
        icon: "mdi:pump",
        unit: None,
        device_class: None,
        command: Some(CommandTopic::Motor),
    },
    EntitySpec {
        id: "main",
        name: "Main Power",
        component: Component::Switch,
        icon: "mdi:power",
        unit: None,
        device_class: None,
        command: Some(CommandTopic::Main),
    },
    EntitySpec {
        id: "override",
        name: "Manual Override",
        component: Component::Switch,
        icon: "mdi:account-wrench",
        unit: None,
        device_class: None,
        command: Some(CommandTopic::Override),
    },
    EntitySpec {
        id: "error",
        name: "System Error",
        component: Component::Switch,
        icon: "mdi:alert",
        unit: None,
        device_class: None,
        command: Some(CommandTopic::Error),
    },
    EntitySpec {
        id: "reboot",
        name: "Reboot Device",
        component: Component::Button,
        icon: "mdi:restart",
        unit: None,
        device_class: None,
        command: Some(CommandTopic::Reboot),
    },
];

/// Device block shared by every descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    /// Identifiers Home Assistant uses to group entities.
    pub identifiers: Vec<String>,
    /// Device name.
    pub name: String,
    /// Manufacturer.
    pub manufacturer: String,
    /// Model.
    pub model: String,
    /// Firmware version.
    pub sw_version: String,
}

impl From<&DeviceIdentity> for DeviceInfo {
    fn from(identity: &DeviceIdentity) -> Self {
        Self {
            identifiers: vec![identity.id().to_string()],
            name: identity.name().to_string(),
            manufacturer: identity.manufacturer().to_string(),
            model: identity.model().to_string(),
            sw_version: identity.version().to_string(),
        }
    }
}

/// Discovery config payload for one entity.
///
/// Optional fields are omitted from the JSON when not set, so sensors carry
/// no command topic and the button carries no state topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveryDescriptor {
    /// Display name.
    pub name: String,
    /// `<device_id>_<entity_id>`.
    pub unique_id: String,
    /// Topic the entity reads its state from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_topic: Option<String>,
    /// Topic the entity publishes commands to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_topic: Option<String>,
    /// Jinja template extracting this entity's value from the state payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_template: Option<String>,
    /// Unit of measurement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_of_measurement: Option<String>,
    /// Device class.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_class: Option<String>,
    /// Payload meaning "on".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_on: Option<String>,
    /// Payload meaning "off".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_off: Option<String>,
    /// Payload sent when the button is pressed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_press: Option<String>,
    /// Material Design icon.
    pub icon: String,
    /// Shared device block.
    pub device: DeviceInfo,
}

impl DiscoveryDescriptor {
    /// Builds the descriptor for `entity`.
    #[must_use]
    pub fn for_entity(entity: &EntitySpec, device: &DeviceInfo, topics: &TopicTable) -> Self {
        let reads_state = entity.component != Component::Button;
        let is_switch = entity.component == Component::Switch;
        let is_button = entity.component == Component::Button;

        Self {
            name: entity.name.to_string(),
            unique_id: format!("{}_{}", topics.device_id(), entity.id),
            state_topic: reads_state.then(|| topics.state().to_string()),
            command_topic: entity.command.map(|command| topics.command(command)),
            value_template: reads_state.then(|| format!("{{{{ value_json.{} }}}}", entity.id)),
            unit_of_measurement: entity.unit.map(str::to_string),
            device_class: entity.device_class.map(str::to_string),
            payload_on: is_switch.then(|| PAYLOAD_ON.to_string()),
            payload_off: is_switch.then(|| PAYLOAD_OFF.to_string()),
            payload_press: is_button.then(|| PAYLOAD_PRESS.to_string()),
            icon: entity.icon.to_string(),
            device: device.clone(),
        }
    }

    /// Serializes the descriptor to its JSON payload.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// A descriptor paired with the topic it is published on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// `homeassistant/<component>/<device_id>_<entity_id>/config`.
    pub topic: String,
    /// The config payload.
    pub descriptor: DiscoveryDescriptor,
}

/// Builds the discovery configs for every entity in [`ENTITIES`].
#[must_use]
pub fn build_configs(identity: &DeviceIdentity, topics: &TopicTable) -> Vec<DiscoveryConfig> {
    let device = DeviceInfo::from(identity);

    ENTITIES
        .iter()
        .map(|entity| DiscoveryConfig {
            topic: topics.discovery(entity.component.as_str(), entity.id),
            descriptor: DiscoveryDescriptor::for_entity(entity, &device, topics),
        })
        .collect()
}
