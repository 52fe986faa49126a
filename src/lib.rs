// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `PumpBridge` - Home Assistant MQTT bridge for a water pump controller.
//!
//! This library exposes a pump controller's process values and switches to
//! Home Assistant through an MQTT broker, using Home Assistant's discovery
//! convention.
//!
//! # What It Does
//!
//! - **Discovery**: Announces three sensors (pressure, temperature, flow),
//!   four switches (motor, main, override, error) and a reboot button
//! - **State**: Publishes the full controller state as one retained JSON
//!   document
//! - **Commands**: Applies switch and button commands sent by Home Assistant
//! - **Connection**: Connects, subscribes and re-announces after every
//!   (re)connect
//!
//! # Topics
//!
//! ```text
//! homeassistant/<id>/state                          retained JSON state
//! homeassistant/<id>/{motor,override,main,error}/set   ON / OFF
//! homeassistant/<id>/reboot/set                       PRESS
//! homeassistant/<component>/<id>_<entity>/config    retained discovery
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use pumpbridge::{Bridge, DeviceIdentity, MqttTransport, RuntimeSettings};
//!
//! #[tokio::main]
//! async fn main() -> pumpbridge::Result<()> {
//!     let identity = DeviceIdentity::new("wpc01", "Water Pump", "Acme", "WPC-1", "1.0.0")?;
//!     let transport = MqttTransport::builder()
//!         .broker_url("mqtt://192.168.1.50:1883")
//!         .credentials("pump", "secret")
//!         .client_id(identity.id())
//!         .build()?;
//!
//!     let mut bridge = Bridge::new(identity, transport);
//!     bridge.state_mut().set_pressure(2.4);
//!
//!     // Connects, announces, republishes every 5 s and reconnects as needed.
//!     bridge
//!         .run_until(RuntimeSettings::default(), tokio::time::sleep(Duration::from_secs(3600)))
//!         .await;
//!     Ok(())
//! }
//! ```
//!
//! # Driving the Bridge Manually
//!
//! Every operation of the runtime loop is also available on its own, for
//! controllers that already own a main loop:
//!
//! ```ignore
//! loop {
//!     if !bridge.is_connected() {
//!         let _ = bridge.connect().await;
//!     }
//!     while let Some(msg) = next_inbound() {
//!         bridge.handle_message(&msg.topic, &msg.payload).await;
//!     }
//!     if bridge.state_mut().take_reboot_request() {
//!         reboot();
//!     }
//!     bridge.publish_state().await;
//! }
//! ```

mod bridge;
pub mod command;
mod config;
pub mod discovery;
pub mod error;
pub mod protocol;
pub mod state;
pub mod types;

pub use bridge::Bridge;
pub use command::{Command, CommandTopic};
pub use config::{DeviceIdentity, RuntimeSettings};
pub use error::{ConfigError, Error, ProtocolError, Result};
#[cfg(feature = "mqtt")]
pub use protocol::{MqttTransport, MqttTransportBuilder};
pub use protocol::{InboundMessage, TopicTable, Transport};
pub use state::{ProcessState, StateSnapshot};
pub use types::SwitchState;
