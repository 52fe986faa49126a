// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Serialized form of the state topic.

use serde::{Deserialize, Serialize};

use crate::types::SwitchState;

/// Payload published on `homeassistant/<device_id>/state`.
///
/// Switch values are the literal strings `"ON"`/`"OFF"` so the switch
/// entities' value templates can be compared against their `payload_on`.
///
/// ```json
/// {"pressure":1.5,"temperature":22.0,"flow":3.0,"motor":"ON",
///  "override":"OFF","main":"ON","error":"OFF","reboot_requested":false}
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Pressure in bar.
    pub pressure: f32,
    /// Temperature in degrees Celsius.
    pub temperature: f32,
    /// Flow in litres per minute.
    pub flow: f32,
    /// Actual motor state.
    pub motor: SwitchState,
    /// Manual override.
    #[serde(rename = "override")]
    pub manual_override: SwitchState,
    /// Main power switch.
    pub main: SwitchState,
    /// Error flag.
    pub error: SwitchState,
    /// Pending reboot request.
    pub reboot_requested: bool,
}

impl StateSnapshot {
    /// Serializes the snapshot to its JSON payload.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_expected_keys() {
        let snapshot = StateSnapshot {
            pressure: 1.5,
            temperature: 22.0,
            flow: 3.0,
            motor: SwitchState::On,
            manual_override: SwitchState::Off,
            main: SwitchState::On,
            error: SwitchState::Off,
            reboot_requested: false,
        };

        let value: serde_json::Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "pressure": 1.5,
                "temperature": 22.0,
                "flow": 3.0,
                "motor": "ON",
                "override": "OFF",
                "main": "ON",
                "error": "OFF",
                "reboot_requested": false
            })
        );
    }

    #[test]
    fn whole_numbers_keep_decimal_point() {
        let snapshot = StateSnapshot {
            pressure: 0.0,
            temperature: 22.0,
            flow: 3.0,
            motor: SwitchState::Off,
            manual_override: SwitchState::Off,
            main: SwitchState::Off,
            error: SwitchState::Off,
            reboot_requested: true,
        };
        let json = snapshot.to_json().unwrap();
        assert!(json.contains(r#""temperature":22.0"#));
        assert!(json.contains(r#""reboot_requested":true"#));
    }
}
