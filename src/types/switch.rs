// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! On/off state as exchanged with Home Assistant switches.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Payload Home Assistant sends to turn a switch on.
pub const PAYLOAD_ON: &str = "ON";

/// Payload Home Assistant sends to turn a switch off.
pub const PAYLOAD_OFF: &str = "OFF";

/// Payload Home Assistant sends when a button entity is pressed.
pub const PAYLOAD_PRESS: &str = "PRESS";

/// Two-valued switch state.
///
/// Serializes as the literal strings `"ON"` and `"OFF"`, which is what the
/// switch entities' value templates compare against.
///
/// # Examples
///
/// ```
/// use pumpbridge::types::SwitchState;
///
/// assert_eq!(SwitchState::from(true).as_str(), "ON");
/// assert_eq!(SwitchState::from_payload("OFF"), SwitchState::Off);
///
/// // Matching is exact: anything but "ON" means off.
/// assert_eq!(SwitchState::from_payload("on"), SwitchState::Off);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SwitchState {
    /// Switch is off.
    #[default]
    Off,
    /// Switch is on.
    On,
}

impl SwitchState {
    /// Interprets a command payload.
    ///
    /// Only the exact string `"ON"` turns the switch on. Every other payload,
    /// including `"on"` and the empty string, is read as off.
    #[must_use]
    pub fn from_payload(payload: &str) -> Self {
        if payload == PAYLOAD_ON {
            Self::On
        } else {
            Self::Off
        }
    }

    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => PAYLOAD_OFF,
            Self::On => PAYLOAD_ON,
        }
    }

    /// Returns `true` for [`SwitchState::On`].
    #[must_use]
    pub const fn is_on(&self) -> bool {
        matches!(self, Self::On)
    }
}

impl fmt::Display for SwitchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<bool> for SwitchState {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}

impl From<SwitchState> for bool {
    fn from(value: SwitchState) -> Self {
        value.is_on()
    }
}
