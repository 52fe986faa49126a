// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Inbound commands from Home Assistant.
//!
//! Home Assistant drives the controller through five command topics, all of
//! the form `homeassistant/<device_id>/<suffix>`:
//!
//! | Topic | Suffix | Payload | Effect |
//! |-------|--------|---------|--------|
//! | [`CommandTopic::Motor`] | `motor/set` | `ON` / other | Manual motor request |
//! | [`CommandTopic::Override`] | `override/set` | `ON` / other | Manual override |
//! | [`CommandTopic::Main`] | `main/set` | `ON` / other | Main power switch |
//! | [`CommandTopic::Error`] | `error/set` | `ON` / other | Error flag |
//! | [`CommandTopic::Reboot`] | `reboot/set` | `PRESS` | Reboot request |
//!
//! # Examples
//!
//! ```
//! use pumpbridge::command::{Command, CommandTopic};
//! use pumpbridge::types::SwitchState;
//!
//! let cmd = Command::parse(CommandTopic::Main, "ON");
//! assert_eq!(cmd, Some(Command::MainSwitch(SwitchState::On)));
//!
//! // The reboot button only reacts to its press payload.
//! assert_eq!(Command::parse(CommandTopic::Reboot, "ON"), None);
//! ```

use std::fmt;

use crate::types::{PAYLOAD_PRESS, SwitchState};

/// One of the command topics the bridge subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandTopic {
    /// Manual motor on/off.
    Motor,
    /// Manual override on/off.
    Override,
    /// Main power switch.
    Main,
    /// Error flag.
    Error,
    /// Reboot button.
    Reboot,
}

impl CommandTopic {
    /// All command topics, in subscription order.
    pub const ALL: [Self; 5] = [
        Self::Motor,
        Self::Override,
        Self::Main,
        Self::Error,
        Self::Reboot,
    ];

    /// Returns the topic suffix after `homeassistant/<device_id>/`.
    #[must_use]
    pub const fn suffix(&self) -> &'static str {
        match self {
            Self::Motor => "motor/set",
            Self::Override => "override/set",
            Self::Main => "main/set",
            Self::Error => "error/set",
            Self::Reboot => "reboot/set",
        }
    }
}

impl fmt::Display for CommandTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// A decoded command, ready to be applied to the process state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Request the motor on or off while in manual mode.
    ManualMotor(SwitchState),
    /// Enable or disable manual override.
    Override(SwitchState),
    /// Switch main power.
    MainSwitch(SwitchState),
    /// Set or clear the error flag.
    Error(SwitchState),
    /// Ask the controller to reboot.
    Reboot,
}

impl Command {
    /// Decodes the payload received on `topic`.
    ///
    /// Switch topics always yield a command: `"ON"` means on and anything
    /// else means off. The reboot topic yields [`Command::Reboot`] only for
    /// the exact payload `"PRESS"` and `None` otherwise.
    #[must_use]
    pub fn parse(topic: CommandTopic, payload: &str) -> Option<Self> {
        match topic {
            CommandTopic::Motor => Some(Self::ManualMotor(SwitchState::from_payload(payload))),
            CommandTopic::Override => Some(Self::Override(SwitchState::from_payload(payload))),
            CommandTopic::Main => Some(Self::MainSwitch(SwitchState::from_payload(payload))),
            CommandTopic::Error => Some(Self::Error(SwitchState::from_payload(payload))),
            CommandTopic::Reboot => (payload == PAYLOAD_PRESS).then_some(Self::Reboot),
        }
    }

    /// Returns the topic this command arrives on.
    #[must_use]
    pub const fn topic(&self) -> CommandTopic {
        match self {
            Self::ManualMotor(_) => CommandTopic::Motor,
            Self::Override(_) => CommandTopic::Override,
            Self::MainSwitch(_) => CommandTopic::Main,
            Self::Error(_) => CommandTopic::Error,
            Self::Reboot => CommandTopic::Reboot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffixes() {
        assert_eq!(CommandTopic::Motor.suffix(), "motor/set");
        assert_eq!(CommandTopic::Override.suffix(), "override/set");
        assert_eq!(CommandTopic::Main.suffix(), "main/set");
        assert_eq!(CommandTopic::Error.suffix(), "error/set");
        assert_eq!(CommandTopic::Reboot.suffix(), "reboot/set");
    }

    #[test]
    fn all_topics_are_distinct() {
        let mut suffixes: Vec<_> = CommandTopic::ALL.iter().map(CommandTopic::suffix).collect();
        suffixes.sort_unstable();
        suffixes.dedup();
        assert_eq!(suffixes.len(), 5);
    }

    #[test]
    fn parse_switch_on() {
        assert_eq!(
            Command::parse(CommandTopic::Motor, "ON"),
            Some(Command::ManualMotor(SwitchState::On))
        );
        assert_eq!(
            Command::parse(CommandTopic::Override, "ON"),
            Some(Command::Override(SwitchState::On))
        );
        assert_eq!(
            Command::parse(CommandTopic::Error, "ON"),
            Some(Command::Error(SwitchState::On))
        );
    }

    #[test]
    fn parse_switch_anything_else_is_off() {
        for payload in ["OFF", "", "on", "PRESS", "true"] {
            assert_eq!(
                Command::parse(CommandTopic::Main, payload),
                Some(Command::MainSwitch(SwitchState::Off)),
                "payload {payload:?}"
            );
        }
    }

    #[test]
    fn parse_reboot_requires_press() {
        assert_eq!(
            Command::parse(CommandTopic::Reboot, "PRESS"),
            Some(Command::Reboot)
        );
        assert_eq!(Command::parse(CommandTopic::Reboot, "press"), None);
        assert_eq!(Command::parse(CommandTopic::Reboot, "ON"), None);
        assert_eq!(Command::parse(CommandTopic::Reboot, ""), None);
    }

    #[test]
    fn command_topic_round_trip() {
        for topic in CommandTopic::ALL {
            let payload = if topic == CommandTopic::Reboot { "PRESS" } else { "ON" };
            let cmd = Command::parse(topic, payload).unwrap();
            assert_eq!(cmd.topic(), topic);
        }
    }
}
