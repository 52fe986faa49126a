// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Topic layout of the bridge.
//!
//! All topics live under the Home Assistant discovery prefix:
//!
//! ```text
//! homeassistant/<device_id>/state                        (out, retained)
//! homeassistant/<device_id>/{motor,override,...}/set     (in)
//! homeassistant/<component>/<device_id>_<entity>/config  (out, retained)
//! ```
//!
//! The [`TopicTable`] is built once from the device id so that routing an
//! inbound message is a single map lookup instead of rebuilding topic strings
//! per message.

use std::collections::HashMap;

use crate::command::CommandTopic;

/// Root of every topic the bridge uses.
pub const TOPIC_PREFIX: &str = "homeassistant";

/// Precomputed topics for one device.
///
/// # Examples
///
/// ```
/// use pumpbridge::command::CommandTopic;
/// use pumpbridge::protocol::TopicTable;
///
/// let topics = TopicTable::new("wpc01");
/// assert_eq!(topics.state(), "homeassistant/wpc01/state");
/// assert_eq!(
///     topics.resolve("homeassistant/wpc01/main/set"),
///     Some(CommandTopic::Main)
/// );
/// assert_eq!(topics.resolve("homeassistant/other/main/set"), None);
/// ```
#[derive(Debug, Clone)]
pub struct TopicTable {
    device_id: String,
    state: String,
    commands: HashMap<String, CommandTopic>,
}

impl TopicTable {
    /// Builds the topic table for `device_id`.
    #[must_use]
    pub fn new(device_id: impl Into<String>) -> Self {
        let device_id = device_id.into();
        let state = format!("{TOPIC_PREFIX}/{device_id}/state");
        let commands = CommandTopic::ALL
            .into_iter()
            .map(|topic| (command_topic(&device_id, topic), topic))
            .collect();

        Self {
            device_id,
            state,
            commands,
        }
    }

    /// Returns the device id the table was built for.
    #[must_use]
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Returns the state topic.
    #[must_use]
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Resolves an inbound topic to the command it carries.
    ///
    /// Matching is exact; wildcards, prefixes and trailing slashes do not
    /// match.
    #[must_use]
    pub fn resolve(&self, topic: &str) -> Option<CommandTopic> {
        self.commands.get(topic).copied()
    }

    /// Returns the full topic for a command.
    #[must_use]
    pub fn command(&self, topic: CommandTopic) -> String {
        command_topic(&self.device_id, topic)
    }

    /// Returns the topics to subscribe to, in [`CommandTopic::ALL`] order.
    #[must_use]
    pub fn subscriptions(&self) -> Vec<String> {
        CommandTopic::ALL
            .into_iter()
            .map(|topic| self.command(topic))
            .collect()
    }

    /// Returns the discovery config topic for an entity.
    ///
    /// Format: `homeassistant/<component>/<device_id>_<entity_id>/config`.
    #[must_use]
    pub fn discovery(&self, component: &str, entity_id: &str) -> String {
        let device_id = &self.device_id;
        format!("{TOPIC_PREFIX}/{component}/{device_id}_{entity_id}/config")
    }
}

fn command_topic(device_id: &str, topic: CommandTopic) -> String {
    let suffix = topic.suffix();
    format!("{TOPIC_PREFIX}/{device_id}/{suffix}")
}
