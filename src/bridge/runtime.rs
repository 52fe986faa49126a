// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Periodic driver for a [`Bridge`].

use std::future::Future;
use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};

use super::Bridge;
use crate::config::RuntimeSettings;
use crate::protocol::Transport;

/// Shortest accepted tick period; `interval` panics on zero.
const MIN_TICK: Duration = Duration::from_millis(1);

impl<T: Transport> Bridge<T> {
    /// Drives the bridge until `shutdown` completes.
    ///
    /// On every tick of the reconnect interval a disconnected bridge makes one
    /// [`connect`](Self::connect) attempt. On every tick of the state interval
    /// the state is republished. Inbound messages are handled as they arrive.
    /// The first ticks fire immediately, so the bridge connects and publishes
    /// on entry.
    ///
    /// Returns early if the transport reports it will never deliver another
    /// message.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::time::Duration;
    ///
    /// use pumpbridge::{Bridge, DeviceIdentity, RuntimeSettings};
    /// use pumpbridge::protocol::MqttTransport;
    ///
    /// # async fn example() -> pumpbridge::Result<()> {
    /// let identity = DeviceIdentity::new("wpc01", "Water Pump", "Acme", "WPC-1", "1.0.0")?;
    /// let transport = MqttTransport::builder().host("broker.local").build()?;
    /// let mut bridge = Bridge::new(identity, transport);
    ///
    /// let settings = RuntimeSettings::default().with_state_interval(Duration::from_secs(2));
    /// bridge
    ///     .run_until(settings, tokio::time::sleep(Duration::from_secs(60)))
    ///     .await;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run_until<F>(&mut self, settings: RuntimeSettings, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let mut reconnect_ticker = interval(settings.reconnect_interval().max(MIN_TICK));
        reconnect_ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut state_ticker = interval(settings.state_interval().max(MIN_TICK));
        state_ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            device = %self.identity.id(),
            state_interval = ?settings.state_interval(),
            reconnect_interval = ?settings.reconnect_interval(),
            "Bridge runtime started"
        );

        loop {
            tokio::select! {
                biased;

                () = &mut shutdown => {
                    tracing::info!(device = %self.identity.id(), "Bridge runtime stopping");
                    break;
                }

                _ = reconnect_ticker.tick() => {
                    if !self.transport.is_connected() {
                        // Failures are logged by connect; the next tick retries.
                        let _ = self.connect().await;
                    }
                }

                message = self.transport.next_message() => match message {
                    Some(message) => {
                        self.handle_message(&message.topic, &message.payload).await;
                    }
                    None => {
                        tracing::warn!(device = %self.identity.id(), "Transport closed, stopping bridge runtime");
                        break;
                    }
                },

                _ = state_ticker.tick() => {
                    self.publish_state().await;
                }
            }
        }
    }
}
