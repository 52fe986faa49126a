// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Process state of the pump controller.

use crate::command::Command;
use crate::types::SwitchState;

use super::StateSnapshot;

/// Sensor readings and control flags of the controller.
///
/// The bridge owns one instance. Sensor and motor-control code updates it
/// through [`Bridge::state_mut`](crate::Bridge::state_mut) between polling
/// cycles; inbound commands update it through [`ProcessState::apply`].
///
/// Every flag is independent. In particular `manual_override` and
/// `manual_motor_request` may hold any combination; whatever policy ties them
/// together lives in the control logic.
///
/// # Examples
///
/// ```
/// use pumpbridge::state::ProcessState;
/// use pumpbridge::command::Command;
/// use pumpbridge::types::SwitchState;
///
/// let mut state = ProcessState::new();
/// state.set_pressure(2.4);
///
/// let changed = state.apply(&Command::MainSwitch(SwitchState::On));
/// assert!(changed);
/// assert!(state.main_switch_on());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessState {
    /// Line pressure in bar.
    pressure: f32,
    /// Water temperature in degrees Celsius.
    temperature: f32,
    /// Flow rate in litres per minute.
    flow: f32,
    /// Whether the motor is actually running.
    motor_on: bool,
    /// Manual override enabled.
    manual_override: bool,
    /// Motor state requested while in manual mode.
    manual_motor_request: bool,
    /// Main power switch.
    main_switch_on: bool,
    /// Error flag.
    error_flag: bool,
    /// Reboot requested and not yet consumed.
    reboot_requested: bool,
}

impl ProcessState {
    /// Creates a zeroed state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Sensor readings ==========

    /// Returns the pressure in bar.
    #[must_use]
    pub fn pressure(&self) -> f32 {
        self.pressure
    }

    /// Sets the pressure in bar.
    pub fn set_pressure(&mut self, value: f32) {
        self.pressure = value;
    }

    /// Returns the temperature in degrees Celsius.
    #[must_use]
    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Sets the temperature in degrees Celsius.
    pub fn set_temperature(&mut self, value: f32) {
        self.temperature = value;
    }

    /// Returns the flow rate in litres per minute.
    #[must_use]
    pub fn flow(&self) -> f32 {
        self.flow
    }

    /// Sets the flow rate in litres per minute.
    pub fn set_flow(&mut self, value: f32) {
        self.flow = value;
    }

    // ========== Control flags ==========

    /// Returns whether the motor is running.
    #[must_use]
    pub fn motor_on(&self) -> bool {
        self.motor_on
    }

    /// Records whether the motor is running.
    pub fn set_motor_on(&mut self, value: bool) {
        self.motor_on = value;
    }

    /// Returns whether manual override is enabled.
    #[must_use]
    pub fn manual_override(&self) -> bool {
        self.manual_override
    }

    /// Enables or disables manual override.
    pub fn set_manual_override(&mut self, value: bool) {
        self.manual_override = value;
    }

    /// Returns the motor state requested for manual mode.
    #[must_use]
    pub fn manual_motor_request(&self) -> bool {
        self.manual_motor_request
    }

    /// Sets the motor state requested for manual mode.
    pub fn set_manual_motor_request(&mut self, value: bool) {
        self.manual_motor_request = value;
    }

    /// Returns whether main power is switched on.
    #[must_use]
    pub fn main_switch_on(&self) -> bool {
        self.main_switch_on
    }

    /// Switches main power.
    pub fn set_main_switch_on(&mut self, value: bool) {
        self.main_switch_on = value;
    }

    /// Returns the error flag.
    #[must_use]
    pub fn error_flag(&self) -> bool {
        self.error_flag
    }

    /// Sets the error flag.
    pub fn set_error_flag(&mut self, value: bool) {
        self.error_flag = value;
    }

    /// Returns whether a reboot has been requested.
    #[must_use]
    pub fn reboot_requested(&self) -> bool {
        self.reboot_requested
    }

    /// Sets the reboot request flag.
    pub fn set_reboot_requested(&mut self, value: bool) {
        self.reboot_requested = value;
    }

    /// Consumes a pending reboot request.
    ///
    /// Returns `true` once per request and clears the flag.
    pub fn take_reboot_request(&mut self) -> bool {
        std::mem::take(&mut self.reboot_requested)
    }

    // ========== Commands ==========

    /// Applies an inbound command.
    ///
    /// Returns `true` if the state actually changed.
    pub fn apply(&mut self, command: &Command) -> bool {
        let (flag, value) = match *command {
            Command::ManualMotor(state) => (&mut self.manual_motor_request, state.is_on()),
            Command::Override(state) => (&mut self.manual_override, state.is_on()),
            Command::MainSwitch(state) => (&mut self.main_switch_on, state.is_on()),
            Command::Error(state) => (&mut self.error_flag, state.is_on()),
            Command::Reboot => (&mut self.reboot_requested, true),
        };
        let changed = *flag != value;
        *flag = value;
        changed
    }

    /// Captures the values published on the state topic.
    #[must_use]
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            pressure: self.pressure,
            temperature: self.temperature,
            flow: self.flow,
            motor: SwitchState::from(self.motor_on),
            manual_override: SwitchState::from(self.manual_override),
            main: SwitchState::from(self.main_switch_on),
            error: SwitchState::from(self.error_flag),
            reboot_requested: self.reboot_requested,
        }
    }
}
