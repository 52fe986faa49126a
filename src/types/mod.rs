// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types shared by the state, command and discovery modules.

mod switch;

pub use switch::{PAYLOAD_OFF, PAYLOAD_ON, PAYLOAD_PRESS, SwitchState};
