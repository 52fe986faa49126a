// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Controller state and its published form.
//!
//! [`ProcessState`] is the mutable record shared by sensor logic and the
//! bridge. [`StateSnapshot`] is the value serialized onto the state topic.
//!
//! # Examples
//!
//! ```
//! use pumpbridge::state::ProcessState;
//!
//! let mut state = ProcessState::new();
//! state.set_flow(3.0);
//! state.set_motor_on(true);
//!
//! let json = state.snapshot().to_json().unwrap();
//! assert!(json.contains(r#""motor":"ON""#));
//! ```

mod process_state;
mod snapshot;

pub use process_state::ProcessState;
pub use snapshot::StateSnapshot;
