// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for RadioRA output control.
//!
//! # Types
//!
//! - [`OutputId`] - Integration id of a controller output
//! - [`Level`] - Output level (0-100%, fractional allowed)

mod level;
mod output_id;

pub use level::Level;
pub use output_id::OutputId;
