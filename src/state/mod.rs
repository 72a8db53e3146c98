// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Output state tracking.
//!
//! The [`StatusCache`] remembers the last level each output reported, so a
//! read of a known output completes without a round trip to the controller.
//! It lives inside the connection task and is only touched from there.

mod status_cache;

pub use status_cache::{CacheLookup, DeviceStatus, StatusCache};
