// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Client configuration.
//!
//! - [`ClientConfig`] - Controller address, credentials, deadlines
//! - [`DeviceConfig`] - One output exposed as an accessory
//! - [`ReconnectionPolicy`] - Backoff after an unexpected disconnect

mod client_config;
mod device_config;
mod reconnection;

pub use client_config::{
    ClientConfig, DEFAULT_CONNECT_TIMEOUT, DEFAULT_PASSWORD, DEFAULT_PORT,
    DEFAULT_RESPONSE_TIMEOUT, DEFAULT_USERNAME,
};
pub use device_config::{DeviceConfig, DeviceType};
pub use reconnection::ReconnectionPolicy;
