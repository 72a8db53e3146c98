// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configured outputs.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ValueError;
use crate::types::OutputId;

/// Kind of load wired to an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    /// Dimmable load.
    #[default]
    Dimmer,
    /// On/off load.
    Switch,
}

impl DeviceType {
    /// Returns the configuration name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dimmer => "dimmer",
            Self::Switch => "switch",
        }
    }

    /// Returns true if the load accepts intermediate levels.
    #[must_use]
    pub const fn is_dimmable(self) -> bool {
        matches!(self, Self::Dimmer)
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceType {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dimmer" => Ok(Self::Dimmer),
            "switch" => Ok(Self::Switch),
            _ => Err(ValueError::InvalidDeviceType(s.to_string())),
        }
    }
}

/// One output exposed as an accessory.
///
/// # Examples
///
/// ```
/// use radiora_lib::config::{DeviceConfig, DeviceType};
///
/// let lamp = DeviceConfig::new(12, "Hall")
///     .with_serial("RA-0012")
///     .with_type(DeviceType::Switch);
///
/// assert_eq!(lamp.id.value(), 12);
/// assert_eq!(lamp.serial, "RA-0012");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeviceConfig {
    /// Integration id of the output.
    pub id: OutputId,
    /// Display name.
    pub name: String,
    /// Serial number shown in accessory information.
    #[serde(default)]
    pub serial: String,
    /// Load kind.
    #[serde(default, rename = "type")]
    pub device_type: DeviceType,
}

impl DeviceConfig {
    /// Creates a dimmer entry with no serial number.
    #[must_use]
    pub fn new(id: impl Into<OutputId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            serial: String::new(),
            device_type: DeviceType::Dimmer,
        }
    }

    /// Sets the serial number.
    #[must_use]
    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial = serial.into();
        self
    }

    /// Sets the load kind.
    #[must_use]
    pub fn with_type(mut self, device_type: DeviceType) -> Self {
        self.device_type = device_type;
        self
    }
}
