// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Home-automation view of configured outputs.
//!
//! An [`Accessory`] exposes one output as a light bulb with an on/off and a
//! brightness characteristic, the way bridges such as Homebridge present
//! it.

use std::fmt;
use std::str::FromStr;

use crate::client::Client;
use crate::command::DimmerOptions;
use crate::config::{DeviceConfig, DeviceType};
use crate::error::{Result, ValueError};
use crate::event::StatusEvent;
use crate::types::{Level, OutputId};

/// Manufacturer reported for every accessory.
pub const MANUFACTURER: &str = "LUTRON";

/// Model reported for every accessory.
pub const MODEL: &str = "RadioRA";

/// Characteristic an accessory can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadKind {
    /// `1` when the output is on, `0` when off.
    Power,
    /// Level rounded to a whole percent.
    Brightness,
}

impl ReadKind {
    /// Returns the characteristic name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Power => "power",
            Self::Brightness => "brightness",
        }
    }

    /// Converts an output level into this characteristic's value.
    #[must_use]
    pub fn value_of(self, level: Level) -> u8 {
        match self {
            Self::Power => u8::from(level.is_on()),
            Self::Brightness => level.rounded(),
        }
    }
}

impl fmt::Display for ReadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReadKind {
    type Err = ValueError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "power" => Ok(Self::Power),
            "brightness" => Ok(Self::Brightness),
            _ => Err(ValueError::UnsupportedReadKind(s.to_string())),
        }
    }
}

/// Static accessory description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessoryInformation {
    /// Always [`MANUFACTURER`].
    pub manufacturer: &'static str,
    /// Always [`MODEL`].
    pub model: &'static str,
    /// Serial number from the device configuration.
    pub serial: String,
}

/// One configured output bound to a client.
#[derive(Debug, Clone)]
pub struct Accessory {
    client: Client,
    device: DeviceConfig,
}

impl Accessory {
    pub(crate) fn new(client: Client, device: DeviceConfig) -> Self {
        Self { client, device }
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.device.name
    }

    /// Integration id of the output.
    #[must_use]
    pub fn id(&self) -> OutputId {
        self.device.id
    }

    /// Load kind.
    #[must_use]
    pub fn device_type(&self) -> DeviceType {
        self.device.device_type
    }

    /// Manufacturer, model and serial number.
    #[must_use]
    pub fn information(&self) -> AccessoryInformation {
        AccessoryInformation {
            manufacturer: MANUFACTURER,
            model: MODEL,
            serial: self.device.serial.clone(),
        }
    }

    /// Reads the characteristic named `kind` (`"power"` or `"brightness"`).
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::UnsupportedReadKind`] for any other name,
    /// before anything is sent, and a timeout error if the controller does
    /// not report the output.
    pub async fn get(&self, kind: &str) -> Result<u8> {
        let kind = kind.parse::<ReadKind>()?;
        self.read(kind).await
    }

    /// Reads a characteristic.
    ///
    /// # Errors
    ///
    /// Returns a timeout error if the controller does not report the output.
    pub async fn read(&self, kind: ReadKind) -> Result<u8> {
        let level = self.client.get_dimmer(self.device.id).await?;
        Ok(kind.value_of(level))
    }

    /// Switches the output fully on or off.
    ///
    /// # Errors
    ///
    /// Returns a timeout error if the controller does not confirm.
    pub async fn set_power(&self, on: bool) -> Result<StatusEvent> {
        let level = if on { Level::FULL } else { Level::OFF };
        tracing::debug!(output = %self.device.id, name = %self.device.name, on, "Setting power");
        self.client
            .set_dimmer(self.device.id, level, DimmerOptions::default())
            .await
    }

    /// Sets the output level.
    ///
    /// # Errors
    ///
    /// Returns a timeout error if the controller does not confirm.
    pub async fn set_brightness(&self, level: Level) -> Result<StatusEvent> {
        tracing::debug!(output = %self.device.id, name = %self.device.name, %level, "Setting brightness");
        self.client
            .set_dimmer(self.device.id, level, DimmerOptions::default())
            .await
    }
}
