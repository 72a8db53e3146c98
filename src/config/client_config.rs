// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Client configuration.

use std::time::Duration;

use serde::{Deserialize, Deserializer};

use super::{DeviceConfig, ReconnectionPolicy};
use crate::error::{DeviceError, Result};
use crate::protocol::Prompts;

/// Default Telnet port of the integration interface.
pub const DEFAULT_PORT: u16 = 23;

/// Default integration user of RadioRA 2 Main Repeaters.
pub const DEFAULT_USERNAME: &str = "lutron";

/// Default integration password of RadioRA 2 Main Repeaters.
pub const DEFAULT_PASSWORD: &str = "integration";

/// Default deadline for `set_dimmer` / `get_dimmer`.
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_millis(4000);

/// Default deadline for opening the TCP connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings and exposed outputs.
///
/// Deserializes from the platform block of a Homebridge `config.json`;
/// the `lights` array becomes [`devices`](Self::devices) and `timeout` is in
/// milliseconds.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use radiora_lib::config::ClientConfig;
///
/// let config = ClientConfig::from_json(r#"{
///     "platform": "RadioRA",
///     "host": "192.168.1.20",
///     "timeout": 2500,
///     "lights": [{ "id": 12, "name": "Hall", "serial": "RA-0012" }]
/// }"#)?;
///
/// assert_eq!(config.port, 23);
/// assert_eq!(config.username, "lutron");
/// assert_eq!(config.response_timeout, Duration::from_millis(2500));
/// assert_eq!(config.devices.len(), 1);
/// # Ok::<(), radiora_lib::Error>(())
/// ```
#[derive(Clone, Deserialize)]
pub struct ClientConfig {
    /// Controller host name or IP address.
    pub host: String,
    /// Controller Telnet port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Integration user name.
    #[serde(default = "default_username")]
    pub username: String,
    /// Integration password.
    #[serde(default = "default_password")]
    pub password: String,
    /// Deadline for a dimmer request to see its report.
    #[serde(
        rename = "timeout",
        default = "default_response_timeout",
        deserialize_with = "deserialize_millis"
    )]
    pub response_timeout: Duration,
    /// Deadline for opening the TCP connection.
    #[serde(skip, default = "default_connect_timeout")]
    pub connect_timeout: Duration,
    /// Outputs exposed as accessories.
    #[serde(default, alias = "lights")]
    pub devices: Vec<DeviceConfig>,
    /// Prompt tokens printed by the controller.
    #[serde(default)]
    pub prompts: Prompts,
    /// What to do when a logged-in link drops.
    #[serde(skip)]
    pub reconnection: ReconnectionPolicy,
}

impl ClientConfig {
    /// Creates a configuration with default credentials and no devices.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            username: DEFAULT_USERNAME.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            devices: Vec::new(),
            prompts: Prompts::default(),
            reconnection: ReconnectionPolicy::default(),
        }
    }

    /// Parses and validates a JSON configuration block.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Json`](crate::error::ParseError::Json) for
    /// malformed input and a [`DeviceError`] if validation fails.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(crate::error::ParseError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the Telnet port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the integration credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Sets the dimmer request deadline.
    #[must_use]
    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Sets the TCP connect deadline.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Adds an exposed output.
    #[must_use]
    pub fn with_device(mut self, device: DeviceConfig) -> Self {
        self.devices.push(device);
        self
    }

    /// Sets the prompt tokens.
    #[must_use]
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Sets the reconnection policy.
    #[must_use]
    pub fn with_reconnection(mut self, policy: ReconnectionPolicy) -> Self {
        self.reconnection = policy;
        self
    }

    /// Checks the configuration for values the client cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::InvalidConfiguration`] for an empty host or
    /// prompt token, or an output configured twice.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(DeviceError::InvalidConfiguration("host is empty".to_string()).into());
        }
        if self.prompts.login.is_empty()
            || self.prompts.password.is_empty()
            || self.prompts.ready.is_empty()
        {
            return Err(
                DeviceError::InvalidConfiguration("prompt tokens must not be empty".to_string())
                    .into(),
            );
        }
        for (index, device) in self.devices.iter().enumerate() {
            if self.devices[..index].iter().any(|other| other.id == device.id) {
                return Err(DeviceError::InvalidConfiguration(format!(
                    "output {} is configured twice",
                    device.id
                ))
                .into());
            }
        }
        Ok(())
    }

    /// Returns `host:port`.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("response_timeout", &self.response_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("devices", &self.devices)
            .field("prompts", &self.prompts)
            .field("reconnection", &self.reconnection)
            .finish()
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_username() -> String {
    DEFAULT_USERNAME.to_string()
}

fn default_password() -> String {
    DEFAULT_PASSWORD.to_string()
}

fn default_response_timeout() -> Duration {
    DEFAULT_RESPONSE_TIMEOUT
}

fn default_connect_timeout() -> Duration {
    DEFAULT_CONNECT_TIMEOUT
}

fn deserialize_millis<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_millis)
}
