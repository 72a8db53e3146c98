// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration identifier for controller outputs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Integration id of a controller output (dimmer or switch).
///
/// Integration ids are assigned in the RadioRA 2 programming software and are
/// what the `#OUTPUT` / `?OUTPUT` commands address.
///
/// # Examples
///
/// ```
/// use radiora_lib::types::OutputId;
///
/// let id = OutputId::new(5);
/// assert_eq!(id.value(), 5);
/// assert_eq!(id.to_string(), "5");
/// assert_eq!("12".parse::<OutputId>().unwrap(), OutputId::new(12));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputId(u32);

impl OutputId {
    /// Creates an output id.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw integration id.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OutputId {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse()
            .map(Self)
            .map_err(|_| ValueError::InvalidOutputId(s.to_string()))
    }
}

impl From<u32> for OutputId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_id_parse() {
        assert_eq!("5".parse::<OutputId>().unwrap().value(), 5);
        assert!("-5".parse::<OutputId>().is_err());
        assert!("x".parse::<OutputId>().is_err());
    }

    #[test]
    fn output_id_deserializes_from_number() {
        let id: OutputId = serde_json::from_str("27").unwrap();
        assert_eq!(id, OutputId::new(27));
    }
}
