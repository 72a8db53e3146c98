// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration protocol command definitions.
//!
//! Every integration command is a single ASCII line made of an operation
//! character, a command name and comma-separated fields:
//!
//! | Operation | Meaning | Example |
//! |-----------|---------|---------|
//! | `#` | Execute (set) | `#OUTPUT,7,1,80` |
//! | `?` | Query (get) | `?OUTPUT,7` |
//! | `~` | Monitoring (controller to client) | `~OUTPUT,7,1,80.00` |
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use radiora_lib::command::{Command, DimmerOptions, OutputCommand};
//! use radiora_lib::types::{Level, OutputId};
//!
//! let set = OutputCommand::set(OutputId::new(7), Level::new(80.0).unwrap());
//! assert_eq!(set.to_wire(), "#OUTPUT,7,1,80\r\n");
//!
//! let options = DimmerOptions::new()
//!     .with_fade(Duration::from_secs(2))
//!     .with_delay(Duration::from_secs(1));
//! let faded = OutputCommand::set_with(OutputId::new(7), Level::new(80.0).unwrap(), options);
//! assert_eq!(faded.to_wire(), "#OUTPUT,7,1,80,2,1\r\n");
//!
//! let query = OutputCommand::Get(OutputId::new(7));
//! assert_eq!(query.to_wire(), "?OUTPUT,7\r\n");
//! ```

mod output;

pub use output::{DimmerOptions, OutputAction, OutputCommand, format_seconds};

/// Line terminator used in both directions.
pub const LINE_ENDING: &str = "\r\n";

/// Operation prefix of an integration command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `#` - change state.
    Execute,
    /// `?` - request state.
    Query,
    /// `~` - state report from the controller.
    Monitor,
}

impl Operation {
    /// Returns the prefix character.
    #[must_use]
    pub const fn as_char(&self) -> char {
        match self {
            Self::Execute => '#',
            Self::Query => '?',
            Self::Monitor => '~',
        }
    }
}

/// A command that can be sent to the controller.
pub trait Command {
    /// Returns the operation prefix.
    fn operation(&self) -> Operation;

    /// Returns the command name, e.g. `"OUTPUT"`.
    fn name(&self) -> &'static str;

    /// Returns the comma-separated fields that follow the name.
    fn fields(&self) -> Vec<String>;

    /// Returns the complete wire line, including the CRLF terminator.
    fn to_wire(&self) -> String {
        let mut line = String::new();
        line.push(self.operation().as_char());
        line.push_str(self.name());
        for field in self.fields() {
            line.push(',');
            line.push_str(&field);
        }
        line.push_str(LINE_ENDING);
        line
    }
}

/// Appends the line terminator unless the command already ends with one.
#[must_use]
pub fn terminate(command: &str) -> String {
    if command.ends_with(LINE_ENDING) {
        command.to_string()
    } else {
        format!("{command}{LINE_ENDING}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminate_appends_crlf_once() {
        assert_eq!(terminate("?OUTPUT,1"), "?OUTPUT,1\r\n");
        assert_eq!(terminate("?OUTPUT,1\r\n"), "?OUTPUT,1\r\n");
    }

    #[test]
    fn terminate_bare_lf_still_gets_crlf() {
        assert_eq!(terminate("?OUTPUT,1\n"), "?OUTPUT,1\n\r\n");
    }

    #[test]
    fn operation_prefixes() {
        assert_eq!(Operation::Execute.as_char(), '#');
        assert_eq!(Operation::Query.as_char(), '?');
        assert_eq!(Operation::Monitor.as_char(), '~');
    }
}
