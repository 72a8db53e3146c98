// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Status reports parsed from controller output.

use std::str::FromStr;

use crate::error::ParseError;
use crate::types::{Level, OutputId};

/// Kind of controller report, used as half of a correlation key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// `~OUTPUT,<id>,1,<level>` zone level report.
    Status,
}

/// A parsed output level report.
///
/// # Examples
///
/// ```
/// use radiora_lib::event::{MessageKind, StatusEvent};
/// use radiora_lib::types::OutputId;
///
/// let event: StatusEvent = "~OUTPUT,5,1,42.00".parse().unwrap();
/// assert_eq!(event.kind, MessageKind::Status);
/// assert_eq!(event.id, OutputId::new(5));
/// assert_eq!(event.level.to_string(), "42");
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusEvent {
    /// Report kind.
    pub kind: MessageKind,
    /// Reporting output.
    pub id: OutputId,
    /// Reported level.
    pub level: Level,
}

impl StatusEvent {
    /// Creates a status event.
    #[must_use]
    pub fn status(id: OutputId, level: Level) -> Self {
        Self {
            kind: MessageKind::Status,
            id,
            level,
        }
    }

    /// Parses a line that may or may not be an output report.
    ///
    /// Returns `Ok(None)` for lines that are not `~OUTPUT` zone level reports
    /// (other actions, other commands, echoes).
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the line is an `~OUTPUT,<id>,1,` report whose
    /// id or level does not parse.
    pub fn parse_line(line: &str) -> Result<Option<Self>, ParseError> {
        let Some(body) = line.trim().strip_prefix("~OUTPUT,") else {
            return Ok(None);
        };

        let mut fields = body.split(',');
        let (Some(id), Some(action), Some(level)) = (fields.next(), fields.next(), fields.next())
        else {
            return Ok(None);
        };
        if action != "1" {
            return Ok(None);
        }

        let id = id
            .parse::<OutputId>()
            .map_err(|e| invalid_value("output id", &e))?;
        let level = level
            .parse::<Level>()
            .map_err(|e| invalid_value("level", &e))?;

        Ok(Some(Self::status(id, level)))
    }
}

impl FromStr for StatusEvent {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_line(s)?.ok_or_else(|| ParseError::UnexpectedFormat(s.to_string()))
    }
}

fn invalid_value(field: &str, err: &impl std::fmt::Display) -> ParseError {
    ParseError::InvalidValue {
        field: field.to_string(),
        message: err.to_string(),
    }
}
