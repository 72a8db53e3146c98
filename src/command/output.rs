// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Output level commands.

use std::time::Duration;

use crate::command::{Command, Operation};
use crate::types::{Level, OutputId};

/// Action number for "set or get zone level".
///
/// Field 2 of every `OUTPUT` line. Only this action is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputAction {
    /// Action 1: zone level.
    ZoneLevel,
}

impl OutputAction {
    /// Returns the numeric action code.
    #[must_use]
    pub const fn code(&self) -> u8 {
        match self {
            Self::ZoneLevel => 1,
        }
    }
}

/// Optional timing for a level change.
///
/// The controller only accepts a delay when a fade is also given, so
/// [`OutputCommand::fields`] drops a delay without a fade.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use radiora_lib::command::DimmerOptions;
///
/// let options = DimmerOptions::new().with_fade(Duration::from_millis(1500));
/// assert_eq!(options.fade, Some(Duration::from_millis(1500)));
/// assert_eq!(options.delay, None);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DimmerOptions {
    /// Fade time to reach the new level.
    pub fade: Option<Duration>,
    /// Delay before the fade starts.
    pub delay: Option<Duration>,
}

impl DimmerOptions {
    /// Creates options with neither fade nor delay.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the fade time.
    #[must_use]
    pub fn with_fade(mut self, fade: Duration) -> Self {
        self.fade = Some(fade);
        self
    }

    /// Sets the delay.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// Command to set or query an output level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputCommand {
    /// `?OUTPUT,<id>`
    Get(OutputId),
    /// `#OUTPUT,<id>,1,<level>[,<fade>[,<delay>]]`
    Set {
        /// Target output.
        id: OutputId,
        /// Requested level.
        level: Level,
        /// Fade and delay.
        options: DimmerOptions,
    },
}

impl OutputCommand {
    /// Creates a set command without fade or delay.
    #[must_use]
    pub fn set(id: OutputId, level: Level) -> Self {
        Self::set_with(id, level, DimmerOptions::default())
    }

    /// Creates a set command with fade and delay options.
    #[must_use]
    pub fn set_with(id: OutputId, level: Level, options: DimmerOptions) -> Self {
        Self::Set { id, level, options }
    }

    /// Returns the addressed output.
    #[must_use]
    pub fn id(&self) -> OutputId {
        match self {
            Self::Get(id) | Self::Set { id, .. } => *id,
        }
    }
}

impl Command for OutputCommand {
    fn operation(&self) -> Operation {
        match self {
            Self::Get(_) => Operation::Query,
            Self::Set { .. } => Operation::Execute,
        }
    }

    fn name(&self) -> &'static str {
        "OUTPUT"
    }

    fn fields(&self) -> Vec<String> {
        match self {
            Self::Get(id) => vec![id.to_string()],
            Self::Set { id, level, options } => {
                let mut fields = vec![
                    id.to_string(),
                    OutputAction::ZoneLevel.code().to_string(),
                    level.to_string(),
                ];
                if let Some(fade) = options.fade {
                    fields.push(format_seconds(fade));
                    if let Some(delay) = options.delay {
                        fields.push(format_seconds(delay));
                    }
                }
                fields
            }
        }
    }
}

/// Formats a duration in the controller's `SS.ss` seconds notation.
///
/// Resolution is a hundredth of a second; trailing zeros are dropped.
///
/// ```
/// use std::time::Duration;
/// use radiora_lib::command::format_seconds;
///
/// assert_eq!(format_seconds(Duration::from_secs(2)), "2");
/// assert_eq!(format_seconds(Duration::from_millis(1500)), "1.5");
/// assert_eq!(format_seconds(Duration::from_millis(250)), "0.25");
/// ```
#[must_use]
pub fn format_seconds(duration: Duration) -> String {
    let secs = duration.as_secs();
    let hundredths = duration.subsec_millis() / 10;
    if hundredths == 0 {
        return secs.to_string();
    }
    let fraction = format!("{hundredths:02}");
    format!("{secs}.{}", fraction.trim_end_matches('0'))
}
