// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Client event types.

use super::StatusEvent;

/// Events emitted by a [`Client`](crate::Client).
///
/// # Examples
///
/// ```
/// use radiora_lib::event::{ClientEvent, StatusEvent};
/// use radiora_lib::types::{Level, OutputId};
///
/// let event = ClientEvent::Status(StatusEvent::status(OutputId::new(3), Level::FULL));
/// assert!(event.is_status());
/// assert!(!ClientEvent::LoggedIn.is_status());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// The controller accepted the credentials and printed its first prompt.
    ///
    /// Emitted once per successful connection.
    LoggedIn,

    /// An output reported its level.
    Status(StatusEvent),

    /// The link to the controller was closed.
    Disconnected {
        /// True if the close was requested through `disconnect()`.
        intentional: bool,
    },

    /// A reconnection attempt is about to start.
    Reconnecting {
        /// Zero-based attempt number.
        attempt: u32,
    },

    /// The reconnection policy gave up.
    ReconnectFailed {
        /// Number of attempts made.
        attempts: u32,
    },
}

impl ClientEvent {
    /// Returns `true` if this is a status report.
    #[must_use]
    pub fn is_status(&self) -> bool {
        matches!(self, Self::Status(_))
    }

    /// Returns `true` if this is a connection lifecycle event.
    #[must_use]
    pub fn is_connection(&self) -> bool {
        !self.is_status()
    }
}
