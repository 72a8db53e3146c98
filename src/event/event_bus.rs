// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Broadcast of client events.

use tokio::sync::broadcast;

use super::ClientEvent;

const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Fan-out of [`ClientEvent`]s to any number of receivers.
///
/// A receiver that falls more than the channel capacity behind loses the
/// oldest events and gets `RecvError::Lagged` on its next receive. Clones
/// share the channel.
///
/// # Examples
///
/// ```
/// use radiora_lib::event::{ClientEvent, EventBus};
///
/// let bus = EventBus::new();
/// let mut rx = bus.subscribe();
///
/// bus.publish(ClientEvent::LoggedIn);
/// assert_eq!(rx.try_recv().unwrap(), ClientEvent::LoggedIn);
/// ```
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ClientEvent>,
}

impl EventBus {
    /// Creates a bus buffering up to 256 events per receiver.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a bus buffering up to `capacity` events per receiver.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Returns a receiver for every event published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of live receivers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Sends `event` to every receiver.
    ///
    /// Returns the number of receivers reached; with none the event is
    /// dropped.
    pub fn publish(&self, event: ClientEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
