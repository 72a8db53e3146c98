// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Outbound command buffer.

use std::collections::VecDeque;

/// FIFO of terminated command lines waiting for the ready prompt.
///
/// Unbounded: commands are small and the queue only grows while the link is
/// down or the login has not completed.
#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    commands: VecDeque<String>,
}

impl CommandQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a command at the tail.
    pub fn push(&mut self, command: String) {
        self.commands.push_back(command);
    }

    /// Removes and returns every queued command, oldest first.
    pub fn drain(&mut self) -> impl Iterator<Item = String> + '_ {
        self.commands.drain(..)
    }

    /// Returns the number of queued commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns true if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
