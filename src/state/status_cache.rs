// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Last-known output levels.

use std::collections::HashMap;

use crate::types::{Level, OutputId};

/// Cached state of a single output.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DeviceStatus {
    /// Last level reported by the controller, if any.
    pub level: Option<Level>,
    /// A `?OUTPUT` query has been sent and not yet answered.
    pub in_flight: bool,
}

/// Result of looking up an output before querying it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CacheLookup {
    /// A level is known and no query is outstanding.
    Cached(Level),
    /// A query is outstanding; wait for its report.
    InFlight,
    /// Nothing known; a query must be sent.
    Miss,
}

/// Per-output level cache with an in-flight marker.
///
/// Guarantees at most one outstanding query per output: the first getter
/// calls [`begin_query`](Self::begin_query) and sends, later getters see
/// [`CacheLookup::InFlight`] and wait for the same report.
///
/// # Examples
///
/// ```
/// use radiora_lib::state::{CacheLookup, StatusCache};
/// use radiora_lib::types::{Level, OutputId};
///
/// let mut cache = StatusCache::new();
/// let id = OutputId::new(5);
///
/// assert_eq!(cache.lookup(id), CacheLookup::Miss);
/// assert!(cache.begin_query(id));
/// assert!(!cache.begin_query(id));
/// assert_eq!(cache.lookup(id), CacheLookup::InFlight);
///
/// cache.update(id, Level::new(42.0).unwrap());
/// assert_eq!(cache.lookup(id), CacheLookup::Cached(Level::new(42.0).unwrap()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StatusCache {
    entries: HashMap<OutputId, DeviceStatus>,
}

impl StatusCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifies an output for a read.
    #[must_use]
    pub fn lookup(&self, id: OutputId) -> CacheLookup {
        match self.entries.get(&id) {
            Some(DeviceStatus { in_flight: true, .. }) => CacheLookup::InFlight,
            Some(DeviceStatus {
                level: Some(level), ..
            }) => CacheLookup::Cached(*level),
            _ => CacheLookup::Miss,
        }
    }

    /// Marks a query as outstanding.
    ///
    /// Returns `true` if the caller should send the query, `false` if one is
    /// already in flight.
    pub fn begin_query(&mut self, id: OutputId) -> bool {
        let entry = self.entries.entry(id).or_default();
        if entry.in_flight {
            return false;
        }
        entry.in_flight = true;
        true
    }

    /// Records a reported level and clears the in-flight marker.
    ///
    /// Applies to unsolicited reports too.
    pub fn update(&mut self, id: OutputId, level: Level) {
        let entry = self.entries.entry(id).or_default();
        entry.level = Some(level);
        entry.in_flight = false;
    }

    /// Clears every in-flight marker, keeping known levels.
    ///
    /// Queries sent on a link that has since closed will never be answered.
    pub fn clear_in_flight(&mut self) {
        for entry in self.entries.values_mut() {
            entry.in_flight = false;
        }
    }

    /// Returns the cached state of an output.
    #[must_use]
    pub fn get(&self, id: OutputId) -> Option<&DeviceStatus> {
        self.entries.get(&id)
    }

    /// Returns the number of tracked outputs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no output is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
