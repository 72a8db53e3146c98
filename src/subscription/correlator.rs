// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! One-shot matching of controller reports to waiting requests.

use std::collections::HashMap;

use crate::event::{MessageKind, StatusEvent};
use crate::types::{Level, OutputId};
use crate::watchdog::WatchdogHandle;

/// Something waiting for the next report of one output.
pub trait Continuation: Send {
    /// Consumes the continuation with the matching report.
    fn deliver(self: Box<Self>, event: StatusEvent);

    /// Returns true if nobody is waiting any more (e.g. a deadline fired).
    ///
    /// Settled continuations are dropped without delivery.
    fn is_settled(&self) -> bool {
        false
    }
}

/// Adapts a closure into a [`Continuation`].
pub struct FnContinuation<F>(pub F);

impl<F> Continuation for FnContinuation<F>
where
    F: FnOnce(StatusEvent) + Send,
{
    fn deliver(self: Box<Self>, event: StatusEvent) {
        (self.0)(event);
    }
}

impl Continuation for WatchdogHandle<StatusEvent> {
    fn deliver(self: Box<Self>, event: StatusEvent) {
        self.resolve(event);
    }

    fn is_settled(&self) -> bool {
        WatchdogHandle::is_settled(self)
    }
}

impl Continuation for WatchdogHandle<Level> {
    fn deliver(self: Box<Self>, event: StatusEvent) {
        self.resolve(event.level);
    }

    fn is_settled(&self) -> bool {
        WatchdogHandle::is_settled(self)
    }
}

/// Correlation key: which output, which kind of report.
pub type CorrelationKey = (OutputId, MessageKind);

/// Pending requests keyed by output and report kind.
///
/// Each registered continuation receives at most one event, the first one
/// published for its key, and is removed on delivery.
///
/// # Examples
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use radiora_lib::event::{MessageKind, StatusEvent};
/// use radiora_lib::subscription::{Correlator, FnContinuation};
/// use radiora_lib::types::{Level, OutputId};
///
/// let mut correlator = Correlator::new();
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&seen);
///
/// correlator.subscribe(
///     OutputId::new(5),
///     MessageKind::Status,
///     Box::new(FnContinuation(move |event: StatusEvent| sink.lock().unwrap().push(event.level))),
/// );
///
/// let event = StatusEvent::status(OutputId::new(5), Level::FULL);
/// assert_eq!(correlator.publish(&event), 1);
/// assert_eq!(correlator.publish(&event), 0);
/// assert_eq!(*seen.lock().unwrap(), vec![Level::FULL]);
/// ```
#[derive(Default)]
pub struct Correlator {
    pending: HashMap<CorrelationKey, Vec<Box<dyn Continuation>>>,
}

impl std::fmt::Debug for Correlator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Correlator")
            .field("pending", &self.pending_count())
            .finish()
    }
}

impl Correlator {
    /// Creates an empty correlator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a continuation for the next `kind` report of output `id`.
    ///
    /// Settled continuations under the same key are pruned first.
    pub fn subscribe(
        &mut self,
        id: OutputId,
        kind: MessageKind,
        continuation: Box<dyn Continuation>,
    ) {
        let waiters = self.pending.entry((id, kind)).or_default();
        waiters.retain(|waiter| !waiter.is_settled());
        waiters.push(continuation);
    }

    /// Delivers `event` to every continuation waiting on its key.
    ///
    /// Returns the number of continuations that received it.
    pub fn publish(&mut self, event: &StatusEvent) -> usize {
        let Some(waiters) = self.pending.remove(&(event.id, event.kind)) else {
            return 0;
        };

        let mut delivered = 0;
        for waiter in waiters {
            if waiter.is_settled() {
                continue;
            }
            waiter.deliver(*event);
            delivered += 1;
        }
        delivered
    }

    /// Returns the number of continuations waiting on `id`.
    #[must_use]
    pub fn waiting_on(&self, id: OutputId, kind: MessageKind) -> usize {
        self.pending.get(&(id, kind)).map_or(0, Vec::len)
    }

    /// Returns the total number of registered continuations.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use parking_lot::Mutex;

    use super::*;
    use crate::watchdog::watchdog;

    fn recorder() -> (Arc<Mutex<Vec<StatusEvent>>>, impl Fn() -> Box<dyn Continuation>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let make = move || {
            let sink = Arc::clone(&sink);
            Box::new(FnContinuation(move |event: StatusEvent| sink.lock().push(event)))
                as Box<dyn Continuation>
        };
        (seen, make)
    }

    fn status(id: u32, level: f64) -> StatusEvent {
        StatusEvent::status(OutputId::new(id), Level::new(level).unwrap())
    }

    #[test]
    fn all_waiters_on_a_key_receive_the_event() {
        let (seen, make) = recorder();
        let mut correlator = Correlator::new();
        correlator.subscribe(OutputId::new(5), MessageKind::Status, make());
        correlator.subscribe(OutputId::new(5), MessageKind::Status, make());

        assert_eq!(correlator.publish(&status(5, 42.0)), 2);
        assert_eq!(seen.lock().len(), 2);
        assert_eq!(correlator.pending_count(), 0);
    }

    #[test]
    fn other_outputs_are_not_woken() {
        let (seen, make) = recorder();
        let mut correlator = Correlator::new();
        correlator.subscribe(OutputId::new(5), MessageKind::Status, make());

        assert_eq!(correlator.publish(&status(6, 10.0)), 0);
        assert!(seen.lock().is_empty());
        assert_eq!(correlator.waiting_on(OutputId::new(5), MessageKind::Status), 1);
    }

    #[test]
    fn delivery_is_at_most_once() {
        let (seen, make) = recorder();
        let mut correlator = Correlator::new();
        correlator.subscribe(OutputId::new(1), MessageKind::Status, make());

        correlator.publish(&status(1, 10.0));
        correlator.publish(&status(1, 20.0));

        assert_eq!(*seen.lock(), vec![status(1, 10.0)]);
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_watchdogs_are_skipped_and_pruned() {
        let results = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&results);
        let handle = watchdog(Duration::from_secs(1), "test", move |level: Option<Level>| {
            sink.lock().push(level);
        });

        let mut correlator = Correlator::new();
        correlator.subscribe(OutputId::new(3), MessageKind::Status, Box::new(handle));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(*results.lock(), vec![None]);

        let (_, make) = recorder();
        correlator.subscribe(OutputId::new(3), MessageKind::Status, make());
        assert_eq!(correlator.waiting_on(OutputId::new(3), MessageKind::Status), 1);

        assert_eq!(correlator.publish(&status(3, 50.0)), 1);
        assert_eq!(*results.lock(), vec![None]);
    }
}
