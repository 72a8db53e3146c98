// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Deadline-guarded completions.
//!
//! A controller may never answer a query: the output id might not exist, the
//! link might drop mid-request, or the report might be lost. [`watchdog`]
//! wraps a completion so that it runs exactly once, either with the real
//! result or with `None` when the deadline passes first.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use radiora_lib::watchdog::watchdog;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let (tx, rx) = tokio::sync::oneshot::channel();
//! let handle = watchdog(Duration::from_secs(4), "get output 5", move |level: Option<f64>| {
//!     let _ = tx.send(level);
//! });
//!
//! assert!(handle.resolve(42.0));
//! assert_eq!(rx.await.unwrap(), Some(42.0));
//! # }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::time::Instant;

/// Number of watchdogs created and not yet resolved, process-wide.
static LIVE_WATCHDOGS: AtomicUsize = AtomicUsize::new(0);

/// Returns the number of watchdogs that are still waiting.
///
/// Diagnostics only; nothing in the library depends on the value.
#[must_use]
pub fn live_watchdogs() -> usize {
    LIVE_WATCHDOGS.load(Ordering::Relaxed)
}

type Completion<T> = Box<dyn FnOnce(Option<T>) + Send>;

/// State shared between a handle and its deadline task.
struct Slot<T> {
    completion: Mutex<Option<Completion<T>>>,
    context: String,
    started: Instant,
}

impl<T> Slot<T> {
    /// Takes the completion. Only the first caller gets it.
    fn take(&self) -> Option<Completion<T>> {
        let completion = self.completion.lock().take();
        if completion.is_some() {
            LIVE_WATCHDOGS.fetch_sub(1, Ordering::Relaxed);
        }
        completion
    }

    fn is_settled(&self) -> bool {
        self.completion.lock().is_none()
    }
}

/// The success path of a watchdog.
///
/// Consumed by [`resolve`](Self::resolve). Dropping an unresolved handle does
/// not cancel the deadline, so the completion still runs with `None`.
pub struct WatchdogHandle<T> {
    slot: Arc<Slot<T>>,
    cancel: Option<oneshot::Sender<()>>,
}

impl<T> std::fmt::Debug for WatchdogHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchdogHandle")
            .field("context", &self.slot.context)
            .field("settled", &self.slot.is_settled())
            .finish_non_exhaustive()
    }
}

impl<T> WatchdogHandle<T> {
    /// Completes with the real result.
    ///
    /// Returns `false` if the deadline already fired; the value is then
    /// discarded.
    pub fn resolve(mut self, value: T) -> bool {
        let elapsed = self.slot.started.elapsed();
        let Some(completion) = self.slot.take() else {
            tracing::debug!(
                context = %self.slot.context,
                elapsed = ?elapsed,
                "Watchdog resolved too late, result discarded"
            );
            return false;
        };

        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
        tracing::debug!(
            context = %self.slot.context,
            elapsed = ?elapsed,
            "Watchdog resolved"
        );
        completion(Some(value));
        true
    }

    /// Returns true once the completion has run, by either path.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.slot.is_settled()
    }
}

/// Wraps `completion` with a deadline of `max_time`.
///
/// `completion` runs exactly once: with `Some(value)` when the returned
/// handle is resolved first, or with `None` when the deadline fires first.
/// Must be called from within a Tokio runtime.
pub fn watchdog<T, F>(
    max_time: Duration,
    context: impl Into<String>,
    completion: F,
) -> WatchdogHandle<T>
where
    T: Send + 'static,
    F: FnOnce(Option<T>) + Send + 'static,
{
    let slot = Arc::new(Slot {
        completion: Mutex::new(Some(Box::new(completion) as Completion<T>)),
        context: context.into(),
        started: Instant::now(),
    });
    LIVE_WATCHDOGS.fetch_add(1, Ordering::Relaxed);

    let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
    let timer_slot = Arc::clone(&slot);
    tokio::spawn(async move {
        tokio::select! {
            () = tokio::time::sleep(max_time) => {}
            // Resolved, or the handle was dropped unresolved
            result = cancel_rx => {
                if result.is_ok() {
                    return;
                }
                tokio::time::sleep_until(timer_slot.started + max_time).await;
            }
        }

        if let Some(completion) = timer_slot.take() {
            tracing::warn!(
                context = %timer_slot.context,
                timeout = ?max_time,
                "Watchdog deadline reached, completing without a result"
            );
            completion(None);
        }
    });

    WatchdogHandle {
        slot,
        cancel: Some(cancel_tx),
    }
}
