// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Events produced by the controller connection.
//!
//! Two layers consume controller reports:
//!
//! - [`StatusEvent`] values are matched against pending requests by the
//!   [`Correlator`](crate::subscription::Correlator).
//! - Every report and lifecycle change is also broadcast as a
//!   [`ClientEvent`] on the [`EventBus`], for consumers that want to observe
//!   levels changed from keypads or other integrations.
//!
//! # Examples
//!
//! ```
//! use radiora_lib::event::{ClientEvent, EventBus};
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.publish(ClientEvent::Reconnecting { attempt: 0 });
//! assert!(rx.try_recv().unwrap().is_connection());
//! ```

mod client_event;
mod event_bus;
mod status_event;

pub use client_event::ClientEvent;
pub use event_bus::EventBus;
pub use status_event::{MessageKind, StatusEvent};
