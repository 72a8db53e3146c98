// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Request/report correlation.
//!
//! The controller never tags a report with the request that caused it: a
//! `?OUTPUT,5` is answered by the same `~OUTPUT,5,1,<level>` line that a
//! keypad press would produce. Requests therefore wait on a key (output id
//! and report kind) and take the next report published under that key.
//!
//! - [`Continuation`] - Something waiting for a report
//! - [`Correlator`] - Registry of waiting continuations

mod correlator;

pub use correlator::{Continuation, CorrelationKey, Correlator, FnContinuation};
