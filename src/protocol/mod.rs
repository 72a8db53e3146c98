// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lutron integration protocol over Telnet.
//!
//! The controller speaks CRLF-terminated ASCII on TCP port 23. After a
//! `login: ` / `password: ` handshake it prints a `GNET> ` prompt whenever it
//! is ready for a command, and reports every output change as
//! `~OUTPUT,<id>,1,<level>`.
//!
//! - [`LineDecoder`] - Splits the byte stream into lines and prompts
//! - [`LoginState`] - Handshake state machine
//! - [`CommandQueue`] - Commands held back until the ready prompt
//! - [`Session`] - All of the above plus the cache and pending requests,
//!   without I/O
//!
//! The socket itself is owned by a single task spawned by
//! [`Client`](crate::Client).

mod codec;
pub(crate) mod connection;
mod login;
mod queue;
mod session;

pub use codec::LineDecoder;
pub use login::{LoginState, LoginStep, Prompts};
pub use queue::CommandQueue;
pub use session::Session;
