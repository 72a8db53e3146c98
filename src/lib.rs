// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `RadioRA` Lib - A Rust library to control Lutron RadioRA 2 lighting.
//!
//! This library talks to a RadioRA 2 Main Repeater through its integration
//! interface, a line-oriented Telnet protocol on TCP port 23.
//!
//! # Supported Features
//!
//! - **Login handshake**: user name and password prompts, configurable prompt tokens
//! - **Output control**: set levels with optional fade and delay
//! - **Status queries**: cached levels, one wire query shared by concurrent readers
//! - **Resilience**: commands queued until the controller is ready, reconnection
//!   with capped exponential backoff
//! - **Deadlines**: every request completes exactly once, with a result or a timeout
//!
//! # Quick Start
//!
//! ```no_run
//! use radiora_lib::{Client, ClientConfig, DimmerOptions, Level, OutputId};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> radiora_lib::Result<()> {
//!     let config = ClientConfig::new("192.168.1.20").with_credentials("lutron", "integration");
//!     let client = Client::new(config)?;
//!     client.connect().await?;
//!
//!     // Fade output 7 to 80% over two seconds
//!     let options = DimmerOptions::new().with_fade(Duration::from_secs(2));
//!     client.set_dimmer(OutputId::new(7), Level::new(80.0)?, options).await?;
//!
//!     let level = client.get_dimmer(OutputId::new(7)).await?;
//!     println!("output 7: {level}%");
//!     Ok(())
//! }
//! ```
//!
//! ## Events
//!
//! Every status report, including those caused by keypads, is broadcast:
//!
//! ```no_run
//! use radiora_lib::{Client, ClientConfig, ClientEvent};
//!
//! # async fn example() -> radiora_lib::Result<()> {
//! let client = Client::new(ClientConfig::new("192.168.1.20"))?;
//! let mut events = client.subscribe();
//! client.connect().await?;
//!
//! while let Ok(event) = events.recv().await {
//!     if let ClientEvent::Status(status) = event {
//!         println!("output {} at {}%", status.id, status.level);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod accessory;
mod client;
pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod protocol;
pub mod state;
pub mod subscription;
pub mod types;
pub mod watchdog;

pub use accessory::{Accessory, AccessoryInformation, ReadKind};
pub use client::Client;
pub use command::{Command, DimmerOptions, OutputCommand};
pub use config::{ClientConfig, DeviceConfig, DeviceType, ReconnectionPolicy};
pub use error::{DeviceError, Error, ParseError, ProtocolError, Result, ValueError};
pub use event::{ClientEvent, StatusEvent};
pub use types::{Level, OutputId};
