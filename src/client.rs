// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Client handle for one controller.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot};

use crate::accessory::Accessory;
use crate::command::DimmerOptions;
use crate::config::ClientConfig;
use crate::error::{DeviceError, Error, ProtocolError, Result};
use crate::event::{ClientEvent, EventBus, StatusEvent};
use crate::protocol::connection::{ConnectionTask, Request};
use crate::types::{Level, OutputId};
use crate::watchdog::watchdog;

/// Handle to a RadioRA controller connection.
///
/// Creating a client spawns the connection task; nothing is sent until
/// [`connect`](Self::connect). Commands issued before the controller is
/// ready are queued and sent in order once it prints its prompt. Clones
/// share the connection, and the task stops when the last clone is
/// dropped.
///
/// # Examples
///
/// ```no_run
/// use radiora_lib::{Client, ClientConfig, DimmerOptions, Level, OutputId};
///
/// #[tokio::main]
/// async fn main() -> radiora_lib::Result<()> {
///     let client = Client::new(ClientConfig::new("192.168.1.20"))?;
///     client.connect().await?;
///
///     client.set_dimmer(OutputId::new(7), Level::new(80.0)?, DimmerOptions::default()).await?;
///     let level = client.get_dimmer(OutputId::new(7)).await?;
///     println!("output 7 is at {level}%");
///
///     client.disconnect().await
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    requests: mpsc::Sender<Request>,
    events: EventBus,
    config: ClientConfig,
}

impl Client {
    /// Validates `config` and spawns the connection task.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::InvalidConfiguration`] if validation fails.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let events = EventBus::new();
        let requests = ConnectionTask::spawn(config.clone(), events.clone());
        Ok(Self {
            inner: Arc::new(Inner {
                requests,
                events,
                config,
            }),
        })
    }

    /// Opens the link and starts the login handshake.
    ///
    /// Returns once the TCP connection is up; [`ClientEvent::LoggedIn`]
    /// follows when the controller accepts the credentials. Does nothing if
    /// the link is already open.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::ConnectionFailed`] if the controller cannot be
    /// reached within the connect timeout.
    pub async fn connect(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.request(Request::Connect { reply }).await?;
        rx.await.map_err(|_| Error::Closed)?
    }

    /// Closes the link without reconnecting.
    ///
    /// Pending requests are not cancelled; they time out.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Closed`] if the connection task has stopped.
    pub async fn disconnect(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.request(Request::Disconnect { reply }).await?;
        rx.await.map_err(|_| Error::Closed)
    }

    /// Sends a raw integration command, appending CRLF if missing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Closed`] if the connection task has stopped.
    pub async fn send_command(&self, command: impl Into<String>) -> Result<()> {
        self.request(Request::Send {
            command: command.into(),
        })
        .await
    }

    /// Sets an output level and waits for the controller's report.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Timeout`] if no report for `id` arrives
    /// within the response timeout.
    pub async fn set_dimmer(
        &self,
        id: OutputId,
        level: Level,
        options: DimmerOptions,
    ) -> Result<StatusEvent> {
        let (tx, rx) = oneshot::channel();
        self.set_dimmer_with(id, level, options, move |event| {
            let _ = tx.send(event);
        })
        .await?;
        self.await_completion(rx).await
    }

    /// Sets an output level and calls `completion` with the controller's
    /// report, or with `None` after the response timeout.
    ///
    /// `completion` runs exactly once, from a Tokio task.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Closed`] if the connection task has stopped;
    /// `completion` then still runs with `None` at the deadline.
    pub async fn set_dimmer_with<F>(
        &self,
        id: OutputId,
        level: Level,
        options: DimmerOptions,
        completion: F,
    ) -> Result<()>
    where
        F: FnOnce(Option<StatusEvent>) + Send + 'static,
    {
        let handle = watchdog(
            self.inner.config.response_timeout,
            format!("set output {id} to {level}"),
            completion,
        );
        self.request(Request::SetDimmer {
            id,
            level,
            options,
            continuation: Box::new(handle),
        })
        .await
    }

    /// Reads an output level.
    ///
    /// A level already reported by the controller is returned without any
    /// traffic; otherwise concurrent reads of one output share a single
    /// query.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Timeout`] if no report for `id` arrives
    /// within the response timeout.
    pub async fn get_dimmer(&self, id: OutputId) -> Result<Level> {
        let (tx, rx) = oneshot::channel();
        self.get_dimmer_with(id, move |level| {
            let _ = tx.send(level);
        })
        .await?;
        self.await_completion(rx).await
    }

    /// Reads an output level and calls `completion` with it, or with `None`
    /// after the response timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Closed`] if the connection task has stopped.
    pub async fn get_dimmer_with<F>(&self, id: OutputId, completion: F) -> Result<()>
    where
        F: FnOnce(Option<Level>) + Send + 'static,
    {
        let handle = watchdog(
            self.inner.config.response_timeout,
            format!("get output {id}"),
            completion,
        );
        self.request(Request::GetDimmer {
            id,
            continuation: Box::new(handle),
        })
        .await
    }

    /// Returns a receiver for connection and status events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.inner.events.subscribe()
    }

    /// Returns one accessory per configured device.
    #[must_use]
    pub fn accessories(&self) -> Vec<Accessory> {
        tracing::debug!(count = self.inner.config.devices.len(), "Listing accessories");
        self.inner
            .config
            .devices
            .iter()
            .map(|device| Accessory::new(self.clone(), device.clone()))
            .collect()
    }

    /// Returns the accessory for output `id`.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::UnknownDevice`] if `id` is not configured.
    pub fn accessory(&self, id: OutputId) -> Result<Accessory> {
        self.inner
            .config
            .devices
            .iter()
            .find(|device| device.id == id)
            .map(|device| Accessory::new(self.clone(), device.clone()))
            .ok_or_else(|| DeviceError::UnknownDevice(id.value()).into())
    }

    /// Returns the configuration the client was created with.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    async fn request(&self, request: Request) -> Result<()> {
        self.inner
            .requests
            .send(request)
            .await
            .map_err(|_| Error::Closed)
    }

    async fn await_completion<T>(&self, rx: oneshot::Receiver<Option<T>>) -> Result<T> {
        match rx.await {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Err(ProtocolError::Timeout(millis(self.inner.config.response_timeout)).into()),
            Err(_) => Err(Error::Closed),
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
