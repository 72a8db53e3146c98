// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connection task.
//!
//! One tokio task owns the socket and the [`Session`]. Client handles send
//! it [`Request`]s over an mpsc channel; the task multiplexes them with
//! socket reads and the reconnect timer, feeds decoded lines to the session
//! and writes whatever the session puts in its outbox.
//!
//! The task exits when every client handle has been dropped.

use std::io;

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tokio_util::codec::Decoder;

use crate::command::DimmerOptions;
use crate::config::ClientConfig;
use crate::error::{ProtocolError, Result};
use crate::event::{ClientEvent, EventBus};
use crate::protocol::codec::LineDecoder;
use crate::protocol::session::Session;
use crate::subscription::Continuation;
use crate::types::{Level, OutputId};

/// Capacity of the request channel.
pub(crate) const REQUEST_CHANNEL_CAPACITY: usize = 64;

const READ_BUFFER_CAPACITY: usize = 1024;

/// A request from a client handle to the connection task.
pub(crate) enum Request {
    /// Open the link unless it is already open.
    Connect { reply: oneshot::Sender<Result<()>> },
    /// Close the link without reconnecting.
    Disconnect { reply: oneshot::Sender<()> },
    /// Send a raw command.
    Send { command: String },
    /// Set an output level.
    SetDimmer {
        id: OutputId,
        level: Level,
        options: DimmerOptions,
        continuation: Box<dyn Continuation>,
    },
    /// Read an output level.
    GetDimmer {
        id: OutputId,
        continuation: Box<dyn Continuation>,
    },
}

/// Open TCP link with its read buffer.
struct Link {
    reader: OwnedReadHalf,
    writer: OwnedWriteHalf,
    buffer: BytesMut,
}

/// What woke the task loop.
enum Wake {
    Request(Option<Request>),
    Read(io::Result<usize>),
    ReconnectDue,
}

/// State owned by the connection task.
pub(crate) struct ConnectionTask {
    config: ClientConfig,
    session: Session,
    decoder: LineDecoder,
    link: Option<Link>,
    events: EventBus,
    requests: mpsc::Receiver<Request>,
    reconnect_at: Option<Instant>,
    /// Attempt number while a reconnect chain is running.
    retry: Option<u32>,
}

impl ConnectionTask {
    /// Spawns the task and returns the sender for its requests.
    pub(crate) fn spawn(config: ClientConfig, events: EventBus) -> mpsc::Sender<Request> {
        let (tx, rx) = mpsc::channel(REQUEST_CHANNEL_CAPACITY);
        let session = Session::new(
            config.prompts.clone(),
            config.username.clone(),
            config.password.clone(),
        );
        let task = Self {
            config,
            session,
            decoder: LineDecoder::new(),
            link: None,
            events,
            requests: rx,
            reconnect_at: None,
            retry: None,
        };
        tokio::spawn(task.run());
        tx
    }

    async fn run(mut self) {
        tracing::debug!(address = %self.config.address(), "Connection task started");

        loop {
            let wake = tokio::select! {
                request = self.requests.recv() => Wake::Request(request),
                read = read_some(&mut self.link) => Wake::Read(read),
                () = reconnect_due(self.reconnect_at) => Wake::ReconnectDue,
            };

            match wake {
                Wake::Request(None) => break,
                Wake::Request(Some(request)) => self.handle_request(request).await,
                Wake::Read(result) => self.handle_read(result).await,
                Wake::ReconnectDue => self.reconnect().await,
            }
        }

        if let Some(mut link) = self.link.take() {
            let _ = link.writer.shutdown().await;
        }
        tracing::debug!("Connection task stopped");
    }

    async fn handle_request(&mut self, request: Request) {
        match request {
            Request::Connect { reply } => {
                let result = if self.link.is_some() {
                    tracing::debug!("Already connected");
                    Ok(())
                } else {
                    self.reconnect_at = None;
                    self.retry = None;
                    self.open().await
                };
                let _ = reply.send(result);
            }
            Request::Disconnect { reply } => {
                self.close().await;
                let _ = reply.send(());
            }
            Request::Send { command } => {
                self.session.send_command(&command);
                self.flush().await;
            }
            Request::SetDimmer {
                id,
                level,
                options,
                continuation,
            } => {
                self.session.set_dimmer(id, level, options, continuation);
                self.flush().await;
            }
            Request::GetDimmer { id, continuation } => {
                self.session.get_dimmer(id, continuation);
                self.flush().await;
            }
        }
    }

    async fn handle_read(&mut self, result: io::Result<usize>) {
        match result {
            Ok(0) => {
                tracing::debug!("Controller closed the connection");
                self.on_link_closed();
                return;
            }
            Ok(n) => tracing::trace!(bytes = n, "Read"),
            Err(e) => {
                tracing::warn!(error = %e, "Read failed");
                self.on_link_closed();
                return;
            }
        }

        let Some(link) = self.link.as_mut() else {
            return;
        };
        let mut lines = Vec::new();
        loop {
            match self.decoder.decode(&mut link.buffer) {
                Ok(Some(line)) => lines.push(line),
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding undecodable input");
                    link.buffer.clear();
                    break;
                }
            }
        }

        for line in lines {
            for event in self.session.handle_input(&line) {
                if event == ClientEvent::LoggedIn {
                    self.retry = None;
                }
                self.events.publish(event);
            }
        }
        self.flush().await;
    }

    /// Writes everything the session queued for the wire.
    async fn flush(&mut self) {
        let lines = self.session.take_outbox();
        let Some(link) = self.link.as_mut() else {
            return;
        };

        for line in lines {
            if let Err(e) = link.writer.write_all(line.as_bytes()).await {
                tracing::warn!(error = %e, "Write failed");
                self.on_link_closed();
                return;
            }
        }
    }

    async fn open(&mut self) -> Result<()> {
        let address = self.config.address();
        tracing::debug!(%address, "Connecting");

        let stream = tokio::time::timeout(self.config.connect_timeout, TcpStream::connect(&address))
            .await
            .map_err(|_| ProtocolError::ConnectionFailed(format!("{address}: timed out")))?
            .map_err(|e| ProtocolError::ConnectionFailed(format!("{address}: {e}")))?;
        stream.set_nodelay(true).map_err(ProtocolError::Io)?;

        let (reader, writer) = stream.into_split();
        self.decoder = LineDecoder::new();
        self.session.begin_connection();
        self.link = Some(Link {
            reader,
            writer,
            buffer: BytesMut::with_capacity(READ_BUFFER_CAPACITY),
        });
        tracing::info!(%address, "Connected to controller");
        Ok(())
    }

    async fn close(&mut self) {
        self.session.begin_disconnect();
        self.reconnect_at = None;
        self.retry = None;

        let Some(mut link) = self.link.take() else {
            return;
        };
        if let Err(e) = link.writer.shutdown().await {
            tracing::debug!(error = %e, "Shutdown failed");
        }
        drop(link);

        self.session.link_closed();
        tracing::info!("Disconnected from controller");
        self.events.publish(ClientEvent::Disconnected { intentional: true });
    }

    fn on_link_closed(&mut self) {
        self.link = None;
        let was_logged_in = self.session.link_closed();

        if was_logged_in {
            tracing::warn!("Lost connection to controller");
            self.events.publish(ClientEvent::Disconnected { intentional: false });
            self.schedule_reconnect(0);
        } else if let Some(attempt) = self.retry {
            tracing::warn!(attempt, "Connection closed before login");
            self.schedule_reconnect(attempt + 1);
        } else {
            tracing::info!("Connection closed before login");
            self.events.publish(ClientEvent::Disconnected { intentional: true });
        }
    }

    fn schedule_reconnect(&mut self, attempt: u32) {
        let policy = &self.config.reconnection;
        if !policy.should_retry(attempt) {
            tracing::warn!(attempts = attempt, "Giving up reconnecting");
            self.retry = None;
            self.reconnect_at = None;
            self.events.publish(ClientEvent::ReconnectFailed { attempts: attempt });
            return;
        }

        let delay = policy.delay_for_attempt(attempt);
        tracing::info!(attempt, delay = ?delay, "Scheduling reconnect");
        self.retry = Some(attempt);
        self.reconnect_at = Some(Instant::now() + delay);
        self.events.publish(ClientEvent::Reconnecting { attempt });
    }

    async fn reconnect(&mut self) {
        self.reconnect_at = None;
        let attempt = self.retry.unwrap_or(0);

        if let Err(e) = self.open().await {
            tracing::warn!(attempt, error = %e, "Reconnect failed");
            self.schedule_reconnect(attempt + 1);
        }
    }
}

/// Reads into the link buffer, or never completes without a link.
async fn read_some(link: &mut Option<Link>) -> io::Result<usize> {
    match link {
        Some(link) => link.reader.read_buf(&mut link.buffer).await,
        None => std::future::pending().await,
    }
}

async fn reconnect_due(at: Option<Instant>) {
    match at {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
