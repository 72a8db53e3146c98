// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Protocol state of one controller connection, without I/O.
//!
//! [`Session`] consumes decoded lines and caller requests and produces the
//! lines to write (collected in an outbox) plus the events to broadcast.
//! The connection task owns exactly one session and is the only code that
//! touches the socket.

use crate::command::{Command, DimmerOptions, OutputCommand, terminate};
use crate::event::{ClientEvent, MessageKind, StatusEvent};
use crate::protocol::login::{LoginState, LoginStep, Prompts};
use crate::protocol::queue::CommandQueue;
use crate::state::{CacheLookup, StatusCache};
use crate::subscription::{Continuation, Correlator};
use crate::types::{Level, OutputId};

/// Login, readiness, queue, cache and pending requests of one connection.
#[derive(Debug)]
pub struct Session {
    prompts: Prompts,
    username: String,
    password: String,
    login: LoginState,
    ready: bool,
    logged_in: bool,
    queue: CommandQueue,
    cache: StatusCache,
    correlator: Correlator,
    outbox: Vec<String>,
}

impl Session {
    /// Creates a session that will log in with the given credentials.
    #[must_use]
    pub fn new(prompts: Prompts, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            prompts,
            username: username.into(),
            password: password.into(),
            login: LoginState::default(),
            ready: false,
            logged_in: false,
            queue: CommandQueue::new(),
            cache: StatusCache::new(),
            correlator: Correlator::new(),
            outbox: Vec::new(),
        }
    }

    /// Resets the handshake for a freshly opened link.
    pub fn begin_connection(&mut self) {
        self.login = LoginState::AwaitingUsername;
        self.ready = false;
        self.logged_in = false;
    }

    /// Feeds one decoded line or prompt.
    ///
    /// Returns the events to broadcast. Never fails: unexpected and
    /// malformed input is logged and dropped.
    pub fn handle_input(&mut self, input: &str) -> Vec<ClientEvent> {
        tracing::trace!(line = %input, "Received");

        match self.login.advance(input, &self.prompts) {
            LoginStep::SendUsername => {
                tracing::debug!("Sending user name");
                let line = terminate(&self.username);
                self.outbox.push(line);
                Vec::new()
            }
            LoginStep::SendPassword => {
                tracing::debug!("Sending password");
                let line = terminate(&self.password);
                self.outbox.push(line);
                Vec::new()
            }
            LoginStep::Desync { state, input } => {
                tracing::warn!(?state, prompt = %input, "Unexpected prompt during login");
                Vec::new()
            }
            LoginStep::Steady(line) => self.handle_steady(line),
        }
    }

    fn handle_steady(&mut self, line: &str) -> Vec<ClientEvent> {
        let mut events = Vec::new();

        let report = match self.prompts.match_ready(line) {
            Some(rest) => {
                self.on_ready(&mut events);
                rest
            }
            None => line,
        };
        if report.is_empty() {
            return events;
        }

        match StatusEvent::parse_line(report) {
            Ok(Some(status)) => {
                self.cache.update(status.id, status.level);
                let delivered = self.correlator.publish(&status);
                tracing::debug!(
                    output = %status.id,
                    level = %status.level,
                    delivered,
                    "Output status"
                );
                events.push(ClientEvent::Status(status));
            }
            Ok(None) => tracing::trace!(line = %report, "Ignoring line"),
            Err(e) => tracing::debug!(line = %report, error = %e, "Dropping malformed report"),
        }
        events
    }

    fn on_ready(&mut self, events: &mut Vec<ClientEvent>) {
        if !self.logged_in {
            self.logged_in = true;
            tracing::info!("Logged into controller");
            events.push(ClientEvent::LoggedIn);
        }
        self.ready = true;
        if !self.queue.is_empty() {
            tracing::debug!(count = self.queue.len(), "Flushing queued commands");
            self.outbox.extend(self.queue.drain());
        }
    }

    /// Sends a raw command, or queues it until the controller is ready.
    ///
    /// A missing CRLF terminator is appended.
    pub fn send_command(&mut self, command: &str) {
        let line = terminate(command);
        if self.ready {
            tracing::debug!(command = %line.trim_end(), "Sending");
            self.outbox.push(line);
        } else {
            tracing::debug!(command = %line.trim_end(), "Queueing until ready");
            self.queue.push(line);
        }
    }

    /// Sets an output level.
    ///
    /// `continuation` receives the next status report of `id`, normally the
    /// controller's echo of the new level.
    pub fn set_dimmer(
        &mut self,
        id: OutputId,
        level: Level,
        options: DimmerOptions,
        continuation: Box<dyn Continuation>,
    ) {
        self.correlator.subscribe(id, MessageKind::Status, continuation);
        let command = OutputCommand::set_with(id, level, options);
        self.send_command(&command.to_wire());
    }

    /// Reads an output level.
    ///
    /// A cached level is delivered immediately with no traffic. Otherwise the
    /// continuation waits for the next report, and a `?OUTPUT` query is sent
    /// unless one is already in flight.
    pub fn get_dimmer(&mut self, id: OutputId, continuation: Box<dyn Continuation>) -> CacheLookup {
        let lookup = self.cache.lookup(id);
        match lookup {
            CacheLookup::Cached(level) => {
                tracing::debug!(output = %id, %level, "Serving cached level");
                continuation.deliver(StatusEvent::status(id, level));
            }
            CacheLookup::InFlight => {
                tracing::debug!(output = %id, "Query already in flight, waiting");
                self.correlator.subscribe(id, MessageKind::Status, continuation);
            }
            CacheLookup::Miss => {
                self.correlator.subscribe(id, MessageKind::Status, continuation);
                if self.cache.begin_query(id) {
                    self.send_command(&OutputCommand::Get(id).to_wire());
                }
            }
        }
        lookup
    }

    /// Marks the upcoming close as requested by the caller.
    pub fn begin_disconnect(&mut self) {
        self.logged_in = false;
    }

    /// Records that the link closed.
    ///
    /// Returns whether the session was logged in, i.e. whether the close was
    /// unexpected. Queued commands survive for the next connection; pending
    /// queries do not, so their in-flight markers are cleared.
    pub fn link_closed(&mut self) -> bool {
        let was_logged_in = self.logged_in;
        self.logged_in = false;
        self.ready = false;
        self.login = LoginState::AwaitingUsername;
        self.cache.clear_in_flight();
        self.outbox.clear();
        was_logged_in
    }

    /// Takes every line waiting to be written, oldest first.
    pub fn take_outbox(&mut self) -> Vec<String> {
        std::mem::take(&mut self.outbox)
    }

    /// Returns true if the controller has shown its ready prompt.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Returns true once the first ready prompt of this connection was seen.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    /// Returns the handshake state.
    #[must_use]
    pub fn login_state(&self) -> LoginState {
        self.login
    }

    /// Returns the level cache.
    #[must_use]
    pub fn cache(&self) -> &StatusCache {
        &self.cache
    }

    /// Returns the pending request registry.
    #[must_use]
    pub fn correlator(&self) -> &Correlator {
        &self.correlator
    }

    /// Returns the number of commands waiting for the ready prompt.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use parking_lot::Mutex;

    use super::*;
    use crate::subscription::FnContinuation;

    fn session() -> Session {
        let mut session = Session::new(Prompts::default(), "lutron", "integration");
        session.begin_connection();
        session
    }

    fn logged_in() -> Session {
        let mut session = session();
        session.handle_input("login: ");
        session.handle_input("password: ");
        session.handle_input("GNET> ");
        session.take_outbox();
        session
    }

    fn level(value: f64) -> Level {
        Level::new(value).unwrap()
    }

    fn recorder() -> (Arc<Mutex<Vec<Level>>>, impl Fn() -> Box<dyn Continuation>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let make = move || {
            let sink = Arc::clone(&sink);
            Box::new(FnContinuation(move |event: StatusEvent| sink.lock().push(event.level)))
                as Box<dyn Continuation>
        };
        (seen, make)
    }

    #[test]
    fn login_handshake_sends_credentials_and_logs_in_once() {
        let mut session = session();

        assert!(session.handle_input("login: ").is_empty());
        assert_eq!(session.take_outbox(), vec!["lutron\r\n"]);

        assert!(session.handle_input("password: ").is_empty());
        assert_eq!(session.take_outbox(), vec!["integration\r\n"]);

        assert_eq!(session.handle_input("GNET> "), vec![ClientEvent::LoggedIn]);
        assert!(session.is_ready());
        assert!(session.is_logged_in());

        assert!(session.handle_input("GNET> ").is_empty());
    }

    #[test]
    fn unexpected_prompt_stalls_login() {
        let mut session = session();

        session.handle_input("Welcome");
        assert!(session.take_outbox().is_empty());
        assert_eq!(session.login_state(), LoginState::AwaitingUsername);

        session.handle_input("login: ");
        assert_eq!(session.take_outbox(), vec!["lutron\r\n"]);
    }

    #[test]
    fn commands_queue_until_ready_then_flush_in_order() {
        let mut session = session();
        session.send_command("?OUTPUT,1");
        session.send_command("#OUTPUT,2,1,50");
        session.send_command("?OUTPUT,3\r\n");
        assert_eq!(session.queued(), 3);

        session.handle_input("login: ");
        session.handle_input("password: ");
        assert_eq!(session.take_outbox(), vec!["lutron\r\n", "integration\r\n"]);

        session.handle_input("GNET> ");
        assert_eq!(
            session.take_outbox(),
            vec!["?OUTPUT,1\r\n", "#OUTPUT,2,1,50\r\n", "?OUTPUT,3\r\n"]
        );
        assert_eq!(session.queued(), 0);

        // A second prompt sends nothing twice
        session.handle_input("GNET> ");
        assert!(session.take_outbox().is_empty());
    }

    #[test]
    fn ready_session_sends_immediately() {
        let mut session = logged_in();
        session.send_command("?OUTPUT,4");
        assert_eq!(session.take_outbox(), vec!["?OUTPUT,4\r\n"]);
    }

    #[test]
    fn concurrent_gets_share_one_query() {
        let mut session = logged_in();
        let (seen, make) = recorder();
        let id = OutputId::new(1);

        assert_eq!(session.get_dimmer(id, make()), CacheLookup::Miss);
        assert_eq!(session.get_dimmer(id, make()), CacheLookup::InFlight);
        assert_eq!(session.take_outbox(), vec!["?OUTPUT,1\r\n"]);

        session.handle_input("~OUTPUT,1,1,75.00");
        assert_eq!(*seen.lock(), vec![level(75.0), level(75.0)]);
    }

    #[test]
    fn cached_level_is_served_without_traffic() {
        let mut session = logged_in();
        let (seen, make) = recorder();
        session.handle_input("~OUTPUT,8,1,20.00");

        assert_eq!(
            session.get_dimmer(OutputId::new(8), make()),
            CacheLookup::Cached(level(20.0))
        );
        assert!(session.take_outbox().is_empty());
        assert_eq!(*seen.lock(), vec![level(20.0)]);
    }

    #[test]
    fn status_report_updates_cache_and_wakes_waiters() {
        let mut session = logged_in();
        let (seen, make) = recorder();
        let id = OutputId::new(5);
        session.get_dimmer(id, make());
        session.get_dimmer(id, make());

        let events = session.handle_input("~OUTPUT,5,1,42.0");

        assert_eq!(
            events,
            vec![ClientEvent::Status(StatusEvent::status(id, level(42.0)))]
        );
        let status = session.cache().get(id).unwrap();
        assert!(!status.in_flight);
        assert_eq!(status.level, Some(level(42.0)));
        assert_eq!(*seen.lock(), vec![level(42.0), level(42.0)]);
        assert_eq!(session.correlator().pending_count(), 0);
    }

    #[test]
    fn set_dimmer_writes_command_and_waits_for_echo() {
        let mut session = logged_in();
        let (seen, make) = recorder();

        session.set_dimmer(OutputId::new(7), level(80.0), DimmerOptions::default(), make());
        assert_eq!(session.take_outbox(), vec!["#OUTPUT,7,1,80\r\n"]);

        let options = DimmerOptions::new()
            .with_fade(Duration::from_secs(2))
            .with_delay(Duration::from_secs(1));
        session.set_dimmer(OutputId::new(7), level(80.0), options, make());
        assert_eq!(session.take_outbox(), vec!["#OUTPUT,7,1,80,2,1\r\n"]);

        session.handle_input("~OUTPUT,7,1,80.00");
        assert_eq!(*seen.lock(), vec![level(80.0), level(80.0)]);
    }

    #[test]
    fn malformed_and_foreign_lines_are_dropped() {
        let mut session = logged_in();
        assert!(session.handle_input("~OUTPUT,x,1,50").is_empty());
        assert!(session.handle_input("~DEVICE,1,2,3").is_empty());
        assert!(session.handle_input("garbage").is_empty());
        assert!(session.cache().is_empty());
    }

    #[test]
    fn report_on_prompt_line_is_processed() {
        let mut session = logged_in();
        let events = session.handle_input("GNET> ~OUTPUT,2,1,10.00");
        assert_eq!(
            events,
            vec![ClientEvent::Status(StatusEvent::status(
                OutputId::new(2),
                level(10.0)
            ))]
        );
    }

    #[test]
    fn link_closed_reports_whether_logged_in() {
        let mut session = logged_in();
        session.get_dimmer(OutputId::new(3), recorder().1());
        session.send_command("?OUTPUT,9");
        session.take_outbox();

        assert!(session.link_closed());
        assert!(!session.is_ready());
        assert!(!session.cache().get(OutputId::new(3)).unwrap().in_flight);

        let mut session = logged_in();
        session.begin_disconnect();
        assert!(!session.link_closed());
    }

    #[test]
    fn logged_in_fires_again_after_reconnect() {
        let mut session = logged_in();
        session.link_closed();
        session.begin_connection();

        session.handle_input("login: ");
        session.handle_input("password: ");
        assert_eq!(session.handle_input("GNET> "), vec![ClientEvent::LoggedIn]);
    }
}
