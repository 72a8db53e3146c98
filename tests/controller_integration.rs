// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests against a scripted controller on a local TCP port.

use std::time::Duration;

use radiora_lib::{
    Client, ClientConfig, ClientEvent, DeviceConfig, DimmerOptions, Error, Level, OutputId,
    ProtocolError, ReconnectionPolicy,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::broadcast;

const STEP_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// Scripted controller
// ============================================================================

struct FakeController {
    listener: TcpListener,
}

impl FakeController {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        Self { listener }
    }

    fn config(&self) -> ClientConfig {
        let port = self.listener.local_addr().unwrap().port();
        ClientConfig::new("127.0.0.1")
            .with_port(port)
            .with_response_timeout(Duration::from_secs(2))
            .with_reconnection(
                ReconnectionPolicy::new()
                    .with_initial_delay(Duration::from_millis(10))
                    .with_max_delay(Duration::from_millis(50)),
            )
    }

    async fn accept(&self) -> Peer {
        let (stream, _) = tokio::time::timeout(STEP_TIMEOUT, self.listener.accept())
            .await
            .expect("client did not connect")
            .unwrap();
        let (reader, writer) = stream.into_split();
        Peer {
            reader: BufReader::new(reader),
            writer,
        }
    }

    async fn assert_no_connection(&self, wait: Duration) {
        let accepted = tokio::time::timeout(wait, self.listener.accept()).await;
        assert!(accepted.is_err(), "unexpected connection attempt");
    }
}

struct Peer {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Peer {
    async fn send(&mut self, data: &str) {
        self.writer.write_all(data.as_bytes()).await.unwrap();
    }

    async fn expect_line(&mut self) -> String {
        let mut line = String::new();
        let read = tokio::time::timeout(STEP_TIMEOUT, self.reader.read_line(&mut line))
            .await
            .expect("client sent nothing")
            .unwrap();
        assert!(read > 0, "client closed the connection");
        assert!(line.ends_with("\r\n"), "unterminated line {line:?}");
        line.trim_end().to_string()
    }

    async fn expect_closed(&mut self) {
        let mut line = String::new();
        let read = tokio::time::timeout(STEP_TIMEOUT, self.reader.read_line(&mut line))
            .await
            .expect("client kept the connection open")
            .unwrap_or(0);
        assert_eq!(read, 0, "unexpected data {line:?}");
    }

    async fn login(&mut self) {
        self.send("login: ").await;
        assert_eq!(self.expect_line().await, "lutron");
        self.send("password: ").await;
        assert_eq!(self.expect_line().await, "integration");
        self.send("GNET> ").await;
    }
}

async fn wait_for(events: &mut broadcast::Receiver<ClientEvent>, expected: ClientEvent) {
    tokio::time::timeout(STEP_TIMEOUT, async {
        loop {
            let event = events.recv().await.unwrap();
            if event == expected {
                return;
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("no {expected:?} event"));
}

async fn logged_in_client(controller: &FakeController, config: ClientConfig) -> (Client, Peer) {
    let client = Client::new(config).unwrap();
    let mut events = client.subscribe();
    client.connect().await.unwrap();

    let mut peer = controller.accept().await;
    peer.login().await;
    wait_for(&mut events, ClientEvent::LoggedIn).await;
    (client, peer)
}

fn level(value: f64) -> Level {
    Level::new(value).unwrap()
}

// ============================================================================
// Login and queueing
// ============================================================================

mod login {
    use super::*;

    #[tokio::test]
    async fn commands_sent_before_login_are_flushed_in_order() {
        let controller = FakeController::start().await;
        let client = Client::new(controller.config()).unwrap();
        let mut events = client.subscribe();

        client.send_command("?OUTPUT,1").await.unwrap();
        client.send_command("#OUTPUT,2,1,50\r\n").await.unwrap();
        client.connect().await.unwrap();

        let mut peer = controller.accept().await;
        peer.login().await;

        assert_eq!(peer.expect_line().await, "?OUTPUT,1");
        assert_eq!(peer.expect_line().await, "#OUTPUT,2,1,50");
        wait_for(&mut events, ClientEvent::LoggedIn).await;
    }

    #[tokio::test]
    async fn banner_before_login_prompt_is_ignored() {
        let controller = FakeController::start().await;
        let client = Client::new(controller.config()).unwrap();
        let mut events = client.subscribe();
        client.connect().await.unwrap();

        let mut peer = controller.accept().await;
        peer.send("Welcome to RadioRA 2\r\n").await;
        peer.login().await;

        wait_for(&mut events, ClientEvent::LoggedIn).await;
    }

    #[tokio::test]
    async fn custom_credentials_and_prompt() {
        let controller = FakeController::start().await;
        let config = controller
            .config()
            .with_credentials("admin", "s3cret")
            .with_prompts(radiora_lib::protocol::Prompts::default().with_ready("QNET>"));
        let client = Client::new(config).unwrap();
        let mut events = client.subscribe();
        client.connect().await.unwrap();

        let mut peer = controller.accept().await;
        peer.send("login: ").await;
        assert_eq!(peer.expect_line().await, "admin");
        peer.send("password: ").await;
        assert_eq!(peer.expect_line().await, "s3cret");
        peer.send("QNET> ").await;

        wait_for(&mut events, ClientEvent::LoggedIn).await;
    }
}

// ============================================================================
// Dimmer requests
// ============================================================================

mod dimmer {
    use super::*;

    #[tokio::test]
    async fn set_dimmer_completes_with_echo() {
        let controller = FakeController::start().await;
        let (client, mut peer) = logged_in_client(&controller, controller.config()).await;

        let options = DimmerOptions::new()
            .with_fade(Duration::from_secs(2))
            .with_delay(Duration::from_secs(1));
        let request = tokio::spawn({
            let client = client.clone();
            async move { client.set_dimmer(OutputId::new(7), level(80.0), options).await }
        });

        assert_eq!(peer.expect_line().await, "#OUTPUT,7,1,80,2,1");
        peer.send("~OUTPUT,7,1,80.00\r\nGNET> ").await;

        let event = request.await.unwrap().unwrap();
        assert_eq!(event.id, OutputId::new(7));
        assert_eq!(event.level, level(80.0));
    }

    #[tokio::test]
    async fn concurrent_gets_share_one_query() {
        let controller = FakeController::start().await;
        let (client, mut peer) = logged_in_client(&controller, controller.config()).await;

        let first = tokio::spawn({
            let client = client.clone();
            async move { client.get_dimmer(OutputId::new(5)).await }
        });
        let second = tokio::spawn({
            let client = client.clone();
            async move { client.get_dimmer(OutputId::new(5)).await }
        });

        assert_eq!(peer.expect_line().await, "?OUTPUT,5");
        // Let both requests reach the connection task
        tokio::time::sleep(Duration::from_millis(50)).await;
        peer.send("~OUTPUT,5,1,42.00\r\nGNET> ").await;

        assert_eq!(first.await.unwrap().unwrap(), level(42.0));
        assert_eq!(second.await.unwrap().unwrap(), level(42.0));

        // Served from cache, so the next line on the wire is the marker
        assert_eq!(client.get_dimmer(OutputId::new(5)).await.unwrap(), level(42.0));
        client.send_command("?OUTPUT,99").await.unwrap();
        assert_eq!(peer.expect_line().await, "?OUTPUT,99");
    }

    #[tokio::test]
    async fn unsolicited_report_is_broadcast_and_cached() {
        let controller = FakeController::start().await;
        let (client, mut peer) = logged_in_client(&controller, controller.config()).await;
        let mut events = client.subscribe();

        peer.send("~OUTPUT,3,1,12.5\r\n").await;
        let expected = radiora_lib::StatusEvent::status(OutputId::new(3), level(12.5));
        wait_for(&mut events, ClientEvent::Status(expected)).await;

        assert_eq!(client.get_dimmer(OutputId::new(3)).await.unwrap(), level(12.5));
    }

    #[tokio::test]
    async fn unanswered_get_times_out() {
        let controller = FakeController::start().await;
        let config = controller
            .config()
            .with_response_timeout(Duration::from_millis(200));
        let (client, mut peer) = logged_in_client(&controller, config).await;

        let request = tokio::spawn({
            let client = client.clone();
            async move { client.get_dimmer(OutputId::new(11)).await }
        });
        assert_eq!(peer.expect_line().await, "?OUTPUT,11");

        let err = request.await.unwrap().unwrap_err();
        assert!(matches!(err, Error::Protocol(ProtocolError::Timeout(200))));
    }

    #[tokio::test]
    async fn callback_runs_once_with_result() {
        let controller = FakeController::start().await;
        let (client, mut peer) = logged_in_client(&controller, controller.config()).await;

        let (tx, rx) = tokio::sync::oneshot::channel();
        client
            .get_dimmer_with(OutputId::new(4), move |level| {
                tx.send(level).unwrap();
            })
            .await
            .unwrap();

        assert_eq!(peer.expect_line().await, "?OUTPUT,4");
        peer.send("~OUTPUT,4,1,0.00\r\n").await;

        assert_eq!(rx.await.unwrap(), Some(Level::OFF));
    }
}

// ============================================================================
// Accessories
// ============================================================================

mod accessory {
    use super::*;

    #[tokio::test]
    async fn power_and_brightness_round_trip_through_controller() {
        let controller = FakeController::start().await;
        let config = controller
            .config()
            .with_device(DeviceConfig::new(6, "Kitchen").with_serial("RA-6"));
        let (client, mut peer) = logged_in_client(&controller, config).await;
        let kitchen = client.accessory(OutputId::new(6)).unwrap();

        let read = tokio::spawn({
            let kitchen = kitchen.clone();
            async move { kitchen.get("brightness").await }
        });
        assert_eq!(peer.expect_line().await, "?OUTPUT,6");
        peer.send("~OUTPUT,6,1,66.60\r\n").await;
        assert_eq!(read.await.unwrap().unwrap(), 67);
        assert_eq!(kitchen.get("power").await.unwrap(), 1);

        let switch_off = tokio::spawn({
            let kitchen = kitchen.clone();
            async move { kitchen.set_power(false).await }
        });
        assert_eq!(peer.expect_line().await, "#OUTPUT,6,1,0");
        peer.send("~OUTPUT,6,1,0.00\r\n").await;
        assert_eq!(switch_off.await.unwrap().unwrap().level, Level::OFF);
    }
}

// ============================================================================
// Connection lifecycle
// ============================================================================

mod lifecycle {
    use super::*;

    #[tokio::test]
    async fn reconnects_after_link_loss() {
        let controller = FakeController::start().await;
        let (client, peer) = logged_in_client(&controller, controller.config()).await;
        let mut events = client.subscribe();

        drop(peer);
        wait_for(&mut events, ClientEvent::Disconnected { intentional: false }).await;
        wait_for(&mut events, ClientEvent::Reconnecting { attempt: 0 }).await;

        let mut peer = controller.accept().await;
        peer.login().await;
        wait_for(&mut events, ClientEvent::LoggedIn).await;

        client.send_command("?OUTPUT,1").await.unwrap();
        assert_eq!(peer.expect_line().await, "?OUTPUT,1");
    }

    #[tokio::test]
    async fn disconnect_does_not_reconnect() {
        let controller = FakeController::start().await;
        let (client, mut peer) = logged_in_client(&controller, controller.config()).await;
        let mut events = client.subscribe();

        client.disconnect().await.unwrap();

        peer.expect_closed().await;
        wait_for(&mut events, ClientEvent::Disconnected { intentional: true }).await;
        controller.assert_no_connection(Duration::from_millis(300)).await;
    }

    #[tokio::test]
    async fn close_before_login_does_not_reconnect() {
        let controller = FakeController::start().await;
        let client = Client::new(controller.config()).unwrap();
        let mut events = client.subscribe();
        client.connect().await.unwrap();

        let peer = controller.accept().await;
        drop(peer);

        wait_for(&mut events, ClientEvent::Disconnected { intentional: true }).await;
        controller.assert_no_connection(Duration::from_millis(300)).await;
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let controller = FakeController::start().await;
        let config = controller.config().with_reconnection(
            ReconnectionPolicy::new()
                .with_initial_delay(Duration::from_millis(10))
                .with_max_retries(2),
        );
        let (client, peer) = logged_in_client(&controller, config).await;
        let mut events = client.subscribe();

        // Nothing listens on the port any more
        drop(controller);
        drop(peer);

        wait_for(&mut events, ClientEvent::Reconnecting { attempt: 0 }).await;
        wait_for(&mut events, ClientEvent::Reconnecting { attempt: 1 }).await;
        wait_for(&mut events, ClientEvent::ReconnectFailed { attempts: 2 }).await;
    }

    #[tokio::test]
    async fn connect_to_closed_port_fails() {
        let controller = FakeController::start().await;
        let config = controller.config();
        drop(controller);

        let client = Client::new(config).unwrap();
        let err = client.connect().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol(ProtocolError::ConnectionFailed(_))
        ));
    }
}
