//! Dispatch queue consumer.
//!
//! The worker owns every session, reassembler, and routing decision. Events
//! arrive from the reactor over an unbounded channel and are processed one at
//! a time in arrival order.

use std::net::SocketAddr;
use std::sync::mpsc::Receiver;

use tracing::{debug, info, warn};

use crate::outbox::Outbox;
use crate::protocol::InboundMessage;
use crate::router::Router;
use crate::session::ConnectionId;

const WORKER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::worker");

/// Event handed from the reactor thread to the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchEvent {
    /// Bytes read from a connection, copied out of the reactor's buffer.
    Received {
        /// Source connection.
        connection: ConnectionId,
        /// Remote address, used when the session is first created.
        peer: SocketAddr,
        /// Exactly the bytes read.
        bytes: Vec<u8>,
    },
    /// The connection has been closed by the peer, an I/O error, or a close
    /// request.
    Closed {
        /// Closed connection.
        connection: ConnectionId,
    },
}

/// Serial processor of dispatch events.
pub struct Worker<O> {
    router: Router<O>,
}

impl<O> Worker<O>
where
    O: Outbox,
{
    /// Creates a worker routing through `outbox`.
    pub fn new(outbox: O) -> Self {
        Self {
            router: Router::new(outbox),
        }
    }

    /// Router view, mainly for assertions.
    pub fn router(&self) -> &Router<O> {
        &self.router
    }

    /// Processes events until every sender has been dropped.
    pub fn run(mut self, events: Receiver<DispatchEvent>) {
        info!(target: WORKER_TARGET, "worker started");
        for event in events {
            self.handle(event);
        }
        info!(
            target: WORKER_TARGET,
            sessions = self.router.registry().len(),
            "worker stopped"
        );
    }

    /// Processes one event.
    pub fn handle(&mut self, event: DispatchEvent) {
        match event {
            DispatchEvent::Received {
                connection,
                peer,
                bytes,
            } => self.on_bytes(connection, peer, &bytes),
            DispatchEvent::Closed { connection } => self.router.on_disconnect(connection),
        }
    }

    fn on_bytes(&mut self, connection: ConnectionId, peer: SocketAddr, bytes: &[u8]) {
        let session = self.router.registry_mut().session_or_insert(connection, peer);
        if session.is_poisoned() {
            debug!(
                target: WORKER_TARGET,
                session = %session,
                bytes = bytes.len(),
                "ignoring bytes for a connection pending close"
            );
            return;
        }

        let fed = session.feed(bytes);
        for body in fed.bodies {
            self.on_body(connection, &body);
        }

        if let Some(error) = fed.error {
            warn!(
                target: WORKER_TARGET,
                session = %self.label(connection),
                error = %error,
                "framing error; closing connection"
            );
            self.router.outbox().close(connection);
        }
    }

    fn label(&self, connection: ConnectionId) -> String {
        self.router
            .registry()
            .get(connection)
            .map_or_else(|| connection.to_string(), ToString::to_string)
    }

    fn on_body(&mut self, connection: ConnectionId, body: &[u8]) {
        match InboundMessage::parse(body) {
            Ok(InboundMessage::Credentials { username, role }) => {
                self.router.on_credentials(connection, username, role);
            }
            Ok(InboundMessage::Chat { text, to }) => {
                self.router
                    .on_chat_message(connection, &text, to.as_deref());
            }
            Err(error) => {
                warn!(
                    target: WORKER_TARGET,
                    session = %self.label(connection),
                    error = %error,
                    "dropping malformed message"
                );
            }
        }
    }
}
