//! In-memory routing world: a router over a recording outbox, with clients
//! addressed by display name.

use std::collections::HashMap;
use std::net::SocketAddr;

use serde_json::Value;

use crate::role::Role;
use crate::router::Router;
use crate::session::ConnectionId;

use super::outbox::RecordingOutbox;

/// Scenario world for routing behaviour.
pub struct RoutingWorld {
    router: Router<RecordingOutbox>,
    outbox: RecordingOutbox,
    connections: HashMap<String, ConnectionId>,
    next_connection: usize,
}

impl RoutingWorld {
    /// Builds a world with no sessions.
    #[must_use]
    pub fn new() -> Self {
        let outbox = RecordingOutbox::default();
        Self {
            router: Router::new(outbox.clone()),
            outbox,
            connections: HashMap::new(),
            next_connection: 2,
        }
    }

    /// Opens a session for `name` without sending credentials.
    pub fn open(&mut self, name: &str) -> ConnectionId {
        let connection = ConnectionId::new(self.next_connection);
        self.next_connection += 1;
        let peer = SocketAddr::from(([127, 0, 0, 1], 40_000));
        self.router
            .registry_mut()
            .session_or_insert(connection, peer);
        self.connections.insert(name.to_owned(), connection);
        connection
    }

    /// Opens a session and credentials it.
    pub fn join(&mut self, name: &str, role: Role) {
        let connection = self.open(name);
        self.router.on_credentials(connection, name.to_owned(), role);
    }

    /// Joins as background setup: notifications caused by the join are
    /// discarded so assertions only see the scenario's action.
    pub fn arrange(&mut self, name: &str, role: Role) {
        self.join(name, role);
        self.outbox.clear();
    }

    /// Sends chat from `name`.
    pub fn chat(&mut self, name: &str, text: &str, to: Option<&str>) {
        let connection = self.connection(name);
        self.router.on_chat_message(connection, text, to);
    }

    /// Closes `name`'s connection.
    pub fn disconnect(&mut self, name: &str) {
        let connection = self.connection(name);
        self.router.on_disconnect(connection);
    }

    /// `type` fields received by `name`, in order.
    pub fn received_types(&self, name: &str) -> Vec<String> {
        self.outbox.types_for(self.connection(name))
    }

    /// Messages received by `name`, in order.
    pub fn received(&self, name: &str) -> Vec<Value> {
        self.outbox.messages_for(self.connection(name))
    }

    /// Number of agents and customers in the registry.
    pub fn membership(&self) -> (usize, usize) {
        let registry = self.router.registry();
        (registry.agent_count(), registry.customer_count())
    }

    fn connection(&self, name: &str) -> ConnectionId {
        *self
            .connections
            .get(name)
            .unwrap_or_else(|| panic!("no client named {name}"))
    }
}

impl Default for RoutingWorld {
    fn default() -> Self {
        Self::new()
    }
}
