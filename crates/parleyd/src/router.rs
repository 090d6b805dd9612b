//! Role-aware fan-out of session events.
//!
//! Visibility rules:
//!
//! - customers talk to every agent, and learn only whether any agent exists;
//! - agents see every customer arrive and leave, and see every conversation
//!   any agent has with anyone;
//! - uncredentialed sessions are never routed to.

use tracing::{debug, info, warn};

use crate::outbox::Outbox;
use crate::protocol::OutboundMessage;
use crate::registry::{Registry, RegistryError};
use crate::role::Role;
use crate::session::ConnectionId;

const ROUTER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::router");

/// Applies session events to the registry and emits notifications.
pub struct Router<O> {
    registry: Registry,
    outbox: O,
}

impl<O> Router<O>
where
    O: Outbox,
{
    /// Builds a router with an empty registry.
    pub fn new(outbox: O) -> Self {
        Self {
            registry: Registry::new(),
            outbox,
        }
    }

    /// Registry view.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Outbound sink.
    pub fn outbox(&self) -> &O {
        &self.outbox
    }

    /// Handles a credentials message.
    pub fn on_credentials(&mut self, connection: ConnectionId, username: String, role: Role) {
        match self.registry.credential(connection, username, role) {
            Ok(()) => {}
            Err(error @ RegistryError::AlreadyCredentialed { .. }) => {
                warn!(
                    target: ROUTER_TARGET,
                    %connection,
                    error = %error,
                    "ignoring repeated credentials"
                );
                return;
            }
            Err(error @ RegistryError::UnknownConnection(_)) => {
                warn!(target: ROUTER_TARGET, error = %error, "credentials for unknown session");
                return;
            }
        }

        let Some(session) = self.registry.get(connection) else {
            return;
        };
        let Some(username) = session.username() else {
            return;
        };
        info!(
            target: ROUTER_TARGET,
            connection = %session.connection(),
            session = %session,
            %role,
            "session credentialed"
        );

        match role {
            Role::Customer => {
                if self.registry.agent_count() == 0 {
                    return;
                }
                deliver(&self.outbox, [connection], &OutboundMessage::AgentsPresent);
                deliver(
                    &self.outbox,
                    self.registry.agents(),
                    &OutboundMessage::Connected {
                        username,
                        role: Role::Customer,
                    },
                );
            }
            Role::Agent => {
                for customer in self.registry.customer_sessions() {
                    let Some(name) = customer.username() else {
                        continue;
                    };
                    deliver(
                        &self.outbox,
                        [connection],
                        &OutboundMessage::Connected {
                            username: name,
                            role: Role::Customer,
                        },
                    );
                }
                if self.registry.agent_count() == 1 {
                    deliver(
                        &self.outbox,
                        self.registry.customers(),
                        &OutboundMessage::AgentsPresent,
                    );
                }
            }
        }
    }

    /// Handles a chat message.
    pub fn on_chat_message(&mut self, connection: ConnectionId, text: &str, to: Option<&str>) {
        let Some(session) = self.registry.get(connection) else {
            warn!(target: ROUTER_TARGET, %connection, "chat from unknown session");
            return;
        };
        let (Some(sender), Some(role)) = (session.username(), session.role()) else {
            warn!(
                target: ROUTER_TARGET,
                session = %session,
                "dropping chat sent before credentials"
            );
            return;
        };

        match role {
            Role::Customer => deliver(
                &self.outbox,
                self.registry.agents(),
                &OutboundMessage::CustomerMessage {
                    sender,
                    message_text: text,
                },
            ),
            Role::Agent => {
                let Some(to) = to else {
                    warn!(
                        target: ROUTER_TARGET,
                        session = %session,
                        "dropping agent chat without a recipient"
                    );
                    return;
                };
                let Some(target) = self.registry.find_by_name(to) else {
                    warn!(
                        target: ROUTER_TARGET,
                        session = %session,
                        recipient = to,
                        "dropping chat for unknown recipient"
                    );
                    return;
                };
                let observers = self
                    .registry
                    .agents()
                    .filter(|agent| *agent != connection && *agent != target);
                deliver(
                    &self.outbox,
                    std::iter::once(target).chain(observers),
                    &OutboundMessage::AgentMessage {
                        sender,
                        to,
                        message_text: text,
                    },
                );
            }
        }
    }

    /// Handles a closed connection.
    pub fn on_disconnect(&mut self, connection: ConnectionId) {
        let Some(session) = self.registry.remove(connection) else {
            debug!(target: ROUTER_TARGET, %connection, "close for unknown session");
            return;
        };
        info!(
            target: ROUTER_TARGET,
            %connection,
            peer = %session.peer(),
            session = %session,
            "session closed"
        );

        let Some(identity) = session.identity() else {
            return;
        };
        match identity.role() {
            Role::Customer => deliver(
                &self.outbox,
                self.registry.agents(),
                &OutboundMessage::Disconnected {
                    username: identity.username(),
                },
            ),
            Role::Agent => {
                if self.registry.agent_count() == 0 {
                    deliver(
                        &self.outbox,
                        self.registry.customers(),
                        &OutboundMessage::NoAgentsPresent,
                    );
                }
            }
        }
    }
}

/// Renders `message` once and queues it for every recipient.
///
/// Messages that cannot be framed are logged and dropped.
fn deliver<O, I>(outbox: &O, recipients: I, message: &OutboundMessage<'_>)
where
    O: Outbox,
    I: IntoIterator<Item = ConnectionId>,
{
    let frame = match message.to_frame() {
        Ok(frame) => frame,
        Err(error) => {
            warn!(
                target: ROUTER_TARGET,
                error = %error,
                outbound = ?message,
                "dropping unframeable message"
            );
            return;
        }
    };
    for recipient in recipients {
        outbox.send(recipient, frame.clone());
    }
}
