//! Session table with role-partitioned membership.
//!
//! Owned by the worker thread alone, so nothing here locks. Role sets are
//! ordered by connection id, which keeps fan-out order equal to acceptance
//! order and makes tests deterministic.

use std::collections::{BTreeSet, HashMap};
use std::net::SocketAddr;

use thiserror::Error;

use crate::role::Role;
use crate::session::{ConnectionId, Session};

/// Errors raised when assigning an identity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No session exists for the connection.
    #[error("no session for connection {0}")]
    UnknownConnection(ConnectionId),
    /// The session already has a name and role.
    #[error("connection {connection} is already credentialed as '{username}' ({role})")]
    AlreadyCredentialed {
        /// Connection that sent the extra credentials.
        connection: ConnectionId,
        /// Name fixed by the first credentials.
        username: String,
        /// Role fixed by the first credentials.
        role: Role,
    },
}

/// All live sessions plus the agent and customer sets.
///
/// Every member of a role set is present in the session map, the sets are
/// disjoint, and uncredentialed sessions belong to neither.
#[derive(Debug, Default)]
pub struct Registry {
    sessions: HashMap<ConnectionId, Session>,
    agents: BTreeSet<ConnectionId>,
    customers: BTreeSet<ConnectionId>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the session for `connection`, creating it on first sight.
    pub fn session_or_insert(&mut self, connection: ConnectionId, peer: SocketAddr) -> &mut Session {
        self.sessions
            .entry(connection)
            .or_insert_with(|| Session::new(connection, peer))
    }

    /// Looks up a session.
    #[must_use]
    pub fn get(&self, connection: ConnectionId) -> Option<&Session> {
        self.sessions.get(&connection)
    }

    /// Fixes the name and role of a session and adds it to its role set.
    ///
    /// # Errors
    ///
    /// Fails when the session does not exist or is already credentialed; the
    /// registry is left unchanged.
    pub fn credential(
        &mut self,
        connection: ConnectionId,
        username: String,
        role: Role,
    ) -> Result<(), RegistryError> {
        let session = self
            .sessions
            .get_mut(&connection)
            .ok_or(RegistryError::UnknownConnection(connection))?;
        session
            .credential(username, role)
            .map_err(|existing| RegistryError::AlreadyCredentialed {
                connection,
                username: existing.username().to_owned(),
                role: existing.role(),
            })?;
        match role {
            Role::Agent => self.agents.insert(connection),
            Role::Customer => self.customers.insert(connection),
        };
        Ok(())
    }

    /// Removes a session from the table and from both role sets.
    pub fn remove(&mut self, connection: ConnectionId) -> Option<Session> {
        self.agents.remove(&connection);
        self.customers.remove(&connection);
        self.sessions.remove(&connection)
    }

    /// Finds the earliest-accepted credentialed session named `username`.
    #[must_use]
    pub fn find_by_name(&self, username: &str) -> Option<ConnectionId> {
        self.agents
            .iter()
            .chain(self.customers.iter())
            .copied()
            .filter(|connection| {
                self.sessions
                    .get(connection)
                    .and_then(Session::username)
                    .is_some_and(|name| name == username)
            })
            .min()
    }

    /// Agents in acceptance order.
    pub fn agents(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.agents.iter().copied()
    }

    /// Customers in acceptance order.
    pub fn customers(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.customers.iter().copied()
    }

    /// Credentialed customer sessions in acceptance order.
    pub fn customer_sessions(&self) -> impl Iterator<Item = &Session> + '_ {
        self.customers
            .iter()
            .filter_map(|connection| self.sessions.get(connection))
    }

    /// Number of agents.
    #[must_use]
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Number of customers.
    #[must_use]
    pub fn customer_count(&self) -> usize {
        self.customers.len()
    }

    /// Number of live sessions, credentialed or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` when no session is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
