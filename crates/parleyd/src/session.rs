//! Per-connection state owned by the worker.

use std::fmt;
use std::net::SocketAddr;

use mio::Token;

use crate::protocol::{Feed, Reassembler};
use crate::role::Role;

/// Stable identity of an accepted connection.
///
/// Minted by the reactor from a monotonically increasing counter; identifiers
/// are never reused, so a late event for a closed connection cannot reach a
/// newer one. Ordering follows acceptance order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(usize);

impl ConnectionId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(raw: usize) -> Self {
        Self(raw)
    }

    pub(crate) const fn token(self) -> Token {
        Token(self.0)
    }

    pub(crate) const fn from_token(token: Token) -> Self {
        Self(token.0)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "#{}", self.0)
    }
}

/// Name and role fixed by a connection's first valid credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    username: String,
    role: Role,
}

impl Identity {
    /// Display name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Declared role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }
}

/// Server-side state for one live connection.
#[derive(Debug)]
pub struct Session {
    connection: ConnectionId,
    peer: SocketAddr,
    identity: Option<Identity>,
    reassembler: Reassembler,
}

impl Session {
    /// Creates an uncredentialed session.
    #[must_use]
    pub fn new(connection: ConnectionId, peer: SocketAddr) -> Self {
        Self {
            connection,
            peer,
            identity: None,
            reassembler: Reassembler::new(),
        }
    }

    /// Connection identifier.
    #[must_use]
    pub const fn connection(&self) -> ConnectionId {
        self.connection
    }

    /// Remote address.
    #[must_use]
    pub const fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Name and role, once credentialed.
    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Display name, once credentialed.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.identity.as_ref().map(Identity::username)
    }

    /// Role, once credentialed.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.identity.as_ref().map(Identity::role)
    }

    /// Feeds raw socket bytes to the session's reassembler.
    pub fn feed(&mut self, bytes: &[u8]) -> Feed {
        self.reassembler.feed(bytes)
    }

    /// Returns `true` once the byte stream has failed to frame.
    #[must_use]
    pub fn is_poisoned(&self) -> bool {
        self.reassembler.is_poisoned()
    }

    /// Sets the identity. Returns the existing identity instead when one is
    /// already set.
    pub(crate) fn credential(&mut self, username: String, role: Role) -> Result<(), &Identity> {
        match self.identity {
            Some(ref existing) => Err(existing),
            None => {
                self.identity = Some(Identity { username, role });
                Ok(())
            }
        }
    }
}

/// Log label: `peer` before credentials, `peer-username` after.
impl fmt::Display for Session {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.username() {
            Some(username) => write!(formatter, "{}-{username}", self.peer),
            None => write!(formatter, "{}", self.peer),
        }
    }
}
