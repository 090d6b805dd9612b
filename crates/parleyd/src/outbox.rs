//! Seam between the worker and the reactor's socket primitives.

use crate::session::ConnectionId;

/// Sink for routed frames and close requests.
///
/// Both operations are fire-and-forget: requests for connections that have
/// already gone are dropped by the reactor.
#[cfg_attr(test, mockall::automock)]
pub trait Outbox: Send {
    /// Queues a complete wire frame for `connection`.
    fn send(&self, connection: ConnectionId, frame: Vec<u8>);

    /// Asks for `connection` to be closed.
    fn close(&self, connection: ConnectionId);
}
