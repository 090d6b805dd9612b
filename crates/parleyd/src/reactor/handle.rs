//! Cross-thread entry points into the reactor.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use mio::{Interest, Waker};
use tracing::warn;

use super::REACTOR_TARGET;
use crate::outbox::Outbox;
use crate::session::ConnectionId;

/// Deferred mutation applied by the reactor right before it waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChangeRequest {
    /// Replace the connection's interest set.
    Interest(ConnectionId, Interest),
    /// Close the connection.
    Close(ConnectionId),
}

pub(crate) type PendingWrites = HashMap<ConnectionId, VecDeque<Vec<u8>>>;

/// State shared between the reactor thread and its handles.
///
/// Lock order is `writes` before `changes` wherever both are held.
#[derive(Debug)]
pub(crate) struct Shared {
    writes: Mutex<PendingWrites>,
    changes: Mutex<Vec<ChangeRequest>>,
    waker: Waker,
    shutdown: AtomicBool,
}

impl Shared {
    pub(crate) fn new(waker: Waker) -> Self {
        Self {
            writes: Mutex::new(HashMap::new()),
            changes: Mutex::new(Vec::new()),
            waker,
            shutdown: AtomicBool::new(false),
        }
    }

    pub(crate) fn writes(&self) -> MutexGuard<'_, PendingWrites> {
        self.writes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn changes(&self) -> MutexGuard<'_, Vec<ChangeRequest>> {
        self.changes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn take_changes(&self) -> Vec<ChangeRequest> {
        std::mem::take(&mut *self.changes())
    }

    pub(crate) fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    fn wake(&self) {
        if let Err(error) = self.waker.wake() {
            warn!(target: REACTOR_TARGET, error = %error, "failed to wake reactor");
        }
    }
}

/// Cloneable handle used by other threads to drive the reactor.
#[derive(Debug, Clone)]
pub struct ReactorHandle {
    shared: Arc<Shared>,
}

impl ReactorHandle {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// Asks the reactor loop to exit after its current iteration.
    pub fn shutdown(&self) {
        self.shared.shutdown.store(true, Ordering::SeqCst);
        self.shared.wake();
    }
}

impl Outbox for ReactorHandle {
    fn send(&self, connection: ConnectionId, frame: Vec<u8>) {
        {
            let mut writes = self.shared.writes();
            writes.entry(connection).or_default().push_back(frame);
            self.shared.changes().push(ChangeRequest::Interest(
                connection,
                Interest::READABLE | Interest::WRITABLE,
            ));
        }
        self.shared.wake();
    }

    fn close(&self, connection: ConnectionId) {
        self.shared.changes().push(ChangeRequest::Close(connection));
        self.shared.wake();
    }
}
