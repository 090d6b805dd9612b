//! Running relay: reactor and worker threads plus the handle that stops them.

use std::net::SocketAddr;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use parley_config::ListenEndpoint;

use crate::reactor::{Reactor, ReactorError, ReactorHandle};
use crate::worker::Worker;

const REACTOR_THREAD: &str = "parley-reactor";
const WORKER_THREAD: &str = "parley-worker";

/// Handle to a running relay.
///
/// Dropping the handle requests shutdown without waiting for the threads.
pub struct RelayServer {
    handle: ReactorHandle,
    local_addr: SocketAddr,
    reactor: Option<JoinHandle<Result<(), ReactorError>>>,
    worker: Option<JoinHandle<()>>,
}

impl RelayServer {
    /// Binds `endpoint` and starts the reactor and worker threads.
    ///
    /// # Errors
    ///
    /// Returns a [`ReactorError`] when binding fails or a thread cannot be
    /// spawned.
    pub fn start(endpoint: &ListenEndpoint, read_buffer_size: usize) -> Result<Self, ReactorError> {
        let (sender, receiver) = mpsc::channel();
        let (reactor, handle) = Reactor::bind(endpoint, read_buffer_size, sender)?;
        let local_addr = reactor.local_addr();

        let outbox = handle.clone();
        let worker = thread::Builder::new()
            .name(WORKER_THREAD.to_owned())
            .spawn(move || Worker::new(outbox).run(receiver))
            .map_err(|source| ReactorError::Spawn {
                thread: WORKER_THREAD,
                source,
            })?;
        let reactor = thread::Builder::new()
            .name(REACTOR_THREAD.to_owned())
            .spawn(move || reactor.run())
            .map_err(|source| ReactorError::Spawn {
                thread: REACTOR_THREAD,
                source,
            })?;

        Ok(Self {
            handle,
            local_addr,
            reactor: Some(reactor),
            worker: Some(worker),
        })
    }

    /// Address the relay accepts connections on.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Asks the reactor to stop. The worker follows once it has drained the
    /// events already queued.
    pub fn shutdown(&self) {
        self.handle.shutdown();
    }

    /// Waits for both threads to finish.
    ///
    /// # Errors
    ///
    /// Returns the reactor's own error, or [`ReactorError::ThreadPanic`] when
    /// either thread panicked.
    pub fn join(mut self) -> Result<(), ReactorError> {
        let reactor = match self.reactor.take() {
            Some(handle) => handle.join().map_err(|_| ReactorError::ThreadPanic {
                thread: REACTOR_THREAD,
            })?,
            None => Ok(()),
        };
        if let Some(handle) = self.worker.take() {
            handle.join().map_err(|_| ReactorError::ThreadPanic {
                thread: WORKER_THREAD,
            })?;
        }
        reactor
    }
}

impl Drop for RelayServer {
    fn drop(&mut self) {
        self.handle.shutdown();
    }
}
