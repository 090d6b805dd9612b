//! Readiness-based socket loop.
//!
//! A single thread owns the listening socket and every accepted connection.
//! Other threads never touch sockets: they queue frames and close requests
//! through a [`ReactorHandle`], and the loop applies those requests right
//! before each wait. Readiness is edge-triggered, so reads and writes continue
//! until the socket reports `WouldBlock`.

mod errors;
mod handle;

use std::collections::{HashMap, VecDeque};
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener as StdTcpListener, ToSocketAddrs};
use std::sync::Arc;
use std::sync::mpsc::Sender;

use mio::net::{TcpListener, TcpStream};
use mio::{Events, Interest, Poll, Token, Waker};
use tracing::{debug, info, warn};

use parley_config::ListenEndpoint;

use crate::session::ConnectionId;
use crate::worker::DispatchEvent;

pub use self::errors::ReactorError;
pub use self::handle::ReactorHandle;
use self::handle::{ChangeRequest, Shared};

pub(crate) const REACTOR_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::reactor");

const LISTENER: Token = Token(0);
const WAKER: Token = Token(1);
const FIRST_CONNECTION: usize = 2;
const EVENT_CAPACITY: usize = 1024;

#[derive(Debug)]
struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
}

/// Outcome of draining a connection's pending writes.
enum Flush {
    /// More bytes remain; wait for the next writable edge.
    Pending,
    /// The queue is empty.
    Drained,
    /// The socket failed and must be closed.
    Failed(io::Error),
}

/// The socket loop and everything it owns.
pub struct Reactor {
    poll: Poll,
    listener: TcpListener,
    local_addr: SocketAddr,
    connections: HashMap<ConnectionId, Connection>,
    next_connection: usize,
    buffer: Vec<u8>,
    shared: Arc<Shared>,
    events: Sender<DispatchEvent>,
}

impl Reactor {
    /// Binds `endpoint` and prepares the loop.
    ///
    /// Read events are delivered to `events`; dropping the reactor drops the
    /// sender, which lets the worker drain and exit.
    ///
    /// # Errors
    ///
    /// Fails when the endpoint cannot be resolved or bound, or when the poll
    /// instance cannot be created.
    pub fn bind(
        endpoint: &ListenEndpoint,
        read_buffer_size: usize,
        events: Sender<DispatchEvent>,
    ) -> Result<(Self, ReactorHandle), ReactorError> {
        let std_listener = bind_tcp(endpoint.host(), endpoint.port())?;
        std_listener
            .set_nonblocking(true)
            .map_err(|source| ReactorError::NonBlocking { source })?;
        let local_addr = std_listener
            .local_addr()
            .map_err(|source| ReactorError::LocalAddr { source })?;
        let mut listener = TcpListener::from_std(std_listener);

        let poll = Poll::new().map_err(|source| ReactorError::PollCreate { source })?;
        poll.registry()
            .register(&mut listener, LISTENER, Interest::READABLE)
            .map_err(|source| ReactorError::Register { source })?;
        let waker =
            Waker::new(poll.registry(), WAKER).map_err(|source| ReactorError::Waker { source })?;
        let shared = Arc::new(Shared::new(waker));

        let reactor = Self {
            poll,
            listener,
            local_addr,
            connections: HashMap::new(),
            next_connection: FIRST_CONNECTION,
            buffer: vec![0; read_buffer_size.max(1)],
            shared: Arc::clone(&shared),
            events,
        };
        Ok((reactor, ReactorHandle::new(shared)))
    }

    /// Address the listener is bound to.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Runs until [`ReactorHandle::shutdown`] is called.
    ///
    /// # Errors
    ///
    /// Returns [`ReactorError::Poll`] if waiting for readiness fails for a
    /// reason other than interruption.
    pub fn run(mut self) -> Result<(), ReactorError> {
        info!(
            target: REACTOR_TARGET,
            address = %self.local_addr,
            "relay listening"
        );
        let mut events = Events::with_capacity(EVENT_CAPACITY);

        while !self.shared.is_shutting_down() {
            self.apply_changes();
            if let Err(source) = self.poll.poll(&mut events, None) {
                if source.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(ReactorError::Poll { source });
            }

            for event in &events {
                match event.token() {
                    LISTENER => self.accept_all(),
                    WAKER => {}
                    token => {
                        let connection = ConnectionId::from_token(token);
                        if event.is_readable() || event.is_read_closed() || event.is_error() {
                            self.read_all(connection);
                        }
                        if event.is_writable() {
                            self.flush(connection);
                        }
                    }
                }
            }
        }

        info!(
            target: REACTOR_TARGET,
            open_connections = self.connections.len(),
            "reactor stopping"
        );
        Ok(())
    }

    fn apply_changes(&mut self) {
        for change in self.shared.take_changes() {
            match change {
                ChangeRequest::Interest(connection, interest) => {
                    self.set_interest(connection, interest);
                }
                ChangeRequest::Close(connection) => self.close(connection, "close requested"),
            }
        }
    }

    fn set_interest(&mut self, connection: ConnectionId, interest: Interest) {
        let Some(entry) = self.connections.get_mut(&connection) else {
            // Frames queued for a connection that is already gone.
            self.shared.writes().remove(&connection);
            return;
        };
        let result = self
            .poll
            .registry()
            .reregister(&mut entry.stream, connection.token(), interest);
        if let Err(error) = result {
            warn!(
                target: REACTOR_TARGET,
                %connection,
                peer = %entry.peer,
                error = %error,
                "failed to update interest"
            );
            self.close(connection, "interest update failed");
        }
    }

    fn accept_all(&mut self) {
        loop {
            match self.listener.accept() {
                Ok((mut stream, peer)) => {
                    let connection = ConnectionId::new(self.next_connection);
                    self.next_connection += 1;
                    let result = self.poll.registry().register(
                        &mut stream,
                        connection.token(),
                        Interest::READABLE,
                    );
                    if let Err(error) = result {
                        warn!(
                            target: REACTOR_TARGET,
                            %peer,
                            error = %error,
                            "failed to register connection"
                        );
                        continue;
                    }
                    info!(target: REACTOR_TARGET, %connection, %peer, "connection accepted");
                    self.connections
                        .insert(connection, Connection { stream, peer });
                }
                Err(error) if error.kind() == io::ErrorKind::WouldBlock => return,
                Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
                Err(error) => {
                    warn!(target: REACTOR_TARGET, error = %error, "socket accept error");
                    return;
                }
            }
        }
    }

    fn read_all(&mut self, connection: ConnectionId) {
        loop {
            let Some(entry) = self.connections.get_mut(&connection) else {
                return;
            };
            match entry.stream.read(&mut self.buffer) {
                Ok(0) => {
                    self.close(connection, "peer closed");
                    return;
                }
                Ok(read) => {
                    let bytes = self.buffer.get(..read).unwrap_or_default().to_vec();
                    let event = DispatchEvent::Received {
                        connection,
                        peer: entry.peer,
                        bytes,
                    };
                    if self.events.send(event).is_err() {
                        debug!(target: REACTOR_TARGET, %connection, "worker gone; dropping read");
                    }
                }
                Err(error) if error.kind() == io::ErrorKind::WouldBlock => return,
                Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
                Err(error) => {
                    debug!(target: REACTOR_TARGET, %connection, error = %error, "read failed");
                    self.close(connection, "read failed");
                    return;
                }
            }
        }
    }

    fn flush(&mut self, connection: ConnectionId) {
        let Some(entry) = self.connections.get_mut(&connection) else {
            return;
        };

        let outcome = {
            let mut writes = self.shared.writes();
            let outcome = match writes.get_mut(&connection) {
                Some(queue) => drain_queue(&mut entry.stream, queue),
                None => Flush::Drained,
            };
            if matches!(outcome, Flush::Drained) {
                writes.remove(&connection);
                // Queued under the writes lock so a concurrent send's request
                // for writable always lands after this one.
                self.shared
                    .changes()
                    .push(ChangeRequest::Interest(connection, Interest::READABLE));
            }
            outcome
        };

        if let Flush::Failed(error) = outcome {
            debug!(target: REACTOR_TARGET, %connection, error = %error, "write failed");
            self.close(connection, "write failed");
        }
    }

    /// Deregisters and drops a connection, discards its pending writes, and
    /// tells the worker. Unknown connections are ignored.
    fn close(&mut self, connection: ConnectionId, reason: &'static str) {
        let Some(mut entry) = self.connections.remove(&connection) else {
            return;
        };
        if let Err(error) = self.poll.registry().deregister(&mut entry.stream) {
            debug!(target: REACTOR_TARGET, %connection, error = %error, "deregister failed");
        }
        self.shared.writes().remove(&connection);
        info!(
            target: REACTOR_TARGET,
            %connection,
            peer = %entry.peer,
            reason,
            "connection closed"
        );
        if self.events.send(DispatchEvent::Closed { connection }).is_err() {
            debug!(target: REACTOR_TARGET, %connection, "worker gone; dropping close");
        }
    }
}

/// Writes queued frames front to back. A partial write keeps the unwritten
/// tail at the front of the queue.
fn drain_queue(stream: &mut TcpStream, queue: &mut VecDeque<Vec<u8>>) -> Flush {
    while let Some(front) = queue.front_mut() {
        match stream.write(front) {
            Ok(0) => return Flush::Failed(io::ErrorKind::WriteZero.into()),
            Ok(written) if written < front.len() => {
                front.drain(..written);
            }
            Ok(_) => {
                queue.pop_front();
            }
            Err(error) if error.kind() == io::ErrorKind::WouldBlock => return Flush::Pending,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
            Err(error) => return Flush::Failed(error),
        }
    }
    Flush::Drained
}

fn bind_tcp(host: &str, port: u16) -> Result<StdTcpListener, ReactorError> {
    let mut addrs = (host, port)
        .to_socket_addrs()
        .map_err(|source| ReactorError::Resolve {
            host: host.to_owned(),
            port,
            source,
        })?;
    let addr = addrs.next().ok_or_else(|| ReactorError::ResolveEmpty {
        host: host.to_owned(),
        port,
    })?;
    StdTcpListener::bind(addr).map_err(|source| ReactorError::BindTcp { addr, source })
}
