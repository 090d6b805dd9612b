//! Error types for the I/O reactor.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Errors surfaced while binding or running the reactor.
#[derive(Debug, Error)]
pub enum ReactorError {
    #[error("failed to resolve TCP address {host}:{port}: {source}")]
    Resolve {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },
    #[error("no TCP addresses resolved for {host}:{port}")]
    ResolveEmpty { host: String, port: u16 },
    #[error("failed to bind TCP listener at {addr}: {source}")]
    BindTcp {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("failed to enable non-blocking listener: {source}")]
    NonBlocking {
        #[source]
        source: io::Error,
    },
    #[error("failed to read listener address: {source}")]
    LocalAddr {
        #[source]
        source: io::Error,
    },
    #[error("failed to create poll instance: {source}")]
    PollCreate {
        #[source]
        source: io::Error,
    },
    #[error("failed to register listener with poll: {source}")]
    Register {
        #[source]
        source: io::Error,
    },
    #[error("failed to create reactor waker: {source}")]
    Waker {
        #[source]
        source: io::Error,
    },
    #[error("reactor wait failed: {source}")]
    Poll {
        #[source]
        source: io::Error,
    },
    #[error("failed to spawn {thread} thread: {source}")]
    Spawn {
        thread: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("{thread} thread panicked")]
    ThreadPanic { thread: &'static str },
}
