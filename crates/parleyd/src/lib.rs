//! Parley chat relay daemon.
//!
//! Clients connect over TCP and exchange length-prefixed JSON records. Each
//! connection declares itself an agent or a customer; the relay then fans
//! messages out according to role: customers reach every agent, agents reach
//! a named recipient while the other agents observe.
//!
//! Two threads do the work. The reactor ([`reactor`]) owns every socket and
//! multiplexes them with `mio`; the worker ([`worker`]) owns the sessions,
//! reassembles frames, and routes. They meet at a FIFO dispatch queue in one
//! direction and at the [`Outbox`] seam in the other.

mod bootstrap;
mod health;
mod outbox;
mod process;
pub mod protocol;
pub mod reactor;
mod registry;
mod role;
mod router;
mod server;
mod session;
pub mod telemetry;
pub mod worker;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Daemon, StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use outbox::Outbox;
pub use process::{LaunchError, ShutdownError, ShutdownSignal, SystemShutdownSignal, run_daemon};
pub use registry::{Registry, RegistryError};
pub use role::{Role, RoleParseError};
pub use router::Router;
pub use server::RelayServer;
pub use session::{ConnectionId, Identity, Session};
pub use telemetry::{TelemetryError, TelemetryHandle};

#[cfg(test)]
mod tests;
