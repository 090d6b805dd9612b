//! Foreground process lifecycle: bootstrap, serve, and stop on a signal.

mod errors;
mod launch;
pub(crate) mod shutdown;

pub use shutdown::{ShutdownError, ShutdownSignal, SystemShutdownSignal};

pub use errors::LaunchError;
pub use launch::run_daemon;
#[cfg(test)]
pub(crate) use launch::run_daemon_with;

pub(crate) const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");
