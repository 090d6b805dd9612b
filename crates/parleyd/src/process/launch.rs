//! Runs the relay in the foreground until a shutdown signal arrives.

use std::sync::Arc;

use tracing::info;

use crate::bootstrap::{ConfigLoader, SystemConfigLoader, bootstrap_with};
use crate::health::{HealthReporter, StructuredHealthReporter};

use super::PROCESS_TARGET;
use super::errors::LaunchError;
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};

/// Runs the relay using the production collaborators.
///
/// # Errors
///
/// Returns a [`LaunchError`] when bootstrap fails, the listener cannot be
/// bound, signal handlers cannot be installed, or a relay thread fails.
pub fn run_daemon() -> Result<(), LaunchError> {
    run_daemon_with(
        &SystemConfigLoader,
        Arc::new(StructuredHealthReporter::new()),
        &SystemShutdownSignal,
    )
}

/// Runs the relay with injected collaborators.
pub(crate) fn run_daemon_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    shutdown: &dyn ShutdownSignal,
) -> Result<(), LaunchError> {
    let daemon = bootstrap_with(loader, Arc::clone(&reporter))?;
    let server = daemon.start_relay()?;
    info!(
        target: PROCESS_TARGET,
        address = %server.local_addr(),
        "relay running; waiting for shutdown signal"
    );

    let waited = shutdown.wait();
    server.shutdown();
    let joined = server.join();
    if let Err(error) = &joined {
        reporter.relay_failed(error);
    }
    waited?;
    joined?;

    reporter.relay_stopped();
    info!(target: PROCESS_TARGET, "shutdown sequence completed");
    Ok(())
}
