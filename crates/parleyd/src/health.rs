//! Structured health reporting for daemon lifecycle events.

use std::net::SocketAddr;
use std::sync::Arc;

use parley_config::Config;

use crate::bootstrap::BootstrapError;
use crate::reactor::ReactorError;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked once the relay accepts connections.
    fn relay_listening(&self, address: SocketAddr);

    /// Invoked when the relay cannot start or stops with an error.
    fn relay_failed(&self, error: &ReactorError);

    /// Invoked after the relay threads have exited.
    fn relay_stopped(&self);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn relay_listening(&self, address: SocketAddr) {
        (**self).relay_listening(address);
    }

    fn relay_failed(&self, error: &ReactorError) {
        (**self).relay_failed(error);
    }

    fn relay_stopped(&self) {
        (**self).relay_stopped();
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "starting relay bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            listen = %config.listen(),
            log_filter = %config.log_filter(),
            log_format = ?config.log_format(),
            read_buffer_size = config.read_buffer_size(),
            "relay bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "relay bootstrap failed"
        );
    }

    fn relay_listening(&self, address: SocketAddr) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "relay_listening",
            %address,
            "relay accepting connections"
        );
    }

    fn relay_failed(&self, error: &ReactorError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "relay_failed",
            error = %error,
            "relay failed"
        );
    }

    fn relay_stopped(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "relay_stopped",
            "relay stopped"
        );
    }
}
