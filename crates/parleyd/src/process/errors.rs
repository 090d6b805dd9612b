//! Error surface for launching and supervising the relay process.

use thiserror::Error;

use crate::bootstrap::BootstrapError;
use crate::reactor::ReactorError;

use super::shutdown::ShutdownError;

/// Errors surfaced while launching or supervising the relay.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Bootstrapping the daemon failed.
    #[error("relay bootstrap failed: {source}")]
    Bootstrap {
        /// Underlying bootstrap error.
        #[source]
        source: BootstrapError,
    },
    /// The relay failed to start or stopped with an error.
    #[error("relay failed: {source}")]
    Relay {
        /// Underlying reactor error.
        #[source]
        source: ReactorError,
    },
    /// Waiting for shutdown failed.
    #[error("failed to await shutdown signal: {source}")]
    Shutdown {
        /// Underlying shutdown error.
        #[source]
        source: ShutdownError,
    },
}

impl From<BootstrapError> for LaunchError {
    fn from(source: BootstrapError) -> Self {
        Self::Bootstrap { source }
    }
}

impl From<ReactorError> for LaunchError {
    fn from(source: ReactorError) -> Self {
        Self::Relay { source }
    }
}

impl From<ShutdownError> for LaunchError {
    fn from(source: ShutdownError) -> Self {
        Self::Shutdown { source }
    }
}
