//! Shared configuration for the Parley chat relay.
//!
//! Configuration is layered in the usual order: built-in defaults, then a TOML
//! file (`--config-path` or `PARLEY_CONFIG_PATH`), then `PARLEY_*` environment
//! variables, then command-line flags. The daemon only needs four settings:
//! where to listen, how to filter and format logs, and how large a buffer the
//! reactor reads socket data into.

use std::ffi::OsString;
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};

mod defaults;
mod listen;
mod logging;

pub use defaults::{
    DEFAULT_HOST, DEFAULT_LOG_FILTER, DEFAULT_PORT, DEFAULT_READ_BUFFER_SIZE,
    default_listen_endpoint, default_log_filter, default_log_filter_string, default_log_format,
    default_read_buffer_size,
};
pub use listen::{ListenEndpoint, ListenParseError};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved relay configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, OrthoConfig)]
#[ortho_config(prefix = "PARLEY")]
pub struct Config {
    /// Endpoint the relay accepts client connections on.
    #[serde(default = "default_listen_endpoint")]
    #[ortho_config(default = default_listen_endpoint())]
    pub listen: ListenEndpoint,
    /// `tracing` filter expression applied to daemon logs.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format for daemon logs.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Bytes read from a socket per readiness event.
    #[serde(default = "default_read_buffer_size")]
    #[ortho_config(default = DEFAULT_READ_BUFFER_SIZE)]
    pub read_buffer_size: usize,
}

impl Config {
    /// Loads the layered configuration using the process arguments.
    ///
    /// # Errors
    ///
    /// Returns the loader error when a file, environment variable, or flag
    /// fails to parse.
    pub fn load() -> Result<Self, Arc<OrthoError>> {
        <Self as OrthoConfig>::load()
    }

    /// Loads the layered configuration using `args` as the command line.
    ///
    /// # Errors
    ///
    /// Returns the loader error when a file, environment variable, or flag
    /// fails to parse.
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, Arc<OrthoError>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as OrthoConfig>::load_from_iter(args)
    }

    /// Endpoint the relay listens on.
    #[must_use]
    pub fn listen(&self) -> &ListenEndpoint {
        &self.listen
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Reactor read buffer size, never smaller than one byte.
    #[must_use]
    pub fn read_buffer_size(&self) -> usize {
        self.read_buffer_size.max(1)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: default_listen_endpoint(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            read_buffer_size: default_read_buffer_size(),
        }
    }
}
