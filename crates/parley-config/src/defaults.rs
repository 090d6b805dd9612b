use crate::listen::ListenEndpoint;

/// Default host the relay binds when none is configured.
pub const DEFAULT_HOST: &str = "localhost";

/// Default TCP port for the relay.
pub const DEFAULT_PORT: u16 = 4445;

/// Default log filter expression used by the daemon.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Size of the buffer the reactor reads socket data into.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 8192;

/// Default log filter expression used by the daemon.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the daemon.
#[must_use]
pub fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Json
}

/// Default endpoint the relay listens on.
#[must_use]
pub fn default_listen_endpoint() -> ListenEndpoint {
    ListenEndpoint::new(DEFAULT_HOST, DEFAULT_PORT)
}

/// Default reactor read buffer size.
#[must_use]
pub const fn default_read_buffer_size() -> usize {
    DEFAULT_READ_BUFFER_SIZE
}
