//! Configuration loaders for scenarios covering success and failure paths.

use std::ffi::OsString;
use std::sync::Arc;

use ortho_config::OrthoError;
use parley_config::{Config, ListenEndpoint};

use crate::bootstrap::ConfigLoader;

/// Loader that listens on an ephemeral loopback port.
#[derive(Debug, Default, Clone, Copy)]
pub struct TestConfigLoader;

impl TestConfigLoader {
    /// Configuration every test relay runs with.
    #[must_use]
    pub fn config() -> Config {
        Config {
            listen: ListenEndpoint::new("127.0.0.1", 0),
            read_buffer_size: 64,
            ..Config::default()
        }
    }
}

impl ConfigLoader for TestConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(Self::config())
    }
}

/// Loader that intentionally fails by passing an invalid listen endpoint.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("parleyd"),
            OsString::from("--listen"),
            OsString::from("unix:///tmp/parley.sock"),
        ];
        Config::load_from_iter(args)
    }
}
