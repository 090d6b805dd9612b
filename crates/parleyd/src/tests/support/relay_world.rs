//! End-to-end world: a real relay on a loopback port and named TCP clients.

use std::collections::HashMap;
use std::thread;
use std::time::Duration;

use serde_json::Value;

use crate::server::RelayServer;

use super::client::TestClient;
use super::config_loader::TestConfigLoader;

/// Time allowed for the worker to process a message that produces no reply.
const SETTLE: Duration = Duration::from_millis(100);

/// Scenario world for the TCP relay.
pub struct RelayWorld {
    server: Option<RelayServer>,
    clients: HashMap<String, TestClient>,
}

impl RelayWorld {
    /// Builds a world with no relay running.
    #[must_use]
    pub fn new() -> Self {
        Self {
            server: None,
            clients: HashMap::new(),
        }
    }

    /// Starts a relay on an ephemeral loopback port.
    pub fn start(&mut self) {
        let config = TestConfigLoader::config();
        let server = RelayServer::start(config.listen(), config.read_buffer_size())
            .expect("relay should start");
        self.server = Some(server);
    }

    /// Connects `name` and sends its credentials.
    pub fn join(&mut self, name: &str, role: &str) {
        let address = self
            .server
            .as_ref()
            .expect("relay should be running")
            .local_addr();
        let mut client = TestClient::connect(address);
        client.send_credentials(name, role);
        self.clients.insert(name.to_owned(), client);
        thread::sleep(SETTLE);
    }

    /// Mutable access to a named client.
    pub fn client(&mut self, name: &str) -> &mut TestClient {
        self.clients
            .get_mut(name)
            .unwrap_or_else(|| panic!("no client named {name}"))
    }

    /// Next message delivered to `name`.
    pub fn next_message(&mut self, name: &str) -> Value {
        self.client(name).next_message()
    }

    /// Lets the relay catch up after an action that produces no reply.
    pub fn settle(&self) {
        thread::sleep(SETTLE);
    }

    /// Stops the relay and waits for its threads.
    pub fn stop(&mut self) {
        if let Some(server) = self.server.take() {
            server.shutdown();
            server.join().expect("relay threads should exit cleanly");
        }
    }
}

impl Default for RelayWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RelayWorld {
    fn drop(&mut self) {
        let Some(server) = self.server.take() else {
            return;
        };
        server.shutdown();
        let joined = server.join();
        if !thread::panicking() {
            joined.expect("relay threads should exit cleanly");
        }
    }
}
