//! Test harness utilities shared by unit and behavioural suites.

mod client;
mod config_loader;
mod outbox;
mod relay_world;
mod reporter;
mod routing_world;
mod world;

pub use client::TestClient;
pub use config_loader::{FailingConfigLoader, TestConfigLoader};
pub use outbox::{OutboxRecord, RecordingOutbox};
pub use relay_world::RelayWorld;
pub use reporter::{HealthEvent, RecordingHealthReporter};
pub use routing_world::RoutingWorld;
pub use world::{TestWorld, world};
