//! Connection roles declared by clients in their credentials.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Role a credentialed connection plays in the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Support staff; sees every customer and every agent conversation.
    Agent,
    /// End user; talks to whichever agents are present.
    Customer,
}

impl fmt::Display for Role {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Agent => "agent",
            Self::Customer => "customer",
        };
        formatter.write_str(label)
    }
}

/// Error returned when a credentials message names an unknown role.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsupported role: {0}")]
pub struct RoleParseError(String);

impl RoleParseError {
    /// Creates a parse error describing the unsupported value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the offending value.
    #[must_use]
    pub fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "agent" => Ok(Self::Agent),
            "customer" => Ok(Self::Customer),
            _ => Err(RoleParseError::new(value)),
        }
    }
}
