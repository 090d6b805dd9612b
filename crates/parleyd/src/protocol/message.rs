//! Typed protocol records carried inside frame bodies.
//!
//! Bodies are UTF-8 JSON objects discriminated by a `type` field. Inbound
//! parsing is lenient about extra fields and strict about the ones each type
//! needs; outbound records are rendered with `serde_json` and then framed.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::frame::{self, FrameError};
use crate::role::{Role, RoleParseError};

/// Message sent by a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    /// Declares the sender's display name and role.
    Credentials {
        /// Display name.
        username: String,
        /// Declared role.
        role: Role,
    },
    /// Chat text; agents address a recipient with `to`.
    Chat {
        /// Message text.
        text: String,
        /// Display name of the recipient, when given.
        to: Option<String>,
    },
}

/// Errors raised while decoding a body or rendering an outbound record.
#[derive(Debug, Error)]
pub enum MessageError {
    /// The body was not a JSON object.
    #[error("body is not valid JSON: {source}")]
    Json {
        /// Underlying decoder error.
        #[source]
        source: serde_json::Error,
    },
    /// The object had no string `type` field.
    #[error("message has no type")]
    MissingType,
    /// The `type` field named an unsupported message.
    #[error("unknown message type '{0}'")]
    UnknownType(String),
    /// A field required by the message type was missing or malformed.
    #[error("invalid {kind} message: {source}")]
    InvalidField {
        /// Message type being decoded.
        kind: &'static str,
        /// Underlying decoder error.
        #[source]
        source: serde_json::Error,
    },
    /// Credentials named a role other than agent or customer.
    #[error(transparent)]
    InvalidRole(#[from] RoleParseError),
    /// Rendering an outbound record failed.
    #[error("failed to encode outbound message: {source}")]
    Encode {
        /// Underlying encoder error.
        #[source]
        source: serde_json::Error,
    },
    /// The rendered record does not fit in a frame.
    #[error(transparent)]
    Frame(#[from] FrameError),
}

#[derive(Deserialize)]
struct CredentialsBody {
    username: String,
    role: String,
}

#[derive(Deserialize)]
struct ChatBody {
    #[serde(rename = "messageText")]
    message_text: String,
    #[serde(default)]
    to: Option<String>,
}

impl InboundMessage {
    /// Decodes a complete frame body.
    ///
    /// # Errors
    ///
    /// Returns a [`MessageError`] for malformed JSON, a missing or unknown
    /// `type`, missing fields, or an unsupported role.
    pub fn parse(body: &[u8]) -> Result<Self, MessageError> {
        let value: Value =
            serde_json::from_slice(body).map_err(|source| MessageError::Json { source })?;
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(MessageError::MissingType)?
            .to_owned();

        match kind.as_str() {
            "credentials" => {
                let body: CredentialsBody = serde_json::from_value(value).map_err(|source| {
                    MessageError::InvalidField {
                        kind: "credentials",
                        source,
                    }
                })?;
                Ok(Self::Credentials {
                    role: body.role.parse()?,
                    username: body.username,
                })
            }
            "message" => {
                let body: ChatBody =
                    serde_json::from_value(value).map_err(|source| MessageError::InvalidField {
                        kind: "message",
                        source,
                    })?;
                Ok(Self::Chat {
                    text: body.message_text,
                    to: body.to,
                })
            }
            _ => Err(MessageError::UnknownType(kind)),
        }
    }
}

/// Notification or relayed chat sent to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum OutboundMessage<'a> {
    /// A peer of interest came online.
    #[serde(rename = "connected")]
    Connected {
        /// Display name of the peer.
        username: &'a str,
        /// Role of the peer.
        role: Role,
    },
    /// A customer went away.
    #[serde(rename = "disconnected")]
    Disconnected {
        /// Display name of the departed customer.
        username: &'a str,
    },
    /// The last agent left.
    NoAgentsPresent,
    /// At least one agent is available.
    AgentsPresent,
    /// Chat from a customer, delivered to agents.
    #[serde(rename = "customerMessage")]
    CustomerMessage {
        /// Customer display name.
        sender: &'a str,
        /// Message text.
        #[serde(rename = "messageText")]
        message_text: &'a str,
    },
    /// Chat from an agent, delivered to its target and the other agents.
    #[serde(rename = "agentMessage")]
    AgentMessage {
        /// Agent display name.
        sender: &'a str,
        /// Recipient display name.
        to: &'a str,
        /// Message text.
        #[serde(rename = "messageText")]
        message_text: &'a str,
    },
}

impl OutboundMessage<'_> {
    /// Renders the record as a wire frame.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::Frame`] when the JSON body exceeds the frame
    /// limit.
    pub fn to_frame(&self) -> Result<Vec<u8>, MessageError> {
        let body = serde_json::to_vec(self).map_err(|source| MessageError::Encode { source })?;
        Ok(frame::encode(&body)?)
    }
}
