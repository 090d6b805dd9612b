//! Outbox double that records frames instead of writing to sockets.

use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::outbox::Outbox;
use crate::protocol::LENGTH_PREFIX_LEN;
use crate::session::ConnectionId;

/// Request captured by [`RecordingOutbox`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboxRecord {
    /// A frame queued for a connection.
    Sent(ConnectionId, Vec<u8>),
    /// A close request.
    Closed(ConnectionId),
}

/// Cloneable outbox whose clones share one log.
#[derive(Debug, Clone, Default)]
pub struct RecordingOutbox {
    records: Arc<Mutex<Vec<OutboxRecord>>>,
}

impl RecordingOutbox {
    /// Snapshot of everything recorded so far.
    pub fn records(&self) -> Vec<OutboxRecord> {
        self.records.lock().expect("outbox mutex poisoned").clone()
    }

    /// Forgets everything recorded so far.
    pub fn clear(&self) {
        self.records.lock().expect("outbox mutex poisoned").clear();
    }

    /// Decoded JSON bodies sent to `connection`, in order.
    pub fn messages_for(&self, connection: ConnectionId) -> Vec<Value> {
        self.records()
            .into_iter()
            .filter_map(|record| match record {
                OutboxRecord::Sent(to, frame) if to == connection => Some(decode(&frame)),
                _ => None,
            })
            .collect()
    }

    /// `type` fields of the messages sent to `connection`, in order.
    pub fn types_for(&self, connection: ConnectionId) -> Vec<String> {
        self.messages_for(connection)
            .iter()
            .map(|message| {
                message["type"]
                    .as_str()
                    .expect("outbound message has a type")
                    .to_owned()
            })
            .collect()
    }

    /// Connections that were asked to close.
    pub fn closed(&self) -> Vec<ConnectionId> {
        self.records()
            .into_iter()
            .filter_map(|record| match record {
                OutboxRecord::Closed(connection) => Some(connection),
                OutboxRecord::Sent(..) => None,
            })
            .collect()
    }
}

impl Outbox for RecordingOutbox {
    fn send(&self, connection: ConnectionId, frame: Vec<u8>) {
        self.records
            .lock()
            .expect("outbox mutex poisoned")
            .push(OutboxRecord::Sent(connection, frame));
    }

    fn close(&self, connection: ConnectionId) {
        self.records
            .lock()
            .expect("outbox mutex poisoned")
            .push(OutboxRecord::Closed(connection));
    }
}

/// Strips the length prefix from `frame` and parses the JSON body.
fn decode(frame: &[u8]) -> Value {
    let (prefix, body) = frame.split_at(LENGTH_PREFIX_LEN);
    let declared: usize = std::str::from_utf8(prefix)
        .expect("ascii prefix")
        .parse()
        .expect("decimal prefix");
    assert_eq!(declared, body.len(), "prefix must match body length");
    serde_json::from_slice(body).expect("json body")
}
