//! Blocking protocol client for end-to-end scenarios.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use serde_json::{Value, json};

use crate::protocol::{Reassembler, encode};

const READ_TIMEOUT: Duration = Duration::from_secs(3);

/// One client connection to a running relay.
pub struct TestClient {
    stream: TcpStream,
    reassembler: Reassembler,
    inbox: VecDeque<Value>,
}

impl TestClient {
    /// Connects to `address`.
    pub fn connect(address: SocketAddr) -> Self {
        let stream = TcpStream::connect(address).expect("connect to relay");
        stream
            .set_read_timeout(Some(READ_TIMEOUT))
            .expect("set read timeout");
        Self {
            stream,
            reassembler: Reassembler::new(),
            inbox: VecDeque::new(),
        }
    }

    /// Sends `credentials` for `username` with `role`.
    pub fn send_credentials(&mut self, username: &str, role: &str) {
        self.send_json(&json!({ "type": "credentials", "username": username, "role": role }));
    }

    /// Sends a chat message, optionally addressed.
    pub fn send_chat(&mut self, text: &str, to: Option<&str>) {
        let mut message = json!({ "type": "message", "messageText": text });
        if let Some(to) = to {
            message["to"] = Value::from(to);
        }
        self.send_json(&message);
    }

    /// Frames and sends `message` in one write.
    pub fn send_json(&mut self, message: &Value) {
        let body = serde_json::to_vec(message).expect("encode body");
        self.send_raw(&encode(&body).expect("frame body"));
    }

    /// Sends the framed `message` one byte per write.
    pub fn send_json_bytewise(&mut self, message: &Value) {
        let body = serde_json::to_vec(message).expect("encode body");
        for byte in encode(&body).expect("frame body") {
            self.send_raw(&[byte]);
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    /// Writes raw bytes.
    pub fn send_raw(&mut self, bytes: &[u8]) {
        self.stream.write_all(bytes).expect("write to relay");
        self.stream.flush().expect("flush to relay");
    }

    /// Blocks until the next complete message arrives.
    pub fn next_message(&mut self) -> Value {
        loop {
            if let Some(message) = self.inbox.pop_front() {
                return message;
            }
            let mut buffer = [0_u8; 512];
            let read = self.stream.read(&mut buffer).expect("read from relay");
            assert!(read > 0, "relay closed the connection unexpectedly");
            for body in self
                .reassembler
                .feed(buffer.get(..read).expect("read within buffer"))
                .into_result()
                .expect("relay sends valid frames")
            {
                self.inbox
                    .push_back(serde_json::from_slice(&body).expect("relay sends JSON"));
            }
        }
    }

    /// Returns `true` when the relay closes the connection before the read
    /// timeout.
    pub fn is_closed_by_relay(&mut self) -> bool {
        let mut buffer = [0_u8; 512];
        loop {
            match self.stream.read(&mut buffer) {
                Ok(0) => return true,
                Ok(_) => {}
                Err(error) if error.kind() == io::ErrorKind::ConnectionReset => return true,
                Err(_) => return false,
            }
        }
    }

    /// Closes the connection from the client side.
    pub fn hang_up(&self) {
        self.stream
            .shutdown(std::net::Shutdown::Both)
            .expect("shutdown client socket");
    }
}
