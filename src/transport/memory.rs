//! In-memory transport
//!
//! A [`MemoryConnector`] hands out one connection backed by unbounded tokio
//! channels. The matching [`ServerEnd`] plays the server: it sees every frame
//! the client writes and can push frames back, which makes it the simulated
//! server for tests and local demos.

use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::{Connector, FrameReader, FrameWriter, TransportError};
use crate::protocol::{self, Message};

pub struct MemoryConnector {
    halves: Mutex<Option<(MemoryWriter, MemoryReader)>>,
    refuse: bool,
}

impl MemoryConnector {
    /// Creates a connector and the server side of its single connection.
    pub fn pair() -> (Self, ServerEnd) {
        let (to_server, from_client) = mpsc::unbounded_channel();
        let (to_client, from_server) = mpsc::unbounded_channel();

        let connector = Self {
            halves: Mutex::new(Some((
                MemoryWriter {
                    sender: Some(to_server),
                },
                MemoryReader {
                    receiver: from_server,
                },
            ))),
            refuse: false,
        };
        let server = ServerEnd {
            sender: Some(to_client),
            receiver: from_client,
        };

        (connector, server)
    }

    /// A connector whose every `open` fails.
    pub fn unreachable() -> Self {
        Self {
            halves: Mutex::new(None),
            refuse: true,
        }
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    type Writer = MemoryWriter;
    type Reader = MemoryReader;

    async fn open(&self, address: &str) -> Result<(Self::Writer, Self::Reader), TransportError> {
        let halves = if self.refuse {
            None
        } else {
            self.halves.lock().ok().and_then(|mut halves| halves.take())
        };

        halves.ok_or_else(|| TransportError::Connect {
            address: address.to_string(),
            reason: "connection refused".to_string(),
        })
    }
}

pub struct MemoryWriter {
    sender: Option<UnboundedSender<String>>,
}

#[async_trait]
impl FrameWriter for MemoryWriter {
    async fn send_frame(&mut self, frame: String) -> Result<(), TransportError> {
        let sender = self.sender.as_ref().ok_or(TransportError::Closed)?;
        sender.send(frame).map_err(|_| TransportError::Closed)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.sender = None;
        Ok(())
    }
}

pub struct MemoryReader {
    receiver: UnboundedReceiver<String>,
}

#[async_trait]
impl FrameReader for MemoryReader {
    async fn next_frame(&mut self) -> Result<String, TransportError> {
        self.receiver.recv().await.ok_or(TransportError::Closed)
    }
}

/// The server side of an in-memory connection.
pub struct ServerEnd {
    sender: Option<UnboundedSender<String>>,
    receiver: UnboundedReceiver<String>,
}

impl ServerEnd {
    /// Pushes a message to the client.
    pub fn send(&self, message: &Message) -> Result<(), TransportError> {
        let frame = protocol::encode(message)
            .map_err(|e| TransportError::InvalidFrame(e.to_string()))?;
        self.send_raw(frame)
    }

    /// Pushes an arbitrary frame to the client, well-formed or not.
    pub fn send_raw(&self, frame: impl Into<String>) -> Result<(), TransportError> {
        let sender = self.sender.as_ref().ok_or(TransportError::Closed)?;
        sender.send(frame.into()).map_err(|_| TransportError::Closed)
    }

    /// Waits for the next frame written by the client. `None` once the client
    /// has closed its writer.
    pub async fn recv_raw(&mut self) -> Option<String> {
        self.receiver.recv().await
    }

    /// Waits for the next frame written by the client and decodes it. A frame
    /// that does not decode is reported as `None` too.
    pub async fn recv(&mut self) -> Option<Message> {
        let frame = self.recv_raw().await?;
        protocol::decode(&frame).ok()
    }

    /// Drops the server's sending half; the client's next read fails.
    pub fn disconnect(&mut self) {
        self.sender = None;
    }
}
