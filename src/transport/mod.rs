//! The `transport` module carries text frames between the client and a PuSu
//! server.
//!
//! The client never touches sockets directly. It asks a [`Connector`] for a
//! connected pair of halves: a [`FrameWriter`] used by the caller's task and a
//! [`FrameReader`] owned by the background receive task. Frame boundaries are
//! resolved by the transport, one logical message per frame.

pub mod memory;
pub mod websocket;

use async_trait::async_trait;

pub use memory::{MemoryConnector, ServerEnd};
pub use websocket::{WebSocketConnector, server_url};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to connect to {address}: {reason}")]
    Connect { address: String, reason: String },

    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    #[error("connection closed")]
    Closed,
}

/// Opens connections to a server address.
#[async_trait]
pub trait Connector: Send + Sync {
    type Writer: FrameWriter + 'static;
    type Reader: FrameReader + 'static;

    async fn open(&self, address: &str) -> Result<(Self::Writer, Self::Reader), TransportError>;
}

/// The sending half of a connection.
#[async_trait]
pub trait FrameWriter: Send {
    async fn send_frame(&mut self, frame: String) -> Result<(), TransportError>;

    /// Releases the connection. Called at most once by the client.
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// The receiving half of a connection.
#[async_trait]
pub trait FrameReader: Send {
    /// Waits for the next text frame. `InvalidFrame` drops that one frame;
    /// any other error ends the connection.
    async fn next_frame(&mut self) -> Result<String, TransportError>;
}

#[cfg(test)]
mod websocket_tests;
