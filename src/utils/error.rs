//! Errors returned by the client.
//!
//! Transport and codec failures keep their own types
//! ([`TransportError`], [`CodecError`]) and are wrapped here according to
//! which operation hit them.

use std::time::Duration;

use crate::protocol::{CodecError, MessageKind};
use crate::transport::TransportError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The transport could not be opened. The client is unusable.
    #[error("connection error: {0}")]
    Connection(#[source] TransportError),

    /// No acknowledgment arrived in time. The caller may retry.
    #[error("timeout exceeded after {timeout:?} waiting for server to acknowledge with {expected}")]
    TimeoutExceeded {
        expected: MessageKind,
        timeout: Duration,
    },

    #[error(transparent)]
    MalformedMessage(#[from] CodecError),

    /// Writing a frame to the transport failed.
    #[error("write error: {0}")]
    Write(#[source] TransportError),

    /// Another acknowledgment-style call is still waiting.
    #[error("already waiting for {0}, only one acknowledgment wait may be outstanding")]
    WaitInProgress(MessageKind),

    #[error("client is closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, Error>;
