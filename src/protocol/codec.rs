//! Text frame encoding for [`Message`].
//!
//! One JSON object per frame. Routing only ever needs the `type` field, so
//! [`peek_type`] reads just that and leaves the rest of the frame alone.

use serde::Deserialize;

use super::message::{Message, MessageKind};

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Not JSON, no string `type` field, an unknown `type`, or a required
    /// field of the wrong shape.
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Result of peeking at a frame's `type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameType {
    Known(MessageKind),
    /// A well-formed frame whose `type` this client does not know.
    Unrecognized(String),
}

impl FrameType {
    pub fn kind(&self) -> Option<MessageKind> {
        match self {
            Self::Known(kind) => Some(*kind),
            Self::Unrecognized(_) => None,
        }
    }
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
}

pub fn encode(message: &Message) -> Result<String, CodecError> {
    Ok(serde_json::to_string(message)?)
}

pub fn decode(frame: &str) -> Result<Message, CodecError> {
    Ok(serde_json::from_str(frame)?)
}

pub fn peek_type(frame: &str) -> Result<FrameType, CodecError> {
    let envelope: Envelope = serde_json::from_str(frame)?;
    Ok(match MessageKind::from_wire(&envelope.kind) {
        Some(kind) => FrameType::Known(kind),
        None => FrameType::Unrecognized(envelope.kind),
    })
}
