//! The `protocol` module defines the messages exchanged with a PuSu server
//! and how they map to and from text frames.

pub mod codec;
pub mod message;

pub use codec::{CodecError, FrameType, decode, encode, peek_type};
pub use message::{Message, MessageKind, Publish};
