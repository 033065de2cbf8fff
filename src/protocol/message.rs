use std::fmt;

use serde::{Deserialize, Serialize};

/// A single PuSu protocol message.
///
/// Every frame on the wire is one JSON object tagged by its `type` field:
///
/// ```json
/// {"type":"publish","channel":"channel.1","content":"hello"}
/// ```
///
/// Unit variants carry nothing beyond the tag. Unknown fields are ignored
/// when decoding so newer servers can add fields without breaking clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    /// Sent by the server once the connection is ready.
    Hello,
    /// Claim some authorization. What it grants is up to the server's
    /// authenticator.
    Authorize { authorization: String },
    AuthorizationOk,
    /// The server usually disconnects right after sending this.
    AuthorizationFailed,
    Subscribe { channel: String },
    SubscribeOk,
    PermissionDenied,
    /// Sent in both directions.
    Publish(Publish),
    /// The server could not make sense of something we sent.
    UnknownMessageReceived,
}

/// Content published on a channel.
///
/// Missing fields decode as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publish {
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub content: String,
}

impl Publish {
    pub fn new(channel: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            content: content.into(),
        }
    }
}

impl Message {
    pub fn authorize(authorization: impl Into<String>) -> Self {
        Self::Authorize {
            authorization: authorization.into(),
        }
    }

    pub fn subscribe(channel: impl Into<String>) -> Self {
        Self::Subscribe {
            channel: channel.into(),
        }
    }

    pub fn publish(channel: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Publish(Publish::new(channel, content))
    }

    /// The discriminator this message is tagged with on the wire.
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Hello => MessageKind::Hello,
            Self::Authorize { .. } => MessageKind::Authorize,
            Self::AuthorizationOk => MessageKind::AuthorizationOk,
            Self::AuthorizationFailed => MessageKind::AuthorizationFailed,
            Self::Subscribe { .. } => MessageKind::Subscribe,
            Self::SubscribeOk => MessageKind::SubscribeOk,
            Self::PermissionDenied => MessageKind::PermissionDenied,
            Self::Publish(_) => MessageKind::Publish,
            Self::UnknownMessageReceived => MessageKind::UnknownMessageReceived,
        }
    }
}

/// The fieldless `type` of a [`Message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Hello,
    Authorize,
    AuthorizationOk,
    AuthorizationFailed,
    Subscribe,
    SubscribeOk,
    PermissionDenied,
    Publish,
    UnknownMessageReceived,
}

impl MessageKind {
    pub const ALL: [MessageKind; 9] = [
        MessageKind::Hello,
        MessageKind::Authorize,
        MessageKind::AuthorizationOk,
        MessageKind::AuthorizationFailed,
        MessageKind::Subscribe,
        MessageKind::SubscribeOk,
        MessageKind::PermissionDenied,
        MessageKind::Publish,
        MessageKind::UnknownMessageReceived,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hello => "hello",
            Self::Authorize => "authorize",
            Self::AuthorizationOk => "authorization_ok",
            Self::AuthorizationFailed => "authorization_failed",
            Self::Subscribe => "subscribe",
            Self::SubscribeOk => "subscribe_ok",
            Self::PermissionDenied => "permission_denied",
            Self::Publish => "publish",
            Self::UnknownMessageReceived => "unknown_message_received",
        }
    }

    /// Looks up the kind for a wire `type` string.
    pub fn from_wire(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
