//! The `client` module is the PuSu client: a connection to the server, the
//! single acknowledgment wait slot, the channel subscriber map, and the
//! background task that routes inbound frames.

mod pending;
pub mod pubsub_client;
mod receiver;
mod subscribers;

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub use pubsub_client::{Client, ClientConfig, DEFAULT_TIMEOUT};
pub use subscribers::SubscribeCallback;

use pending::PendingSlot;
use subscribers::Subscribers;

/// State touched by both the caller's task and the receive task.
#[derive(Default)]
struct Shared {
    subscribers: Subscribers,
    pending: Arc<PendingSlot>,
    connected: AtomicBool,
}
