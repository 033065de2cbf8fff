//! The receive task.
//!
//! One per connection. It owns the [`FrameReader`] and handles frames
//! strictly in arrival order: first the pending acknowledgment, then
//! `publish` routing. A read error ends the task; reconnecting is up to the
//! caller.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::Ordering;

use tracing::{debug, error, warn};

use super::Shared;
use crate::protocol::{self, FrameType, Message, MessageKind};
use crate::transport::{FrameReader, TransportError};

pub(super) async fn receive_loop<R: FrameReader>(mut reader: R, shared: Arc<Shared>) {
    loop {
        match reader.next_frame().await {
            Ok(frame) => dispatch(&shared, &frame),
            Err(TransportError::InvalidFrame(reason)) => {
                warn!("Dropping frame: {reason}");
            }
            Err(e) => {
                shared.connected.store(false, Ordering::SeqCst);
                warn!("Disconnected from server: {e}");
                return;
            }
        }
    }
}

fn dispatch(shared: &Shared, frame: &str) {
    debug!("<- {frame}");

    let kind = match protocol::peek_type(frame) {
        Ok(FrameType::Known(kind)) => kind,
        Ok(FrameType::Unrecognized(kind)) => {
            debug!("Ignoring message of unrecognized type {kind:?}");
            return;
        }
        Err(e) => {
            warn!("Dropping frame: {e} | {}", snippet(frame));
            return;
        }
    };

    if !shared.pending.satisfy(kind) {
        if let Some(expected) = shared.pending.expected() {
            debug!("Got {kind} while waiting for {expected}");
        }
    }

    if kind == MessageKind::Publish {
        deliver(shared, frame);
    }
}

fn deliver(shared: &Shared, frame: &str) {
    let publish = match protocol::decode(frame) {
        Ok(Message::Publish(publish)) => publish,
        Ok(other) => {
            warn!("Expected publish, decoded {}", other.kind());
            return;
        }
        Err(e) => {
            warn!("Dropping publish: {e} | {}", snippet(frame));
            return;
        }
    };

    match shared.subscribers.get(&publish.channel) {
        Some(callback) => {
            if panic::catch_unwind(AssertUnwindSafe(|| callback(&publish))).is_err() {
                error!("Subscriber for channel {} panicked", publish.channel);
            }
        }
        None => debug!("No subscriber for channel {}", publish.channel),
    }
}

fn snippet(frame: &str) -> String {
    frame.chars().take(100).collect()
}
