//! The single outstanding acknowledgment wait.
//!
//! A caller arms the slot with the message kind it expects, then awaits the
//! returned [`PendingAck`]. The receive task calls [`PendingSlot::satisfy`]
//! for every frame; a matching kind takes the waiter out of the slot and
//! wakes it. Arming an occupied slot is an error rather than a silent
//! overwrite.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::debug;

use crate::protocol::MessageKind;
use crate::utils::error::{Error, Result};

struct Waiter {
    id: u64,
    expected: MessageKind,
    notify: oneshot::Sender<()>,
}

#[derive(Default)]
pub(crate) struct PendingSlot {
    waiter: Mutex<Option<Waiter>>,
    next_id: AtomicU64,
}

impl PendingSlot {
    pub(crate) fn arm(self: &Arc<Self>, expected: MessageKind) -> Result<PendingAck> {
        let mut waiter = self.lock();
        if let Some(current) = waiter.as_ref() {
            return Err(Error::WaitInProgress(current.expected));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (notify, signal) = oneshot::channel();
        *waiter = Some(Waiter {
            id,
            expected,
            notify,
        });

        Ok(PendingAck {
            slot: Arc::clone(self),
            id,
            expected,
            signal,
        })
    }

    /// Wakes the armed waiter if it expects `kind`. Returns whether it did.
    pub(crate) fn satisfy(&self, kind: MessageKind) -> bool {
        let mut waiter = self.lock();
        match waiter.take() {
            Some(current) if current.expected == kind => {
                // The receiver is gone only if the wait was dropped mid-flight.
                let _ = current.notify.send(());
                true
            }
            other => {
                *waiter = other;
                false
            }
        }
    }

    pub(crate) fn expected(&self) -> Option<MessageKind> {
        self.lock().as_ref().map(|waiter| waiter.expected)
    }

    fn release(&self, id: u64) {
        let mut waiter = self.lock();
        if waiter.as_ref().is_some_and(|current| current.id == id) {
            *waiter = None;
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Waiter>> {
        self.waiter.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// An armed wait. Dropping it, awaited or not, frees the slot.
pub(crate) struct PendingAck {
    slot: Arc<PendingSlot>,
    id: u64,
    expected: MessageKind,
    signal: oneshot::Receiver<()>,
}

impl PendingAck {
    pub(crate) async fn wait(mut self, timeout: Duration) -> Result<()> {
        debug!("Waiting for {}", self.expected);

        match tokio::time::timeout(timeout, &mut self.signal).await {
            Ok(Ok(())) => {
                debug!("Got {}", self.expected);
                Ok(())
            }
            // The sender is only dropped unsent by release(), which runs when this wait drops.
            Ok(Err(_)) => Err(Error::Closed),
            Err(_) => Err(Error::TimeoutExceeded {
                expected: self.expected,
                timeout,
            }),
        }
    }
}

impl Drop for PendingAck {
    fn drop(&mut self) {
        self.slot.release(self.id);
    }
}
