use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::protocol::Publish;

/// Callback invoked with every message published on a subscribed channel.
///
/// Runs on the receive task. Frames queue behind it until it returns, so keep
/// it short or hand the work off to another task. A panic is caught and
/// logged; the message is lost but routing carries on.
pub type SubscribeCallback = Arc<dyn Fn(&Publish) + Send + Sync>;

/// Channel name to callback, one callback per channel.
#[derive(Default)]
pub(crate) struct Subscribers {
    callbacks: Mutex<HashMap<String, SubscribeCallback>>,
}

impl Subscribers {
    /// Registers `callback` for `channel`, replacing any previous one.
    /// Returns whether a previous callback was replaced.
    pub(crate) fn register(&self, channel: &str, callback: SubscribeCallback) -> bool {
        self.lock().insert(channel.to_string(), callback).is_some()
    }

    /// The callback for `channel`, cloned out so it can run without the lock.
    pub(crate) fn get(&self, channel: &str) -> Option<SubscribeCallback> {
        self.lock().get(channel).cloned()
    }

    pub(crate) fn channels(&self) -> Vec<String> {
        let mut channels: Vec<String> = self.lock().keys().cloned().collect();
        channels.sort();
        channels
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SubscribeCallback>> {
        self.callbacks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
