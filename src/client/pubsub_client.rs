//! PuSu client
//!
//! `Client` keeps one connection to a PuSu server. The operations the server
//! acknowledges (connect, authorize, subscribe) do not return until the
//! matching acknowledgment arrives or the configured timeout elapses.
//! Published messages are routed to per-channel callbacks by a background
//! receive task for as long as the connection lives.
//!
//! Only one acknowledgment wait can be outstanding at a time. A second
//! concurrent `authorize`/`subscribe` fails with [`Error::WaitInProgress`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::Shared;
use super::receiver::receive_loop;
use super::subscribers::SubscribeCallback;
use crate::config::ClientSettings;
use crate::protocol::{self, Message, MessageKind, Publish};
use crate::transport::websocket::{WebSocketWriter, server_url};
use crate::transport::{Connector, FrameWriter, WebSocketConnector};
use crate::utils::error::{Error, Result};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// How long connect, authorize and subscribe wait for acknowledgment.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl From<&ClientSettings> for ClientConfig {
    fn from(settings: &ClientSettings) -> Self {
        Self {
            timeout: Duration::from_millis(settings.timeout_ms),
        }
    }
}

pub struct Client<W: FrameWriter + 'static = WebSocketWriter> {
    writer: Mutex<Option<W>>,
    shared: Arc<Shared>,
    receiver: StdMutex<Option<JoinHandle<()>>>,
    closed: AtomicBool,
    config: ClientConfig,
}

impl Client<WebSocketWriter> {
    /// Connects to a WebSocket URL such as `ws://127.0.0.1:55000/` with the
    /// default configuration.
    pub async fn connect(address: &str) -> Result<Self> {
        Self::connect_with(&WebSocketConnector, address, ClientConfig::default()).await
    }

    /// Connects to `ws://{host}:{port}/` with the default configuration.
    pub async fn connect_to(host: &str, port: u16) -> Result<Self> {
        let address = server_url(host, port).map_err(Error::Connection)?;
        Self::connect(&address).await
    }
}

impl<W: FrameWriter + 'static> Client<W> {
    /// Opens a connection through `connector` and waits for the server's
    /// `hello`. Not seeing `hello` in time is a failure; the connection is
    /// released before the error is returned.
    pub async fn connect_with<C>(connector: &C, address: &str, config: ClientConfig) -> Result<Self>
    where
        C: Connector<Writer = W>,
    {
        info!("Connecting to {address}");

        let (writer, reader) = connector
            .open(address)
            .await
            .map_err(Error::Connection)?;

        let shared = Arc::new(Shared::default());
        shared.connected.store(true, Ordering::SeqCst);

        // Armed before the receive task exists so an immediate hello is seen.
        let hello = shared.pending.arm(MessageKind::Hello)?;
        let receiver = tokio::spawn(receive_loop(reader, Arc::clone(&shared)));

        let client = Self {
            writer: Mutex::new(Some(writer)),
            shared,
            receiver: StdMutex::new(Some(receiver)),
            closed: AtomicBool::new(false),
            config,
        };

        if let Err(e) = hello.wait(client.config.timeout).await {
            warn!("No hello from {address}: {e}");
            client.close().await;
            return Err(e);
        }

        info!("Connected to {address}");
        Ok(client)
    }

    /// Claims some authorization and waits for `authorization_ok`.
    ///
    /// An invalid claim is answered with `authorization_failed` and a
    /// disconnect, which surfaces here as [`Error::TimeoutExceeded`].
    pub async fn authorize(&self, authorization: &str) -> Result<()> {
        self.request(Message::authorize(authorization), MessageKind::AuthorizationOk)
            .await
    }

    /// Subscribes to `channel` and waits for `subscribe_ok`.
    ///
    /// The callback is registered before the request goes out, so messages
    /// published on the channel ahead of the acknowledgment are delivered
    /// too. Subscribing again to the same channel replaces the callback.
    pub async fn subscribe<F>(&self, channel: &str, callback: F) -> Result<()>
    where
        F: Fn(&Publish) + Send + Sync + 'static,
    {
        self.ensure_open()?;

        let ack = self.shared.pending.arm(MessageKind::SubscribeOk)?;
        let callback: SubscribeCallback = Arc::new(callback);
        if self.shared.subscribers.register(channel, callback) {
            debug!("Replaced subscriber for {channel}");
        }

        self.send(&Message::subscribe(channel)).await?;
        ack.wait(self.config.timeout).await
    }

    /// Publishes `content` on `channel`. Nothing is acknowledged; only write
    /// errors are reported.
    pub async fn publish(&self, channel: &str, content: &str) -> Result<()> {
        self.ensure_open()?;
        self.send(&Message::publish(channel, content)).await
    }

    /// Disconnects from the server. Calling it again does nothing.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.shared.connected.store(false, Ordering::SeqCst);

        if let Some(mut writer) = self.writer.lock().await.take() {
            if let Err(e) = writer.close().await {
                debug!("Error while closing connection: {e}");
            }
        }
        if let Some(receiver) = self.take_receiver() {
            receiver.abort();
        }

        info!("Disconnected from server");
    }

    /// False once closed or once the receive task lost the connection.
    pub fn is_connected(&self) -> bool {
        !self.closed.load(Ordering::SeqCst) && self.shared.connected.load(Ordering::SeqCst)
    }

    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    /// Channels with a registered callback, sorted.
    pub fn subscriptions(&self) -> Vec<String> {
        self.shared.subscribers.channels()
    }

    async fn request(&self, message: Message, expected: MessageKind) -> Result<()> {
        self.ensure_open()?;

        let ack = self.shared.pending.arm(expected)?;
        self.send(&message).await?;
        ack.wait(self.config.timeout).await
    }

    async fn send(&self, message: &Message) -> Result<()> {
        let frame = protocol::encode(message)?;

        let mut writer = self.writer.lock().await;
        let writer = writer.as_mut().ok_or(Error::Closed)?;

        debug!("-> {frame}");
        writer.send_frame(frame).await.map_err(Error::Write)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::Closed);
        }
        Ok(())
    }

    fn take_receiver(&self) -> Option<JoinHandle<()>> {
        self.receiver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl<W: FrameWriter + 'static> Drop for Client<W> {
    fn drop(&mut self) {
        if let Some(receiver) = self.take_receiver() {
            receiver.abort();
        }
    }
}
