//! # PuSu client
//!
//! `pusu` is a client for the PuSu publish/subscribe engine. It talks to the
//! server over a WebSocket, one JSON message per frame.
//!
//! ```no_run
//! # async fn run() -> pusu::Result<()> {
//! let client = pusu::Client::connect_to("127.0.0.1", 55000).await?;
//! client.authorize("foo").await?;
//! client
//!     .subscribe("channel.1", |msg| println!("{}: {}", msg.channel, msg.content))
//!     .await?;
//! client.publish("channel.1", "message").await?;
//! client.close().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - `protocol`: the message kinds and their text encoding.
//! - `transport`: the connection seam, with WebSocket and in-memory
//!   implementations.
//! - `client`: the connection itself. Waits for acknowledgments and routes
//!   published messages to subscriber callbacks.
//! - `config`: settings loaded from file and environment.
//! - `utils`: the error type and logging setup.

pub mod client;
pub mod config;
pub mod protocol;
pub mod transport;
pub mod utils;

pub use client::{Client, ClientConfig, SubscribeCallback};
pub use protocol::{Message, MessageKind, Publish};
pub use utils::error::{Error, Result};
