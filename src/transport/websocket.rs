//! WebSocket transport
//!
//! Dials the server with `tokio-tungstenite` and splits the stream into a
//! sink half for the caller and a stream half for the receive task. Only
//! text frames carry protocol messages; binary frames are accepted when they
//! hold UTF-8, and ping/pong traffic is answered by tungstenite itself.

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, warn};
use tungstenite::protocol::Message as WsMessage;
use url::Url;

use super::{Connector, FrameReader, FrameWriter, TransportError};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// The address of a PuSu server listening on `host:port`.
pub fn server_url(host: &str, port: u16) -> Result<String, TransportError> {
    let url = Url::parse(&format!("ws://{host}:{port}/")).map_err(|e| TransportError::Connect {
        address: format!("{host}:{port}"),
        reason: e.to_string(),
    })?;
    Ok(url.to_string())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

#[async_trait]
impl Connector for WebSocketConnector {
    type Writer = WebSocketWriter;
    type Reader = WebSocketReader;

    async fn open(&self, address: &str) -> Result<(Self::Writer, Self::Reader), TransportError> {
        let (ws_stream, _response) =
            connect_async(address)
                .await
                .map_err(|e| TransportError::Connect {
                    address: address.to_string(),
                    reason: e.to_string(),
                })?;

        debug!("websocket connected to {address}");

        let (sink, stream) = ws_stream.split();
        Ok((WebSocketWriter { sink }, WebSocketReader { stream }))
    }
}

pub struct WebSocketWriter {
    sink: SplitSink<WsStream, WsMessage>,
}

#[async_trait]
impl FrameWriter for WebSocketWriter {
    async fn send_frame(&mut self, frame: String) -> Result<(), TransportError> {
        self.sink.send(WsMessage::Text(frame.into())).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.sink.close().await?;
        Ok(())
    }
}

pub struct WebSocketReader {
    stream: SplitStream<WsStream>,
}

#[async_trait]
impl FrameReader for WebSocketReader {
    async fn next_frame(&mut self) -> Result<String, TransportError> {
        while let Some(msg) = self.stream.next().await {
            match msg? {
                WsMessage::Text(text) => return Ok(text.as_str().to_owned()),
                WsMessage::Binary(data) => match String::from_utf8(data.to_vec()) {
                    Ok(text) => return Ok(text),
                    Err(e) => {
                        warn!("Dropping binary frame of {} bytes: {e}", data.len());
                        continue;
                    }
                },
                WsMessage::Close(_) => return Err(TransportError::Closed),
                WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_) => continue,
            }
        }

        Err(TransportError::Closed)
    }
}
