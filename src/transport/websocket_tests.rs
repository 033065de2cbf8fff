use crate::client::{Client, ClientConfig};
use crate::protocol::{self, Message};
use crate::transport::{TransportError, WebSocketConnector};
use crate::utils::error::Error;
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;

/// A small PuSu server: says hello, acknowledges authorize and subscribe,
/// and echoes every publish back to the sender.
async fn start_echo_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Can't bind");
    let addr = listener.local_addr().expect("local_addr");

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut ws = match accept_async(stream).await {
                    Ok(ws) => ws,
                    Err(_) => return,
                };
                let hello = protocol::encode(&Message::Hello).unwrap();
                if ws.send(WsMessage::Text(hello.into())).await.is_err() {
                    return;
                }

                while let Some(Ok(msg)) = ws.next().await {
                    let Ok(text) = msg.to_text() else { continue };
                    let reply = match protocol::decode(text) {
                        Ok(Message::Authorize { .. }) => Message::AuthorizationOk,
                        Ok(Message::Subscribe { .. }) => Message::SubscribeOk,
                        Ok(publish @ Message::Publish(_)) => publish,
                        Ok(_) => continue,
                        Err(_) => Message::UnknownMessageReceived,
                    };
                    let frame = protocol::encode(&reply).unwrap();
                    if ws.send(WsMessage::Text(frame.into())).await.is_err() {
                        break;
                    }
                }
            });
        }
    });

    format!("ws://{addr}/")
}

fn config() -> ClientConfig {
    ClientConfig {
        timeout: Duration::from_secs(2),
    }
}

#[tokio::test]
async fn test_websocket_round_trip() {
    let url = start_echo_server().await;
    let client = Client::connect_with(&WebSocketConnector, &url, config())
        .await
        .expect("connect");
    assert!(client.is_connected());

    client.authorize("foo").await.expect("authorize");

    let (tx, mut rx) = mpsc::unbounded_channel();
    client
        .subscribe("channel.1", move |p| {
            let _ = tx.send(p.content.clone());
        })
        .await
        .expect("subscribe");

    client.publish("channel.1", "message").await.expect("publish");

    let received = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("no echo")
        .expect("callback dropped");
    assert_eq!(received, "message");

    client.close().await;
    client.close().await;
    assert!(!client.is_connected());
}

#[tokio::test]
async fn test_websocket_connect_refused() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let url = format!("ws://127.0.0.1:{port}/");
    let result = Client::connect_with(&WebSocketConnector, &url, config()).await;
    assert!(matches!(
        result,
        Err(Error::Connection(TransportError::Connect { .. }))
    ));
}

#[tokio::test]
async fn test_websocket_server_hangup_marks_disconnected() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        if let Ok((stream, _)) = listener.accept().await {
            if let Ok(mut ws) = accept_async(stream).await {
                let hello = protocol::encode(&Message::Hello).unwrap();
                let _ = ws.send(WsMessage::Text(hello.into())).await;
                let _ = ws.close(None).await;
            }
        }
    });

    let client = Client::connect_with(&WebSocketConnector, &format!("ws://{addr}/"), config())
        .await
        .expect("connect");

    let deadline = std::time::Instant::now() + Duration::from_secs(2);
    while client.is_connected() {
        assert!(std::time::Instant::now() < deadline, "still connected");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn test_websocket_reader_skips_control_and_undecodable_frames() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let Ok((stream, _)) = listener.accept().await else { return };
        let Ok(mut ws) = accept_async(stream).await else { return };

        let text = |message: &Message| WsMessage::Text(protocol::encode(message).unwrap().into());
        let _ = ws.send(text(&Message::Hello)).await;

        // Wait for the subscribe before feeding the frames under test.
        while let Some(Ok(msg)) = ws.next().await {
            if let Ok(Message::Subscribe { .. }) = protocol::decode(msg.to_text().unwrap_or("")) {
                break;
            }
        }
        let _ = ws.send(text(&Message::SubscribeOk)).await;

        let binary = protocol::encode(&Message::publish("channel.1", "binary")).unwrap();
        let _ = ws.send(WsMessage::Ping(vec![1, 2, 3].into())).await;
        let _ = ws.send(WsMessage::Binary(binary.into_bytes().into())).await;
        let _ = ws.send(WsMessage::Binary(vec![0xff, 0xfe, 0xfd].into())).await;
        let _ = ws.send(text(&Message::publish("channel.1", "after"))).await;

        // Close once the client publishes anything.
        while let Some(Ok(msg)) = ws.next().await {
            if msg.is_text() {
                let _ = ws.close(None).await;
                break;
            }
        }
    });

    let client = Client::connect_with(&WebSocketConnector, &format!("ws://{addr}/"), config())
        .await
        .expect("connect");

    let (tx, mut rx) = mpsc::unbounded_channel();
    client
        .subscribe("channel.1", move |p| {
            let _ = tx.send(p.content.clone());
        })
        .await
        .expect("subscribe");

    for want in ["binary", "after"] {
        let got = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("publish not delivered")
            .expect("callback dropped");
        assert_eq!(got, want);
    }
    assert!(client.is_connected());

    // A close frame from the server ends the connection.
    client.publish("channel.1", "bye").await.expect("publish");
    let deadline = std::time::Instant::now() + Duration::from_secs(2);
    while client.is_connected() {
        assert!(std::time::Instant::now() < deadline, "still connected");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
