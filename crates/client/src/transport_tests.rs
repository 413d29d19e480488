// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the transport module.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use super::*;
use std::time::Duration;
use syncline_core::{Action, Topic};
use tokio::net::TcpListener;
use tokio::time::timeout;

async fn next_event(rx: &mut mpsc::UnboundedReceiver<SocketEvent>) -> SocketEvent {
    timeout(Duration::from_secs(5), rx.recv()).await.expect("timed out").expect("channel closed")
}

#[test]
fn socket_event_reports_its_socket() {
    let id = SocketId::new(7);
    let events = [
        SocketEvent::Opened(id),
        SocketEvent::Message(id, Message::new(Topic::Connection, Action::Ping)),
        SocketEvent::Error(id, "boom".into()),
        SocketEvent::Closed(id),
    ];
    assert!(events.iter().all(|e| e.socket() == id));
}

#[tokio::test]
async fn send_on_unknown_socket_fails() {
    let (mut transport, _rx) = WebSocketTransport::new();
    let err = transport
        .send(SocketId::new(1), &Message::new(Topic::Connection, Action::Pong))
        .unwrap_err();
    assert!(matches!(err, TransportError::ConnectionClosed));
}

#[tokio::test]
async fn refused_connection_reports_error_then_closed() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (mut transport, mut rx) = WebSocketTransport::new();
    let id = SocketId::new(1);
    transport.open(id, &format!("ws://{addr}/sync"));

    match next_event(&mut rx).await {
        SocketEvent::Error(got, reason) => {
            assert_eq!(got, id);
            assert!(reason.contains("connection failed"), "{reason}");
        }
        other => panic!("expected error, got {other:?}"),
    }
    assert_eq!(next_event(&mut rx).await, SocketEvent::Closed(id));
}

#[tokio::test]
async fn exchanges_json_frames_with_server() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        let ping = Message::new(Topic::Connection, Action::Ping).to_json().unwrap();
        ws.send(Frame::Text(ping.into())).await.unwrap();
        ws.send(Frame::Text("not json".into())).await.unwrap();
        // reply frame from the client
        let reply = loop {
            match ws.next().await.unwrap().unwrap() {
                Frame::Text(text) => break Message::from_json(text.as_str()).unwrap(),
                _ => continue,
            }
        };
        let _ = ws.close(None).await;
        reply
    });

    let (mut transport, mut rx) = WebSocketTransport::new();
    let id = SocketId::new(3);
    transport.open(id, &format!("ws://{addr}/sync"));

    assert_eq!(next_event(&mut rx).await, SocketEvent::Opened(id));
    match next_event(&mut rx).await {
        SocketEvent::Message(got, message) => {
            assert_eq!(got, id);
            assert_eq!(message.action, Action::Ping);
        }
        other => panic!("expected message, got {other:?}"),
    }

    transport.send(id, &Message::new(Topic::Connection, Action::Pong)).unwrap();
    let reply = server.await.unwrap();
    assert_eq!(reply.action, Action::Pong);

    // undecodable frame was dropped; next event is the close
    assert_eq!(next_event(&mut rx).await, SocketEvent::Closed(id));
}

#[tokio::test]
async fn close_before_open_reports_closed() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (mut transport, mut rx) = WebSocketTransport::new();
    let id = SocketId::new(9);
    transport.open(id, &format!("ws://{addr}/sync"));
    transport.close(id);

    // the listener never completes the handshake, so only the close is seen
    assert_eq!(next_event(&mut rx).await, SocketEvent::Closed(id));
    drop(listener);
}
