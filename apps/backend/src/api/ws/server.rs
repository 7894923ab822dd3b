//! WebSocket server message handling - sends messages to clients

use axum::{
    body::Bytes,
    extract::ws::{Message, WebSocket},
};
use futures::SinkExt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{interval, timeout};

use super::{ConnectionReceiver, SocketState, PING_INTERVAL, PONG_TIMEOUT, SEND_TIMEOUT};

/// Forward queued broadcasts to the client and keep the connection alive
pub(super) async fn handle_server_messages(
    mut sender: futures::stream::SplitSink<WebSocket, Message>,
    mut outbound_rx: ConnectionReceiver,
    socket_state: Arc<RwLock<SocketState>>,
) {
    let mut ping_interval = interval(PING_INTERVAL);

    loop {
        tokio::select! {
            // Send ping and check for timeouts
            _ = ping_interval.tick() => {
                let last_pong = socket_state.read().await.last_pong;

                if last_pong.elapsed() > PONG_TIMEOUT {
                    log::warn!("No pong received for {:?}, disconnecting client", last_pong.elapsed());
                    break;
                }

                let ping = timeout(SEND_TIMEOUT, sender.send(Message::Ping(Bytes::new()))).await;
                if !matches!(ping, Ok(Ok(()))) {
                    log::warn!("Failed to send ping, client disconnected");
                    break;
                }
                log::debug!("Sent ping to client");
            }

            // Forward registry broadcasts to client
            outbound = outbound_rx.recv() => {
                let Some(message) = outbound else {
                    // Registry dropped this connection's sender
                    break;
                };
                let is_close = matches!(message, Message::Close(_));
                // A client that stops reading blocks the write, so cap it
                match timeout(SEND_TIMEOUT, sender.send(message)).await {
                    Ok(Ok(())) => {}
                    Ok(Err(_)) => {
                        log::warn!("Failed to send message to client");
                        break;
                    }
                    Err(_) => {
                        log::warn!("Client stopped reading for {:?}, disconnecting", SEND_TIMEOUT);
                        break;
                    }
                }
                if is_close {
                    break;
                }
            }
        }
    }
}
