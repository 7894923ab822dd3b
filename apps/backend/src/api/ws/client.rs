//! WebSocket client message handling - the channel is server-to-client only,
//! so inbound data is read and dropped

use axum::extract::ws::{Message, WebSocket};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::Instant;

use super::SocketState;

/// Read from the client until it closes or the transport fails
pub(super) async fn handle_client_messages(
    mut receiver: futures::stream::SplitStream<WebSocket>,
    socket_state: Arc<RwLock<SocketState>>,
) {
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                log::debug!("Ignoring {} byte(s) of client text", text.len());
            }
            Ok(Message::Binary(data)) => {
                log::debug!("Ignoring {} byte(s) of client binary data", data.len());
            }
            Ok(Message::Pong(_)) => {
                socket_state.write().await.last_pong = Instant::now();
                log::debug!("Received pong from client");
            }
            Ok(Message::Close(frame)) => {
                log::info!("Client sent close frame: {:?}", frame);
                break;
            }
            Err(e) => {
                log::warn!("WebSocket error: {}", e);
                break;
            }
            // Pings are answered by axum
            Ok(Message::Ping(_)) => {}
        }
    }
}
