mod client;
pub mod registry;
mod server;

use axum::{
    extract::{
        ws::{WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
    routing::get,
    Router,
};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{Duration, Instant};

pub use registry::{
    BroadcastReport, Connection, ConnectionId, ConnectionReceiver, ConnectionRegistry,
    ConnectionSender, OUTBOUND_QUEUE_CAPACITY,
};

use client::handle_client_messages;
use server::handle_server_messages;

// Configuration constants
const PING_INTERVAL: Duration = Duration::from_secs(30);
const PONG_TIMEOUT: Duration = Duration::from_secs(60);
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Create WebSocket routes
/// Note: This function is generic to allow any state type
pub fn create_ws_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static + WsState,
{
    Router::new().route("/ws", get(ws_handler::<S>))
}

/// Trait that AppState must implement to provide WebSocket functionality
pub trait WsState {
    fn registry(&self) -> &ConnectionRegistry;
}

/// WebSocket upgrade handler
async fn ws_handler<S>(ws: WebSocketUpgrade, State(state): State<S>) -> Response
where
    S: Clone + Send + Sync + 'static + WsState,
{
    let registry = state.registry().clone();
    ws.on_upgrade(move |socket| handle_socket(socket, registry))
}

/// Liveness shared by the reader and writer of one connection
pub(crate) struct SocketState {
    pub(crate) last_pong: Instant,
}

impl SocketState {
    pub(crate) fn new() -> Self {
        Self {
            last_pong: Instant::now(),
        }
    }
}

/// Run one push connection from registration to teardown
async fn handle_socket(socket: WebSocket, registry: ConnectionRegistry) {
    let (sender, receiver) = socket.split();
    let socket_state = Arc::new(RwLock::new(SocketState::new()));

    let (connection, outbound_rx) = Connection::open();
    let connection_id = registry.register(connection).await;

    // Task 1: Drain incoming messages from client
    let mut recv_task = {
        let socket_state = socket_state.clone();
        tokio::spawn(async move { handle_client_messages(receiver, socket_state).await })
    };

    // Task 2: Forward broadcasts to client + ping/pong management
    let mut send_task = {
        let socket_state = socket_state.clone();
        tokio::spawn(async move { handle_server_messages(sender, outbound_rx, socket_state).await })
    };

    // Wait for either task to complete (disconnection), then stop the other
    tokio::select! {
        _ = &mut recv_task => {
            log::debug!("WebSocket receive task ended for {}", connection_id);
            send_task.abort();
        },
        _ = &mut send_task => {
            log::debug!("WebSocket send task ended for {}", connection_id);
            recv_task.abort();
        },
    }

    registry.unregister(connection_id).await;
}
