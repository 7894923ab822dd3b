use chrono::Utc;
use dish_backend::api::ws::ConnectionRegistry;
use dish_backend::db::{Db, DishStore, MemoryDishStore};
use dish_backend::models::domain::Dish;
use dish_backend::{create_app, AppState};
use futures::StreamExt;
use serde_json::Value;
use std::sync::Arc;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::postgres::Postgres;
use tokio::time::{timeout, Duration};
use tokio_tungstenite::tungstenite::Message;

#[allow(dead_code)]
pub type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Build a dish record with a fixed id
#[allow(dead_code)]
pub fn sample_dish(id: i32, name: &str, is_published: bool) -> Dish {
    let now = Utc::now();
    Dish {
        id,
        name: name.to_string(),
        image_url: format!("https://images.example.com/{}.jpg", id),
        is_published,
        created_at: now,
        updated_at: now,
    }
}

/// Test database container setup
#[allow(dead_code)]
pub struct TestDb {
    pub db: Db,
    postgres_container: testcontainers::ContainerAsync<Postgres>,
}

#[allow(dead_code)]
impl TestDb {
    /// Start a PostgreSQL container and connect (runs migrations)
    pub async fn setup() -> anyhow::Result<Self> {
        let postgres_container = Postgres::default()
            .start()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to start PostgreSQL container: {}", e))?;

        let postgres_port = postgres_container
            .get_host_port_ipv4(5432)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to get PostgreSQL port: {}", e))?;

        let postgres_host = postgres_container
            .get_host()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to get PostgreSQL host: {}", e))?;

        let postgres_url = format!(
            "postgres://postgres:postgres@{}:{}/postgres",
            postgres_host, postgres_port
        );

        let db = Db::connect(&postgres_url, 5)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to connect to PostgreSQL: {}", e))?;

        Ok(TestDb {
            db,
            postgres_container,
        })
    }
}

#[allow(dead_code)]
pub struct TestServer {
    pub address: String,
    pub registry: ConnectionRegistry,
    pub store: Arc<MemoryDishStore>,
    shutdown_tx: tokio::sync::oneshot::Sender<()>,
}

#[allow(dead_code)]
impl TestServer {
    /// Start a test HTTP server on a random available port with an empty catalog
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_with(MemoryDishStore::new()).await
    }

    /// Start a test HTTP server over the given store
    ///
    /// Same wiring as main.rs, minus PostgreSQL
    pub async fn start_with(store: MemoryDishStore) -> anyhow::Result<Self> {
        let store = Arc::new(store);
        let registry = ConnectionRegistry::new();

        let dyn_store: Arc<dyn DishStore> = store.clone();
        let state = AppState::new(dyn_store, registry.clone());
        let app = create_app(state, &["*".to_string()]);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let address = format!("http://{}", addr);

        // Create shutdown channel
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed to start");
        });

        // Give server a moment to start
        tokio::time::sleep(Duration::from_millis(100)).await;

        Ok(Self {
            address,
            registry,
            store,
            shutdown_tx,
        })
    }

    /// Start a server holding the given dishes
    pub async fn with_dishes(dishes: Vec<Dish>) -> anyhow::Result<Self> {
        Self::start_with(MemoryDishStore::with_dishes(dishes)).await
    }

    /// Helper to make a GET request
    pub async fn get(&self, path: &str) -> reqwest::Response {
        reqwest::get(&format!("{}{}", self.address, path))
            .await
            .expect("Failed to make GET request")
    }

    /// Helper to make a PATCH request
    pub async fn patch(&self, path: &str) -> reqwest::Response {
        self.client()
            .patch(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to make PATCH request")
    }

    /// Helper to make a POST request with a JSON body
    pub async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client()
            .post(format!("{}{}", self.address, path))
            .json(body)
            .send()
            .await
            .expect("Failed to make POST request")
    }

    /// Helper to get a reqwest client for more complex requests
    pub fn client(&self) -> reqwest::Client {
        reqwest::Client::new()
    }

    pub fn ws_url(&self) -> String {
        format!("{}/ws", self.address.replacen("http://", "ws://", 1))
    }

    /// Open a push connection and wait until the server has registered it
    pub async fn connect_ws(&self) -> WsStream {
        let expected = self.registry.connection_count().await + 1;
        let (ws, _response) = tokio_tungstenite::connect_async(self.ws_url())
            .await
            .expect("Failed to connect to WebSocket");
        self.wait_for_connections(expected).await;
        ws
    }

    /// Wait until exactly `count` push connections are registered
    pub async fn wait_for_connections(&self, count: usize) {
        let registry = self.registry.clone();
        wait_for(
            || {
                let registry = registry.clone();
                async move { registry.connection_count().await == count }
            },
            2000,
        )
        .await
        .unwrap_or_else(|_| panic!("Timed out waiting for {} connection(s)", count));
    }
}

/// Next text frame as JSON, skipping control frames. None on timeout or close.
#[allow(dead_code)]
pub async fn next_json(ws: &mut WsStream, timeout_ms: u64) -> Option<Value> {
    let deadline = Duration::from_millis(timeout_ms);
    loop {
        match timeout(deadline, ws.next()).await {
            Ok(Some(Ok(Message::Text(text)))) => {
                return Some(serde_json::from_str(text.as_str()).expect("Invalid JSON frame"))
            }
            Ok(Some(Ok(Message::Ping(_)))) | Ok(Some(Ok(Message::Pong(_)))) => continue,
            _ => return None,
        }
    }
}

/// Helper to wait for a condition with timeout
#[allow(dead_code)]
pub async fn wait_for<F, Fut>(mut condition: F, timeout_ms: u64) -> anyhow::Result<()>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let start = std::time::Instant::now();
    while start.elapsed().as_millis() < timeout_ms as u128 {
        if condition().await {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    anyhow::bail!("Timeout waiting for condition")
}
