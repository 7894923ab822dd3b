use anyhow::Context;
use dish_backend::api::ws::ConnectionRegistry;
use dish_backend::config::{load_env_files, ServerConfig};
use dish_backend::db::Db;
use dish_backend::{create_app, AppState};
use std::path::Path;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env overrides .env.defaults, real env overrides both
    load_env_files(Path::new("."));

    env_logger::init();

    let config = ServerConfig::from_env().context("Invalid server configuration")?;
    let addr = config.bind_addr();

    // Connect to database
    let db = Db::connect(&config.database_url, config.max_connections)
        .await
        .context("Failed to connect to database")?;
    log::info!("Connected to PostgreSQL");

    // Registry lives for the whole server run
    let registry = ConnectionRegistry::new();
    let state = AppState::new(Arc::new(db), registry.clone());
    let app = create_app(state, &config.cors_origins);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context(format!("Failed to bind to {}", addr))?;

    println!("🚀 Dish backend running on http://{}", addr);
    println!("🔌 WebSocket endpoint: ws://{}/ws", addr);
    println!("📖 OpenAPI docs: http://{}/api/docs", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(registry))
        .await
        .context("Server error")?;

    log::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C, after asking every push client to close
async fn shutdown_signal(registry: ConnectionRegistry) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutting down, closing push connections");
    registry.close_all().await;
}
