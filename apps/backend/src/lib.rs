use axum::http::HeaderValue;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod api;
pub mod catalog;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;

use api::rest::{self, ApiDoc};
use api::ws::{self, ConnectionRegistry, WsState};
use catalog::Catalog;
use db::DishStore;

/// Shared handler state. The registry inside is created once at startup and
/// reaches handlers only through here.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
}

impl AppState {
    pub fn new(store: Arc<dyn DishStore>, registry: ConnectionRegistry) -> Self {
        Self {
            catalog: Catalog::new(store, registry),
        }
    }
}

impl WsState for AppState {
    fn registry(&self) -> &ConnectionRegistry {
        self.catalog.registry()
    }
}

/// REST + WebSocket + docs, as served by main.rs and the integration tests
pub fn create_app(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .merge(rest::create_rest_routes())
        .merge(ws::create_ws_routes::<AppState>())
        .with_state(state)
        .merge(SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi()))
        .layer(cors_layer(cors_origins))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                log::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}
