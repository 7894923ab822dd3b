use axum::{
    routing::{get, patch},
    Router,
};
use utoipa::OpenApi;

use crate::errors::ErrorResponse;
use crate::models::api::{ApiResponse, CreateDishRequest, DishResponse};
use crate::AppState;

pub mod dishes;
pub mod health;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Dish Management API",
        version = "0.1.0",
        description = "Dish catalog with live publish-status updates over /ws"
    ),
    paths(
        health::health_check,
        dishes::list_dishes,
        dishes::get_dish,
        dishes::create_dish,
        dishes::toggle_dish,
    ),
    components(
        schemas(ApiResponse, DishResponse, CreateDishRequest, ErrorResponse)
    ),
    tags(
        (name = "api", description = "General API endpoints"),
        (name = "dishes", description = "Dish catalog endpoints")
    )
)]
pub struct ApiDoc;

/// Create REST routes
pub fn create_rest_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::health_check))
        .route("/api/health", get(health::health_check))
        .route(
            "/api/dishes",
            get(dishes::list_dishes).post(dishes::create_dish),
        )
        .route("/api/dishes/{id}", get(dishes::get_dish))
        .route("/api/dishes/{id}/toggle", patch(dishes::toggle_dish))
}
