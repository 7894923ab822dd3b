use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::errors::{ErrorResponse, Result};
use crate::models::api::{CreateDishRequest, DishResponse};
use crate::AppState;

/// List every dish, ordered by id
#[utoipa::path(
    get,
    path = "/api/dishes",
    responses(
        (status = 200, description = "All dishes ordered by id", body = Vec<DishResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "dishes"
)]
pub async fn list_dishes(State(state): State<AppState>) -> Result<Json<Vec<DishResponse>>> {
    let dishes = state.catalog.list_dishes().await?;

    Ok(Json(dishes.into_iter().map(DishResponse::from).collect()))
}

/// Get a single dish
#[utoipa::path(
    get,
    path = "/api/dishes/{id}",
    params(
        ("id" = i32, Path, description = "Dish id")
    ),
    responses(
        (status = 200, description = "Dish found", body = DishResponse),
        (status = 404, description = "Dish not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "dishes"
)]
pub async fn get_dish(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DishResponse>> {
    let dish = state.catalog.get_dish(id).await?;

    Ok(Json(dish.into()))
}

/// Add a dish to the catalog
#[utoipa::path(
    post,
    path = "/api/dishes",
    request_body = CreateDishRequest,
    responses(
        (status = 201, description = "Dish created", body = DishResponse),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "dishes"
)]
pub async fn create_dish(
    State(state): State<AppState>,
    Json(request): Json<CreateDishRequest>,
) -> Result<(StatusCode, Json<DishResponse>)> {
    let dish = state.catalog.create_dish(request.into()).await?;

    Ok((StatusCode::CREATED, Json(dish.into())))
}

/// Flip a dish's publish status
///
/// PATCH /api/dishes/{id}/toggle
///
/// Connected `/ws` clients receive a `dishStatusChanged` message with the new status.
#[utoipa::path(
    patch,
    path = "/api/dishes/{id}/toggle",
    params(
        ("id" = i32, Path, description = "Dish id")
    ),
    responses(
        (status = 200, description = "Updated dish", body = DishResponse),
        (status = 404, description = "Dish not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "dishes"
)]
pub async fn toggle_dish(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DishResponse>> {
    let dish = state.catalog.toggle_dish(id).await?;

    Ok(Json(dish.into()))
}
