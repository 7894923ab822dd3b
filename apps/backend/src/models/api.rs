use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::domain::{Dish, NewDish};

// ============================================================================
// REST API TYPES
// ============================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse {
    pub message: String,
    pub status: String,
    pub timestamp: i64,
}

/// Full dish record as returned by the REST API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DishResponse {
    pub id: i32,
    pub name: String,
    pub image_url: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Dish> for DishResponse {
    fn from(dish: Dish) -> Self {
        Self {
            id: dish.id,
            name: dish.name,
            image_url: dish.image_url,
            is_published: dish.is_published,
            created_at: dish.created_at,
            updated_at: dish.updated_at,
        }
    }
}

/// Request body for creating a dish
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDishRequest {
    pub name: String,
    pub image_url: String,
    #[serde(default)]
    pub is_published: bool,
}

impl From<CreateDishRequest> for NewDish {
    fn from(request: CreateDishRequest) -> Self {
        Self {
            name: request.name,
            image_url: request.image_url,
            is_published: request.is_published,
        }
    }
}

// ============================================================================
// WEBSOCKET MESSAGE TYPES (Server → Client)
// ============================================================================

/// Messages pushed to every connected client. The push channel is one-way,
/// so there is no client-to-server counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ServerMessage {
    DishStatusChanged(DishStatus),
}

/// Public fields of a dish at the moment it changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DishStatus {
    pub id: i32,
    pub name: String,
    pub image_url: String,
    pub is_published: bool,
}

impl From<&Dish> for DishStatus {
    fn from(dish: &Dish) -> Self {
        Self {
            id: dish.id,
            name: dish.name.clone(),
            image_url: dish.image_url.clone(),
            is_published: dish.is_published,
        }
    }
}

impl ServerMessage {
    pub fn dish_status_changed(dish: &Dish) -> Self {
        ServerMessage::DishStatusChanged(DishStatus::from(dish))
    }
}
