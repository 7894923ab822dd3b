use crate::models::ApiResponse;
use axum::response::Json;

#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Health check response", body = ApiResponse)
    ),
    tag = "api"
)]
pub async fn health_check() -> Json<ApiResponse> {
    Json(ApiResponse {
        message: "Dish Management API".to_string(),
        status: "running".to_string(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}
