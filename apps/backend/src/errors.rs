use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Error, Debug)]
pub enum DishError {
    // Business logic errors (4xx)
    #[error("Dish '{id}' not found")]
    DishNotFound { id: i32 },

    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },

    // Infrastructure errors (5xx) - auto-converted
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, DishError>;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl DishError {
    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            DishError::DishNotFound { .. } => "DISH_NOT_FOUND",
            DishError::InvalidParameter { .. } => "INVALID_PARAMETER",
            DishError::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // Client errors
            DishError::DishNotFound { .. } => StatusCode::NOT_FOUND,
            DishError::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
            // Server errors
            DishError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for DishError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        // For server errors, log the details but don't expose them
        let error_message = match &self {
            DishError::Database(ref e) => {
                log::error!("Database error: {}", e);
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        };

        let body = Json(ErrorResponse {
            error: error_message,
            code: error_code.to_string(),
        });

        (status, body).into_response()
    }
}
