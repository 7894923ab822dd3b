use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::domain::Dish;

// ============================================================================
// DATABASE ROW TYPES
// ============================================================================

#[derive(Debug, Clone, FromRow)]
pub struct DishRow {
    pub id: i32,
    pub name: String,
    pub image_url: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DishRow> for Dish {
    fn from(row: DishRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            image_url: row.image_url,
            is_published: row.is_published,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
