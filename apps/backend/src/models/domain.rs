use chrono::{DateTime, Utc};

// ============================================================================
// DOMAIN TYPES
// ============================================================================

/// A catalog record as stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dish {
    pub id: i32,
    pub name: String,
    pub image_url: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a dish; the store assigns id and timestamps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDish {
    pub name: String,
    pub image_url: String,
    pub is_published: bool,
}

impl NewDish {
    pub fn new(name: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image_url: image_url.into(),
            is_published: false,
        }
    }

    pub fn published(mut self, is_published: bool) -> Self {
        self.is_published = is_published;
        self
    }
}
