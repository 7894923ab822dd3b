// Database connection modules
pub mod pg;

// Store implementations
pub mod dishes;
pub mod memory;

pub use memory::MemoryDishStore;
pub use sqlx::postgres::PgPool;

use futures::future::BoxFuture;

use crate::errors::Result;
use crate::models::domain::{Dish, NewDish};

/// Persistent dish storage. Every method is a single committed operation.
pub trait DishStore: Send + Sync + 'static {
    /// All dishes ordered by ascending id
    fn list_all(&self) -> BoxFuture<'_, Result<Vec<Dish>>>;

    /// Fails with `DishNotFound` for an unknown id
    fn get_by_id(&self, id: i32) -> BoxFuture<'_, Result<Dish>>;

    fn create(&self, dish: NewDish) -> BoxFuture<'_, Result<Dish>>;

    /// Flip `is_published` and refresh `updated_at`, returning the committed
    /// record. Fails with `DishNotFound` without mutating anything.
    fn toggle(&self, id: i32) -> BoxFuture<'_, Result<Dish>>;
}

/// PostgreSQL handle
#[derive(Clone)]
pub struct Db {
    pub postgres: PgPool,
}

impl Db {
    /// Connect to PostgreSQL and run pending migrations
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let postgres = pg::create_pool(database_url, max_connections).await?;

        Ok(Self { postgres })
    }
}
