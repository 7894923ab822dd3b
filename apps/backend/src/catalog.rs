// read -> store -> response
// toggle -> store commit -> broadcast -> response

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::api::ws::ConnectionRegistry;
use crate::db::DishStore;
use crate::errors::{DishError, Result};
use crate::models::api::ServerMessage;
use crate::models::domain::{Dish, NewDish};

const TOGGLE_LOCK_SHARDS: usize = 16;
// Matches the VARCHAR(255) name column
const MAX_NAME_CHARS: usize = 255;

/// Dish operations behind the REST handlers. Mutations that clients watch
/// are pushed to the registry after they are committed.
#[derive(Clone)]
pub struct Catalog {
    store: Arc<dyn DishStore>,
    registry: ConnectionRegistry,
    // Commit + broadcast of one dish run under its shard's lock, so clients
    // see a dish's changes in commit order
    toggle_locks: Arc<Vec<Mutex<()>>>,
}

impl Catalog {
    pub fn new(store: Arc<dyn DishStore>, registry: ConnectionRegistry) -> Self {
        Self {
            store,
            registry,
            toggle_locks: Arc::new((0..TOGGLE_LOCK_SHARDS).map(|_| Mutex::new(())).collect()),
        }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub async fn list_dishes(&self) -> Result<Vec<Dish>> {
        self.store.list_all().await
    }

    pub async fn get_dish(&self, id: i32) -> Result<Dish> {
        self.store.get_by_id(id).await
    }

    pub async fn create_dish(&self, dish: NewDish) -> Result<Dish> {
        if dish.name.trim().is_empty() {
            return Err(DishError::InvalidParameter {
                message: "name must not be empty".to_string(),
            });
        }
        if dish.name.chars().count() > MAX_NAME_CHARS {
            return Err(DishError::InvalidParameter {
                message: format!("name must be at most {} characters", MAX_NAME_CHARS),
            });
        }
        if dish.image_url.trim().is_empty() {
            return Err(DishError::InvalidParameter {
                message: "imageUrl must not be empty".to_string(),
            });
        }

        let dish = self.store.create(dish).await?;
        log::info!("Created dish {} ({})", dish.id, dish.name);
        Ok(dish)
    }

    /// Flip a dish's publish status and tell every connected client.
    ///
    /// The broadcast only happens once the store has committed, and an
    /// unknown id returns before anything is sent. Broadcasting only enqueues
    /// onto each connection's queue, so the shard lock is never held across
    /// a socket write.
    pub async fn toggle_dish(&self, id: i32) -> Result<Dish> {
        let shard = id.unsigned_abs() as usize % self.toggle_locks.len();
        let _guard = self.toggle_locks[shard].lock().await;

        let dish = self.store.toggle(id).await?;
        log::info!(
            "Dish {} is now {}",
            dish.id,
            if dish.is_published { "published" } else { "unpublished" }
        );

        self.registry
            .broadcast_all(&ServerMessage::dish_status_changed(&dish))
            .await;

        Ok(dish)
    }
}
