//! In-memory dish store, used by tests and for running without PostgreSQL

use chrono::{DateTime, Duration, Utc};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::db::DishStore;
use crate::errors::{DishError, Result};
use crate::models::domain::{Dish, NewDish};

#[derive(Debug, Default)]
struct Inner {
    dishes: BTreeMap<i32, Dish>,
    last_id: i32,
}

#[derive(Debug, Default)]
pub struct MemoryDishStore {
    inner: RwLock<Inner>,
}

impl MemoryDishStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store holding exactly these records. Later creates get ids
    /// above the highest one given.
    pub fn with_dishes(dishes: impl IntoIterator<Item = Dish>) -> Self {
        let dishes: BTreeMap<i32, Dish> = dishes.into_iter().map(|d| (d.id, d)).collect();
        let last_id = dishes.keys().next_back().copied().unwrap_or(0);

        Self {
            inner: RwLock::new(Inner { dishes, last_id }),
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.dishes.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.dishes.is_empty()
    }

    async fn list_dishes(&self) -> Result<Vec<Dish>> {
        // BTreeMap iterates in key order
        Ok(self.inner.read().await.dishes.values().cloned().collect())
    }

    async fn get_dish(&self, id: i32) -> Result<Dish> {
        self.inner
            .read()
            .await
            .dishes
            .get(&id)
            .cloned()
            .ok_or(DishError::DishNotFound { id })
    }

    async fn create_dish(&self, dish: NewDish) -> Result<Dish> {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;

        let now = Utc::now();
        let dish = Dish {
            id: inner.last_id,
            name: dish.name,
            image_url: dish.image_url,
            is_published: dish.is_published,
            created_at: now,
            updated_at: now,
        };
        inner.dishes.insert(dish.id, dish.clone());

        Ok(dish)
    }

    async fn toggle_dish(&self, id: i32) -> Result<Dish> {
        let mut inner = self.inner.write().await;
        let dish = inner
            .dishes
            .get_mut(&id)
            .ok_or(DishError::DishNotFound { id })?;

        dish.is_published = !dish.is_published;
        dish.updated_at = next_timestamp(dish.updated_at);

        Ok(dish.clone())
    }
}

/// Current time, nudged forward if the clock hasn't moved past `previous`
fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

impl DishStore for MemoryDishStore {
    fn list_all(&self) -> BoxFuture<'_, Result<Vec<Dish>>> {
        self.list_dishes().boxed()
    }

    fn get_by_id(&self, id: i32) -> BoxFuture<'_, Result<Dish>> {
        self.get_dish(id).boxed()
    }

    fn create(&self, dish: NewDish) -> BoxFuture<'_, Result<Dish>> {
        self.create_dish(dish).boxed()
    }

    fn toggle(&self, id: i32) -> BoxFuture<'_, Result<Dish>> {
        self.toggle_dish(id).boxed()
    }
}
