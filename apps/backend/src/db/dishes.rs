use futures::future::BoxFuture;
use futures::FutureExt;

use crate::db::{Db, DishStore};
use crate::errors::{DishError, Result};
use crate::models::{db::DishRow, domain::Dish, domain::NewDish};

const DISH_COLUMNS: &str = "id, name, image_url, is_published, created_at, updated_at";

impl Db {
    /// List all dishes ordered by id
    pub async fn list_dishes(&self) -> Result<Vec<Dish>> {
        let rows: Vec<DishRow> = sqlx::query_as(&format!(
            "SELECT {} FROM dishes ORDER BY id ASC",
            DISH_COLUMNS
        ))
        .fetch_all(&self.postgres)
        .await?;

        Ok(rows.into_iter().map(Dish::from).collect())
    }

    /// Get a dish by id
    pub async fn get_dish(&self, id: i32) -> Result<Dish> {
        let row: Option<DishRow> = sqlx::query_as(&format!(
            "SELECT {} FROM dishes WHERE id = $1",
            DISH_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.postgres)
        .await?;

        row.map(Dish::from).ok_or(DishError::DishNotFound { id })
    }

    /// Create a new dish
    pub async fn create_dish(&self, dish: NewDish) -> Result<Dish> {
        let row: DishRow = sqlx::query_as(&format!(
            "INSERT INTO dishes (name, image_url, is_published) VALUES ($1, $2, $3) RETURNING {}",
            DISH_COLUMNS
        ))
        .bind(dish.name)
        .bind(dish.image_url)
        .bind(dish.is_published)
        .fetch_one(&self.postgres)
        .await?;

        Ok(row.into())
    }

    /// Flip the publish flag in a single statement
    ///
    /// `updated_at` strictly increases, even for two toggles inside one transaction.
    pub async fn toggle_dish(&self, id: i32) -> Result<Dish> {
        let row: Option<DishRow> = sqlx::query_as(&format!(
            "UPDATE dishes SET is_published = NOT is_published, updated_at = GREATEST(clock_timestamp(), updated_at + interval '1 microsecond') WHERE id = $1 RETURNING {}",
            DISH_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.postgres)
        .await?;

        row.map(Dish::from).ok_or(DishError::DishNotFound { id })
    }

    /// Count stored dishes
    pub async fn count_dishes(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM dishes")
            .fetch_one(&self.postgres)
            .await?;

        Ok(count)
    }

    /// Delete every dish and restart the id sequence
    pub async fn reset_dishes(&self) -> Result<()> {
        sqlx::query("TRUNCATE TABLE dishes RESTART IDENTITY")
            .execute(&self.postgres)
            .await?;

        Ok(())
    }
}

impl DishStore for Db {
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
