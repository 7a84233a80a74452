use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use rust_decimal::Decimal;
use sqlx::{Row, SqlitePool};

use crate::database::manager::DatabaseError;
use crate::database::models::{Item, ItemChanges, ItemRow, NewItem};
use crate::filter::{ItemFilter, PageWindow};

/// Storage operations on items. Every write is atomic on its own.
#[async_trait]
pub trait ItemRepository: Send + Sync {
    async fn find(&self, id: i64) -> Result<Option<Item>, DatabaseError>;

    async fn count_filtered(&self, filter: &ItemFilter) -> Result<u64, DatabaseError>;

    async fn list_filtered(&self, filter: &ItemFilter, window: PageWindow) -> Result<Vec<Item>, DatabaseError>;

    async fn insert(&self, item: NewItem) -> Result<Item, DatabaseError>;

    /// Returns `None` when no item has this id.
    async fn update(&self, id: i64, changes: ItemChanges) -> Result<Option<Item>, DatabaseError>;

    /// Returns `false` when no item has this id.
    async fn delete(&self, id: i64) -> Result<bool, DatabaseError>;
}

pub struct SqliteItemRepository {
    pool: SqlitePool,
}

impl SqliteItemRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Stored form of a price: always two decimal places.
pub fn price_to_storage(price: Decimal) -> String {
    let mut price = price;
    price.rescale(2);
    price.to_string()
}

#[async_trait]
impl ItemRepository for SqliteItemRepository {
    async fn find(&self, id: i64) -> Result<Option<Item>, DatabaseError> {
        let row = sqlx::query_as::<_, ItemRow>(
            "SELECT id, name, price, created_at FROM items WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Item::try_from).transpose()
    }

    async fn count_filtered(&self, filter: &ItemFilter) -> Result<u64, DatabaseError> {
        let sql = filter.to_count_sql();
        let mut q = sqlx::query(&sql.query);
        for p in sql.params.iter() {
            q = q.bind(p);
        }
        let row = q.fetch_one(&self.pool).await?;
        let count: i64 = row.try_get("count")?;
        Ok(count.max(0) as u64)
    }

    async fn list_filtered(&self, filter: &ItemFilter, window: PageWindow) -> Result<Vec<Item>, DatabaseError> {
        let sql = filter.to_sql(window);
        let mut q = sqlx::query_as::<_, ItemRow>(&sql.query);
        for p in sql.params.iter() {
            q = q.bind(p);
        }
        let rows = q.fetch_all(&self.pool).await?;
        rows.into_iter().map(Item::try_from).collect()
    }

    async fn insert(&self, item: NewItem) -> Result<Item, DatabaseError> {
        let created_at = Utc::now().trunc_subsecs(6);

        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, ItemRow>(
            "INSERT INTO items (name, price, created_at) VALUES (?, ?, ?) \
             RETURNING id, name, price, created_at",
        )
        .bind(&item.name)
        .bind(price_to_storage(item.price))
        .bind(created_at)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        Item::try_from(row)
    }

    async fn update(&self, id: i64, changes: ItemChanges) -> Result<Option<Item>, DatabaseError> {
        if changes.is_empty() {
            return self.find(id).await;
        }

        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, ItemRow>(
            "UPDATE items SET name = COALESCE(?, name), price = COALESCE(?, price) WHERE id = ? \
             RETURNING id, name, price, created_at",
        )
        .bind(changes.name)
        .bind(changes.price.map(price_to_storage))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        tx.commit().await?;

        row.map(Item::try_from).transpose()
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }
}
