use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use sqlx::SqlitePool;

use crate::database::manager::DatabaseError;
use crate::database::models::User;

const USER_COLUMNS: &str = "id, username, password_hash, is_active, date_joined";

/// Account storage backing token issuance.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError>;

    /// Fails with `DatabaseError::Duplicate` when the username is taken.
    async fn create(&self, username: &str, password_hash: &str) -> Result<User, DatabaseError>;

    async fn set_password(&self, username: &str, password_hash: &str) -> Result<bool, DatabaseError>;

    async fn set_active(&self, username: &str, is_active: bool) -> Result<bool, DatabaseError>;
}

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE username = ?", USER_COLUMNS))
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create(&self, username: &str, password_hash: &str) -> Result<User, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, password_hash, is_active, date_joined) VALUES (?, ?, 1, ?) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(username)
        .bind(password_hash)
        .bind(Utc::now().trunc_subsecs(6))
        .fetch_one(&mut *tx)
        .await;

        let user = match result {
            Ok(user) => user,
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(DatabaseError::Duplicate(format!("username '{}' already exists", username)));
            }
            Err(e) => return Err(e.into()),
        };
        tx.commit().await?;

        Ok(user)
    }

    async fn set_password(&self, username: &str, password_hash: &str) -> Result<bool, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("UPDATE users SET password_hash = ? WHERE username = ?")
            .bind(password_hash)
            .bind(username)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_active(&self, username: &str, is_active: bool) -> Result<bool, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("UPDATE users SET is_active = ? WHERE username = ?")
            .bind(is_active)
            .bind(username)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
