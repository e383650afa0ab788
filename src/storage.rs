use std::{future::Future, time::Duration};

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    auth::repo_types::User,
    error::{AppError, AppResult},
};

#[cfg(test)]
pub mod memory;

/// Backing store for user rows. Uniqueness and increments must be atomic on
/// the store side; callers never lock around these methods.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a new user with zero points. `DuplicateUsername` if taken.
    async fn insert_user(&self, id: Uuid, username: &str, password_hash: &str) -> AppResult<()>;

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    async fn points(&self, user_id: Uuid) -> AppResult<Option<i64>>;

    /// Returns `false` if no such user exists.
    async fn add_points(&self, user_id: Uuid, amount: i64) -> AppResult<bool>;

    /// Returns `false` if no such user exists.
    async fn set_points(&self, user_id: Uuid, value: i64) -> AppResult<bool>;
}

/// Bounds a store round-trip. Elapsed deadlines become `Timeout`; the inner
/// future is dropped and nothing is retried.
pub async fn with_deadline<T, F>(deadline: Duration, fut: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(AppError::Timeout),
    }
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert_user(&self, id: Uuid, username: &str, password_hash: &str) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash)
            VALUES ($1, $2, $3)
            ON CONFLICT (username) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(username)
        .bind(password_hash)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::DuplicateUsername);
        }
        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, points, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn points(&self, user_id: Uuid) -> AppResult<Option<i64>> {
        let points = sqlx::query_scalar::<_, i64>(r#"SELECT points FROM users WHERE id = $1"#)
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?;
        Ok(points)
    }

    async fn add_points(&self, user_id: Uuid, amount: i64) -> AppResult<bool> {
        let result = sqlx::query(r#"UPDATE users SET points = points + $1 WHERE id = $2"#)
            .bind(amount)
            .bind(user_id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_points(&self, user_id: Uuid, value: i64) -> AppResult<bool> {
        let result = sqlx::query(r#"UPDATE users SET points = $1 WHERE id = $2"#)
            .bind(value)
            .bind(user_id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
