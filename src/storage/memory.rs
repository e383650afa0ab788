use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::UserStore;
use crate::{
    auth::repo_types::User,
    error::{AppError, AppResult},
};

/// In-process stand-in for the users table. Each method holds the lock for
/// one whole operation, matching single-statement atomicity in Postgres.
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub async fn count_username(&self, username: &str) -> usize {
        self.users
            .lock()
            .await
            .values()
            .filter(|u| u.username == username)
            .count()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert_user(&self, id: Uuid, username: &str, password_hash: &str) -> AppResult<()> {
        let mut users = self.users.lock().await;
        if users.values().any(|u| u.username == username) {
            return Err(AppError::DuplicateUsername);
        }
        users.insert(
            id,
            User {
                id,
                username: username.to_string(),
                password_hash: password_hash.to_string(),
                points: 0,
                created_at: OffsetDateTime::now_utc(),
            },
        );
        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let users = self.users.lock().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn points(&self, user_id: Uuid) -> AppResult<Option<i64>> {
        Ok(self.users.lock().await.get(&user_id).map(|u| u.points))
    }

    async fn add_points(&self, user_id: Uuid, amount: i64) -> AppResult<bool> {
        let mut users = self.users.lock().await;
        let Some(user) = users.get_mut(&user_id) else {
            return Ok(false);
        };
        user.points = user
            .points
            .checked_add(amount)
            .filter(|p| *p >= 0)
            .ok_or(AppError::InvalidAmount)?;
        Ok(true)
    }

    async fn set_points(&self, user_id: Uuid, value: i64) -> AppResult<bool> {
        if value < 0 {
            return Err(AppError::InvalidAmount);
        }
        let mut users = self.users.lock().await;
        match users.get_mut(&user_id) {
            Some(user) => {
                user.points = value;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// A store whose every call fails or hangs, for fault-path tests.
pub enum BrokenStore {
    Down,
    Stalled,
}

impl BrokenStore {
    async fn fail<T>(&self) -> AppResult<T> {
        match self {
            BrokenStore::Down => Err(AppError::from(sqlx::Error::PoolClosed)),
            BrokenStore::Stalled => std::future::pending().await,
        }
    }
}

#[async_trait]
impl UserStore for BrokenStore {
    async fn insert_user(&self, _id: Uuid, _username: &str, _hash: &str) -> AppResult<()> {
        self.fail().await
    }
    async fn find_by_username(&self, _username: &str) -> AppResult<Option<User>> {
        self.fail().await
    }
    async fn points(&self, _user_id: Uuid) -> AppResult<Option<i64>> {
        self.fail().await
    }
    async fn add_points(&self, _user_id: Uuid, _amount: i64) -> AppResult<bool> {
        self.fail().await
    }
    async fn set_points(&self, _user_id: Uuid, _value: i64) -> AppResult<bool> {
        self.fail().await
    }
}
