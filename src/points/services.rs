use std::{sync::Arc, time::Duration};

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    storage::{with_deadline, UserStore},
};

/// Reads and mutates a user's points balance. Each mutation is one store-side
/// statement; nothing here reads a balance and writes it back.
#[derive(Clone)]
pub struct Ledger {
    store: Arc<dyn UserStore>,
    deadline: Duration,
}

impl Ledger {
    pub fn new(store: Arc<dyn UserStore>, deadline: Duration) -> Self {
        Self { store, deadline }
    }

    pub async fn get(&self, user_id: Uuid) -> AppResult<i64> {
        with_deadline(self.deadline, self.store.points(user_id))
            .await?
            .ok_or(AppError::UserNotFound)
    }

    pub async fn add(&self, user_id: Uuid, amount: i64) -> AppResult<()> {
        if amount < 1 {
            return Err(AppError::InvalidAmount);
        }
        let found = with_deadline(self.deadline, self.store.add_points(user_id, amount)).await?;
        if !found {
            return Err(AppError::UserNotFound);
        }
        Ok(())
    }

    /// Authoritative overwrite. Last write wins against a concurrent `add`.
    pub async fn set(&self, user_id: Uuid, value: i64) -> AppResult<()> {
        if value < 0 {
            return Err(AppError::InvalidAmount);
        }
        let found = with_deadline(self.deadline, self.store.set_points(user_id, value)).await?;
        if !found {
            return Err(AppError::UserNotFound);
        }
        Ok(())
    }
}
