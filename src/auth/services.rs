use std::{sync::Arc, time::Duration};

use tracing::{debug, warn};
use uuid::Uuid;

use super::password::Hasher;
use crate::{
    error::{AppError, AppResult},
    storage::{with_deadline, UserStore},
};

/// Registers and authenticates users against the store.
#[derive(Clone)]
pub struct Credentials {
    store: Arc<dyn UserStore>,
    hasher: Arc<Hasher>,
    deadline: Duration,
}

impl Credentials {
    pub fn new(store: Arc<dyn UserStore>, hasher: Arc<Hasher>, deadline: Duration) -> Self {
        Self {
            store,
            hasher,
            deadline,
        }
    }

    pub async fn register(&self, username: &str, password: &str) -> AppResult<Uuid> {
        if username.is_empty() {
            return Err(AppError::InvalidInput("username is required".into()));
        }
        if password.is_empty() {
            return Err(AppError::InvalidInput("password is required".into()));
        }

        let hasher = Arc::clone(&self.hasher);
        let plain = password.to_owned();
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&plain)).await??;

        let id = Uuid::new_v4();
        with_deadline(self.deadline, self.store.insert_user(id, username, &hash)).await?;
        debug!(user_id = %id, "user row inserted");
        Ok(id)
    }

    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<Uuid> {
        let user = with_deadline(self.deadline, self.store.find_by_username(username)).await?;

        let hasher = Arc::clone(&self.hasher);
        let plain = password.to_owned();
        let Some(user) = user else {
            tokio::task::spawn_blocking(move || hasher.verify_dummy(&plain)).await?;
            warn!("login for unknown username");
            return Err(AppError::InvalidCredentials);
        };

        let stored = user.password_hash.clone();
        let ok = tokio::task::spawn_blocking(move || hasher.verify(&stored, &plain)).await??;
        if !ok {
            warn!(user_id = %user.id, "login with wrong password");
            return Err(AppError::InvalidCredentials);
        }
        Ok(user.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::password::test_hasher,
        storage::memory::{BrokenStore, MemoryUserStore},
    };

    fn credentials_over(store: Arc<dyn UserStore>) -> Credentials {
        Credentials::new(store, Arc::new(test_hasher()), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn register_then_authenticate() {
        let creds = credentials_over(Arc::new(MemoryUserStore::default()));
        let id = creds.register("alice", "s3cret").await.expect("register");
        assert_eq!(creds.authenticate("alice", "s3cret").await.unwrap(), id);

        let err = creds.authenticate("alice", "s3cret!").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password_are_indistinguishable() {
        let creds = credentials_over(Arc::new(MemoryUserStore::default()));
        creds.register("bob", "hunter2").await.unwrap();

        let unknown = creds.authenticate("mallory", "hunter2").await.unwrap_err();
        let wrong = creds.authenticate("bob", "hunter3").await.unwrap_err();
        assert_eq!(unknown.to_string(), wrong.to_string());
        assert_eq!(unknown.error_code(), wrong.error_code());
    }

    #[tokio::test]
    async fn usernames_are_case_sensitive() {
        let creds = credentials_over(Arc::new(MemoryUserStore::default()));
        creds.register("Alice", "pw").await.unwrap();
        creds.register("alice", "pw").await.expect("different case is a different user");
        assert!(matches!(
            creds.authenticate("ALICE", "pw").await,
            Err(AppError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn duplicate_registration_keeps_single_row() {
        let store = Arc::new(MemoryUserStore::default());
        let creds = credentials_over(store.clone());
        creds.register("carol", "first").await.unwrap();

        let err = creds.register("carol", "second").await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateUsername));
        assert_eq!(store.count_username("carol").await, 1);
        creds.authenticate("carol", "first").await.expect("original password still works");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_registrations_yield_one_winner() {
        let store = Arc::new(MemoryUserStore::default());
        let creds = credentials_over(store.clone());

        let attempts: Vec<_> = (0..8)
            .map(|_| {
                let creds = creds.clone();
                tokio::spawn(async move { creds.register("dave", "pw").await })
            })
            .collect();

        let mut ok = 0;
        let mut dup = 0;
        for handle in attempts {
            match handle.await.unwrap() {
                Ok(_) => ok += 1,
                Err(AppError::DuplicateUsername) => dup += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(dup, 7);
        assert_eq!(store.count_username("dave").await, 1);
    }

    #[tokio::test]
    async fn empty_fields_are_rejected_before_storage() {
        let creds = credentials_over(Arc::new(BrokenStore::Down));
        assert!(matches!(creds.register("", "pw").await, Err(AppError::InvalidInput(_))));
        assert!(matches!(creds.register("erin", "").await, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn storage_faults_are_not_business_errors() {
        let creds = credentials_over(Arc::new(BrokenStore::Down));
        let err = creds.register("frank", "pw").await.unwrap_err();
        assert!(matches!(err, AppError::StorageUnavailable(_)));
        let err = creds.authenticate("frank", "pw").await.unwrap_err();
        assert!(matches!(err, AppError::StorageUnavailable(_)));
    }

    #[tokio::test]
    async fn stalled_store_times_out() {
        let creds = Credentials::new(
            Arc::new(BrokenStore::Stalled),
            Arc::new(test_hasher()),
            Duration::from_millis(50),
        );
        let err = creds.authenticate("grace", "pw").await.unwrap_err();
        assert!(matches!(err, AppError::Timeout));
    }
}
