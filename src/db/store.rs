//! User store abstraction shared by the PostgreSQL and in-memory backends.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewUser, User, UserPatch};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("username already exists")]
    DuplicateUsername,
    #[error("user not found")]
    NotFound,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// CRUD over the `users` table. Username uniqueness is enforced here, not by callers.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert and return the stored row with its assigned id.
    async fn create(&self, user: NewUser) -> StoreResult<User>;

    /// All users, oldest first.
    async fn list(&self) -> StoreResult<Vec<User>>;

    async fn get_by_id(&self, id: i64) -> StoreResult<User>;

    async fn get_by_username(&self, username: &str) -> StoreResult<User>;

    /// Apply only the `Some` fields of `patch`.
    async fn update_by_id(&self, id: i64, patch: UserPatch) -> StoreResult<User>;

    async fn delete_by_id(&self, id: i64) -> StoreResult<()>;
}
