//! Storage seam for users and meals.
//!
//! Handlers never touch a connection directly: `AppState` carries
//! `Arc<dyn UserStore>` and `Arc<dyn MealStore>`, backed by [`PgStore`] in
//! production and [`MemoryStore`] in tests.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::meals::repo_types::{Meal, MealFields};
use crate::users::repo_types::{NewUser, User};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("{entity} already exists: {key}")]
    AlreadyExists { entity: &'static str, key: String },

    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    pub fn already_exists(entity: &'static str, key: impl Into<String>) -> Self {
        Self::AlreadyExists {
            entity,
            key: key.into(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user; fails with `AlreadyExists` on a duplicate email or session.
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn find_user_by_session(&self, session_id: &str) -> StoreResult<Option<User>>;
}

/// Meal persistence. Every method except [`MealStore::meal_exists`] is scoped
/// to `owner`.
#[async_trait]
pub trait MealStore: Send + Sync {
    /// All meals of `owner`, newest `meal_datetime` first
    /// (ties: `created_at` desc, then `id` desc).
    async fn list_meals(&self, owner: Uuid) -> StoreResult<Vec<Meal>>;

    async fn get_meal(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Meal>>;

    async fn create_meal(&self, owner: Uuid, fields: MealFields) -> StoreResult<Meal>;

    /// Whether any meal with `id` exists, regardless of owner.
    async fn meal_exists(&self, id: Uuid) -> StoreResult<bool>;

    /// Returns the number of rows changed (0 or 1).
    async fn update_meal(&self, owner: Uuid, id: Uuid, fields: MealFields) -> StoreResult<u64>;

    /// Returns the number of rows removed (0 or 1).
    async fn delete_meal(&self, owner: Uuid, id: Uuid) -> StoreResult<u64>;
}
