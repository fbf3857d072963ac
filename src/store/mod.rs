pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::ObjectId;
use self::models::{ClothingItem, User, Weather};

/// Errors surfaced by a store implementation. Uniqueness violations are
/// the only failure the API layer classifies as a client error; the rest
/// are unexpected.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate {0}")]
    Duplicate(&'static str),

    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Fields persisted when a user signs up.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub avatar: String,
    pub email: String,
    pub password_hash: String,
}

/// Fields persisted when a clothing item is created. The owner comes from
/// the authenticated identity, never from the request body.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub weather: Weather,
    pub image_url: String,
    pub owner: ObjectId,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user; fails with `Duplicate("email")` if the email is
    /// already registered.
    async fn insert(&self, new: NewUser) -> Result<User, StoreError>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, StoreError>;

    /// Login lookup; the returned record includes the password hash.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Update name (and avatar, when given) of an existing user. Returns
    /// `None` when the user does not exist.
    async fn update_profile(
        &self,
        id: &ObjectId,
        name: String,
        avatar: Option<String>,
    ) -> Result<Option<User>, StoreError>;
}

#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn list(&self) -> Result<Vec<ClothingItem>, StoreError>;

    async fn insert(&self, new: NewItem) -> Result<ClothingItem, StoreError>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<ClothingItem>, StoreError>;

    /// Returns false when the item did not exist.
    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError>;

    /// Add `user` to the item's like set. A repeated like is a no-op.
    /// Returns the updated item, or `None` when the item does not exist.
    async fn add_like(
        &self,
        item: &ObjectId,
        user: &ObjectId,
    ) -> Result<Option<ClothingItem>, StoreError>;

    /// Remove `user` from the item's like set. Removing an absent like is
    /// a no-op. Returns the updated item, or `None` when the item does
    /// not exist.
    async fn remove_like(
        &self,
        item: &ObjectId,
        user: &ObjectId,
    ) -> Result<Option<ClothingItem>, StoreError>;
}
