//! In-memory store. Backs the integration tests and `DATABASE_IN_MEMORY`
//! runs; state lives for the lifetime of the process.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::models::{ClothingItem, User};
use super::{ItemStore, NewItem, NewUser, StoreError, UserStore};
use crate::types::ObjectId;

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<ObjectId, User>>,
    items: RwLock<HashMap<ObjectId, ClothingItem>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, new: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == new.email) {
            return Err(StoreError::Duplicate("email"));
        }

        let user = User {
            id: ObjectId::generate(),
            name: new.name,
            avatar: new.avatar,
            email: new.email,
            password_hash: new.password_hash,
        };
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn update_profile(
        &self,
        id: &ObjectId,
        name: String,
        avatar: Option<String>,
    ) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(id) else {
            return Ok(None);
        };

        user.name = name;
        if let Some(avatar) = avatar {
            user.avatar = avatar;
        }
        Ok(Some(user.clone()))
    }
}

#[async_trait]
impl ItemStore for MemoryStore {
    async fn list(&self) -> Result<Vec<ClothingItem>, StoreError> {
        let items = self.items.read().await;
        let mut all: Vec<ClothingItem> = items.values().cloned().collect();
        all.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
        Ok(all)
    }

    async fn insert(&self, new: NewItem) -> Result<ClothingItem, StoreError> {
        let item = ClothingItem {
            id: ObjectId::generate(),
            name: new.name,
            weather: new.weather,
            image_url: new.image_url,
            owner: new.owner,
            likes: Vec::new(),
            created_at: Utc::now(),
        };
        self.items
            .write()
            .await
            .insert(item.id.clone(), item.clone());
        Ok(item)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<ClothingItem>, StoreError> {
        Ok(self.items.read().await.get(id).cloned())
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError> {
        Ok(self.items.write().await.remove(id).is_some())
    }

    async fn add_like(
        &self,
        item: &ObjectId,
        user: &ObjectId,
    ) -> Result<Option<ClothingItem>, StoreError> {
        let mut items = self.items.write().await;
        let Some(item) = items.get_mut(item) else {
            return Ok(None);
        };

        if !item.likes.contains(user) {
            item.likes.push(user.clone());
        }
        Ok(Some(item.clone()))
    }

    async fn remove_like(
        &self,
        item: &ObjectId,
        user: &ObjectId,
    ) -> Result<Option<ClothingItem>, StoreError> {
        let mut items = self.items.write().await;
        let Some(item) = items.get_mut(item) else {
            return Ok(None);
        };

        item.likes.retain(|liker| liker != user);
        Ok(Some(item.clone()))
    }
}
