//! sqlx/Postgres implementation of the store traits.
//!
//! Likes live in a join table whose primary key gives the set semantics:
//! `ON CONFLICT DO NOTHING` makes a repeated like a no-op and a plain
//! `DELETE` makes removing an absent like a no-op.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;
use tracing::info;

use super::models::{ClothingItem, User, Weather};
use super::{ItemStore, NewItem, NewUser, StoreError, UserStore};
use crate::config::DatabaseConfig;
use crate::types::ObjectId;

const CREATE_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    avatar      TEXT NOT NULL DEFAULT '',
    email       TEXT NOT NULL UNIQUE,
    password    TEXT NOT NULL
)
"#;

const CREATE_ITEMS: &str = r#"
CREATE TABLE IF NOT EXISTS items (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    weather     TEXT NOT NULL,
    image_url   TEXT NOT NULL,
    owner       TEXT NOT NULL REFERENCES users (id),
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
)
"#;

const CREATE_ITEM_LIKES: &str = r#"
CREATE TABLE IF NOT EXISTS item_likes (
    item_id     TEXT NOT NULL REFERENCES items (id) ON DELETE CASCADE,
    user_id     TEXT NOT NULL REFERENCES users (id),
    PRIMARY KEY (item_id, user_id)
)
"#;

const SELECT_ITEM: &str = r#"
SELECT i.id, i.name, i.weather, i.image_url, i.owner, i.created_at,
       COALESCE(array_agg(l.user_id) FILTER (WHERE l.user_id IS NOT NULL), '{}') AS likes
  FROM items i
  LEFT JOIN item_likes l ON l.item_id = i.id
"#;

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect and make sure the schema exists.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect(&config.url)
            .await?;

        for statement in [CREATE_USERS, CREATE_ITEMS, CREATE_ITEM_LIKES] {
            sqlx::query(statement).execute(&pool).await?;
        }

        info!("connected to database");
        Ok(Self { pool })
    }

    async fn find_item(&self, id: &ObjectId) -> Result<Option<ClothingItem>, StoreError> {
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            "{} WHERE i.id = $1 GROUP BY i.id",
            SELECT_ITEM
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(ClothingItem::try_from).transpose()
    }
}

#[derive(FromRow)]
struct UserRow {
    id: String,
    name: String,
    avatar: String,
    email: String,
    password: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: ObjectId::from_stored(row.id),
            name: row.name,
            avatar: row.avatar,
            email: row.email,
            password_hash: row.password,
        }
    }
}

#[derive(FromRow)]
struct ItemRow {
    id: String,
    name: String,
    weather: String,
    image_url: String,
    owner: String,
    created_at: DateTime<Utc>,
    likes: Vec<String>,
}

impl TryFrom<ItemRow> for ClothingItem {
    type Error = StoreError;

    fn try_from(row: ItemRow) -> Result<Self, StoreError> {
        let weather = row
            .weather
            .parse::<Weather>()
            .map_err(StoreError::Corrupt)?;

        Ok(ClothingItem {
            id: ObjectId::from_stored(row.id),
            name: row.name,
            weather,
            image_url: row.image_url,
            owner: ObjectId::from_stored(row.owner),
            likes: row.likes.into_iter().map(ObjectId::from_stored).collect(),
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert(&self, new: NewUser) -> Result<User, StoreError> {
        let id = ObjectId::generate();
        sqlx::query("INSERT INTO users (id, name, avatar, email, password) VALUES ($1, $2, $3, $4, $5)")
            .bind(id.as_str())
            .bind(&new.name)
            .bind(&new.avatar)
            .bind(&new.email)
            .bind(&new.password_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    StoreError::Duplicate("email")
                }
                _ => StoreError::Sqlx(e),
            })?;

        Ok(User {
            id,
            name: new.name,
            avatar: new.avatar,
            email: new.email,
            password_hash: new.password_hash,
        })
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, avatar, email, password FROM users WHERE id = $1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, avatar, email, password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn update_profile(
        &self,
        id: &ObjectId,
        name: String,
        avatar: Option<String>,
    ) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "UPDATE users SET name = $2, avatar = COALESCE($3, avatar) \
             WHERE id = $1 \
             RETURNING id, name, avatar, email, password",
        )
        .bind(id.as_str())
        .bind(&name)
        .bind(avatar)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }
}

#[async_trait]
impl ItemStore for PgStore {
    async fn list(&self) -> Result<Vec<ClothingItem>, StoreError> {
        let rows = sqlx::query_as::<_, ItemRow>(&format!(
            "{} GROUP BY i.id ORDER BY i.created_at, i.id",
            SELECT_ITEM
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ClothingItem::try_from).collect()
    }

    async fn insert(&self, new: NewItem) -> Result<ClothingItem, StoreError> {
        let id = ObjectId::generate();
        let created_at: DateTime<Utc> = sqlx::query_scalar(
            "INSERT INTO items (id, name, weather, image_url, owner) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING created_at",
        )
        .bind(id.as_str())
        .bind(&new.name)
        .bind(new.weather.as_str())
        .bind(&new.image_url)
        .bind(new.owner.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(ClothingItem {
            id,
            name: new.name,
            weather: new.weather,
            image_url: new.image_url,
            owner: new.owner,
            likes: Vec::new(),
            created_at,
        })
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<ClothingItem>, StoreError> {
        self.find_item(id).await
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn add_like(
        &self,
        item: &ObjectId,
        user: &ObjectId,
    ) -> Result<Option<ClothingItem>, StoreError> {
        let result =
            sqlx::query("INSERT INTO item_likes (item_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
                .bind(item.as_str())
                .bind(user.as_str())
                .execute(&self.pool)
                .await;

        match result {
            Ok(_) => self.find_item(item).await,
            // the item (or user) vanished under us: report a miss, not a failure
            Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => Ok(None),
            Err(e) => Err(StoreError::Sqlx(e)),
        }
    }

    async fn remove_like(
        &self,
        item: &ObjectId,
        user: &ObjectId,
    ) -> Result<Option<ClothingItem>, StoreError> {
        sqlx::query("DELETE FROM item_likes WHERE item_id = $1 AND user_id = $2")
            .bind(item.as_str())
            .bind(user.as_str())
            .execute(&self.pool)
            .await?;

        self.find_item(item).await
    }
}
