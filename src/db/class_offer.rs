//! Class offer storage.
//!
//! Mutations take the requesting author's ID and only touch rows that author
//! owns, so a row that changed hands (or vanished) between the handler's
//! ownership check and the write is simply not matched.

use serde::Serialize;
use sqlx::sqlite::SqlitePool;

#[derive(Clone)]
pub struct ClassOfferStore {
    pool: SqlitePool,
}

/// A class offer listing as stored and as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ClassOffer {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub author_id: i64,
    pub created_at: String,
}

/// Partial update. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ClassOfferPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
}

impl ClassOfferStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List class offers by ascending ID. `page` is 1-based.
    pub async fn list(&self, page: i64, limit: i64) -> Result<Vec<ClassOffer>, sqlx::Error> {
        let offset = (page - 1).max(0).saturating_mul(limit);
        sqlx::query_as(
            "SELECT id, title, description, price, author_id, created_at
             FROM class_offers ORDER BY id LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    /// Get a class offer by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<ClassOffer>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, title, description, price, author_id, created_at
             FROM class_offers WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Create a class offer owned by `author_id`.
    pub async fn create(
        &self,
        author_id: i64,
        title: &str,
        description: &str,
        price: f64,
    ) -> Result<ClassOffer, sqlx::Error> {
        sqlx::query_as(
            "INSERT INTO class_offers (title, description, price, author_id) VALUES (?, ?, ?, ?)
             RETURNING id, title, description, price, author_id, created_at",
        )
        .bind(title)
        .bind(description)
        .bind(price)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await
    }

    /// Apply a partial update to an offer owned by `author_id`.
    /// Returns the updated offer, or None if no such offer belongs to the author.
    pub async fn update(
        &self,
        id: i64,
        author_id: i64,
        patch: &ClassOfferPatch,
    ) -> Result<Option<ClassOffer>, sqlx::Error> {
        sqlx::query_as(
            "UPDATE class_offers
             SET title = COALESCE(?, title),
                 description = COALESCE(?, description),
                 price = COALESCE(?, price)
             WHERE id = ? AND author_id = ?
             RETURNING id, title, description, price, author_id, created_at",
        )
        .bind(patch.title.as_deref())
        .bind(patch.description.as_deref())
        .bind(patch.price)
        .bind(id)
        .bind(author_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Delete an offer owned by `author_id`, returning the deleted row.
    pub async fn delete(&self, id: i64, author_id: i64) -> Result<Option<ClassOffer>, sqlx::Error> {
        sqlx::query_as(
            "DELETE FROM class_offers WHERE id = ? AND author_id = ?
             RETURNING id, title, description, price, author_id, created_at",
        )
        .bind(id)
        .bind(author_id)
        .fetch_optional(&self.pool)
        .await
    }
}
