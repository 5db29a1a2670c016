// region:    --- Imports
use crate::listing::{Listing, ListingStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;
// endregion: --- Imports

// region:    --- Queries

const GET_LISTING: &str = "SELECT * FROM listings WHERE id = $1";

/// Status and updated_at move together; the updated_at guard rejects a
/// write when another admin committed in between.
const UPDATE_LISTING_STATUS: &str = r#"
    UPDATE listings
    SET status = $2, updated_at = NOW()
    WHERE id = $1 AND updated_at = $3
    RETURNING *
"#;

// endregion: --- Queries

// region:    --- Listing Store Trait

/// The only write the lifecycle engine ever issues against a listing is a
/// status change; everything else belongs to the seller editing flows.
#[async_trait]
pub trait ListingStore: Send + Sync {
    async fn get(&self, id: i64) -> Result<Option<Listing>, sqlx::Error>;

    /// Apply a status change guarded by the `updated_at` the caller read.
    /// Returns `None` when the guard misses (row gone or concurrently
    /// modified).
    async fn update_status(
        &self,
        id: i64,
        new_status: ListingStatus,
        expected_updated_at: DateTime<Utc>,
    ) -> Result<Option<Listing>, sqlx::Error>;
}

// endregion: --- Listing Store Trait

// region:    --- Postgres Listing Store

pub struct PostgresListingStore {
    pool: Arc<PgPool>,
}

impl PostgresListingStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ListingStore for PostgresListingStore {
    async fn get(&self, id: i64) -> Result<Option<Listing>, sqlx::Error> {
        sqlx::query_as::<_, Listing>(GET_LISTING)
            .bind(id)
            .fetch_optional(&*self.pool)
            .await
    }

    async fn update_status(
        &self,
        id: i64,
        new_status: ListingStatus,
        expected_updated_at: DateTime<Utc>,
    ) -> Result<Option<Listing>, sqlx::Error> {
        info!(
            "{:<12} --> listing {} status write: {}",
            "Store", id, new_status
        );
        sqlx::query_as::<_, Listing>(UPDATE_LISTING_STATUS)
            .bind(id)
            .bind(new_status)
            .bind(expected_updated_at)
            .fetch_optional(&*self.pool)
            .await
    }
}

// endregion: --- Postgres Listing Store
