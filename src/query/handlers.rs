// region:    --- Imports
use super::queries;
use crate::database::DatabaseManager;
use crate::listing::{Listing, ListingStatus};
use chrono::Utc;
use serde::Serialize;
use sqlx::Error as SqlxError;
use sqlx::Row;
use tracing::info;
// endregion: --- Imports

// region:    --- Filter / Page

pub const DEFAULT_PER_PAGE: i64 = 20;
pub const MAX_PER_PAGE: i64 = 100;

#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    pub status: Option<ListingStatus>,
    pub category_id: Option<i64>,
    pub featured: Option<bool>,
    pub seller_id: Option<i64>,
    pub q: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ListingPage {
    pub items: Vec<Listing>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

/// Clamp page parameters and turn them into LIMIT/OFFSET. The page cap
/// keeps the offset multiplication inside i64 for any wire input.
pub fn page_window(page: Option<i64>, per_page: Option<i64>) -> (i64, i64, i64) {
    let page = page.unwrap_or(1).clamp(1, i64::MAX / MAX_PER_PAGE);
    let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);
    (page, per_page, (page - 1) * per_page)
}

// endregion: --- Filter / Page

// region:    --- Query Handlers

/// Filtered, paginated listing page with effective statuses applied.
pub async fn list_listings(
    db_manager: &DatabaseManager,
    filter: ListingFilter,
) -> Result<ListingPage, SqlxError> {
    info!("{:<12} --> list listings: {:?}", "Query", filter);
    let now = Utc::now();
    let (page, per_page, offset) = page_window(filter.page, filter.per_page);
    let status = filter.status.map(|s| s.as_str().to_string());
    let q = filter.q.clone();
    let (category_id, featured, seller_id) = (filter.category_id, filter.featured, filter.seller_id);

    let (items, total) = db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let items = sqlx::query_as::<_, Listing>(queries::LIST_LISTINGS)
                    .bind(&status)
                    .bind(category_id)
                    .bind(featured)
                    .bind(seller_id)
                    .bind(&q)
                    .bind(now)
                    .bind(per_page)
                    .bind(offset)
                    .fetch_all(&mut **tx)
                    .await?;

                let total = sqlx::query_scalar::<_, i64>(queries::COUNT_LISTINGS)
                    .bind(&status)
                    .bind(category_id)
                    .bind(featured)
                    .bind(seller_id)
                    .bind(&q)
                    .bind(now)
                    .fetch_one(&mut **tx)
                    .await?;

                Ok::<_, SqlxError>((items, total))
            })
        })
        .await?;

    let items = items
        .into_iter()
        .map(|mut listing| {
            listing.status = listing.effective_status(now);
            listing
        })
        .collect();

    Ok(ListingPage {
        items,
        total,
        page,
        per_page,
    })
}

/// Single listing with effective status applied.
pub async fn get_listing(
    db_manager: &DatabaseManager,
    listing_id: i64,
) -> Result<Option<Listing>, SqlxError> {
    info!("{:<12} --> get listing id: {}", "Query", listing_id);
    let listing = db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Listing>(queries::GET_LISTING)
                    .bind(listing_id)
                    .fetch_optional(&mut **tx)
                    .await
            })
        })
        .await?;

    let now = Utc::now();
    Ok(listing.map(|mut l| {
        l.status = l.effective_status(now);
        l
    }))
}

/// `draft` and `pending_review` are one review-queue bucket under the
/// canonical name.
fn stats_bucket(status: &str) -> &str {
    if status == "draft" {
        "pending_review"
    } else {
        status
    }
}

/// Fold raw per-status counts into dashboard buckets.
pub fn fold_status_counts(rows: impl IntoIterator<Item = (String, i64)>) -> serde_json::Value {
    let mut counts = serde_json::Map::new();
    for (status, total) in rows {
        let bucket = stats_bucket(&status).to_string();
        let entry = counts.entry(bucket).or_insert_with(|| 0i64.into());
        *entry = (entry.as_i64().unwrap_or(0) + total).into();
    }
    serde_json::Value::Object(counts)
}

/// Per-status counts for the admin dashboard.
pub async fn status_counts(
    db_manager: &DatabaseManager,
) -> Result<serde_json::Value, SqlxError> {
    info!("{:<12} --> listing status counts", "Query");
    let rows = db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query(queries::STATUS_COUNTS)
                    .fetch_all(&mut **tx)
                    .await
            })
        })
        .await?;

    Ok(fold_status_counts(rows.iter().map(|row| {
        (row.get::<String, _>("status"), row.get::<i64, _>("total"))
    })))
}

// endregion: --- Query Handlers

// region:    --- Tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_window_defaults_and_clamps() {
        assert_eq!(page_window(None, None), (1, DEFAULT_PER_PAGE, 0));
        assert_eq!(page_window(Some(3), Some(10)), (3, 10, 20));
        assert_eq!(page_window(Some(0), Some(0)), (1, 1, 0));
        assert_eq!(page_window(Some(-5), Some(9999)), (1, MAX_PER_PAGE, 0));
    }

    #[test]
    fn page_window_caps_huge_pages_without_overflow() {
        let (page, per_page, offset) = page_window(Some(i64::MAX), Some(MAX_PER_PAGE));
        assert_eq!(page, i64::MAX / MAX_PER_PAGE);
        assert_eq!(per_page, MAX_PER_PAGE);
        assert_eq!(offset, (page - 1) * per_page);
        assert!(offset > 0);

        let (_, _, offset) = page_window(Some(i64::MAX), None);
        assert!(offset > 0);
    }

    #[test]
    fn status_counts_fold_draft_into_pending_review() {
        let counts = fold_status_counts([
            ("draft".to_string(), 3),
            ("pending_review".to_string(), 2),
            ("live".to_string(), 4),
        ]);
        assert_eq!(counts["pending_review"], 5);
        assert_eq!(counts["live"], 4);
        assert!(counts.get("draft").is_none());
    }

    #[test]
    fn status_counts_fold_keeps_other_buckets_apart() {
        let counts = fold_status_counts([
            ("needs_info".to_string(), 1),
            ("rejected".to_string(), 2),
        ]);
        assert_eq!(counts["needs_info"], 1);
        assert_eq!(counts["rejected"], 2);
        assert!(counts.get("pending_review").is_none());
    }
}

// endregion: --- Tests
