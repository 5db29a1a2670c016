// region:    --- Imports
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
// endregion: --- Imports

// region:    --- Listing Status

/// Lifecycle status of a listing. Mutated only through the lifecycle engine;
/// `ended` is additionally derived at read time from `end_time`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "listing_status", rename_all = "snake_case")]
pub enum ListingStatus {
    Draft,
    PendingReview,
    NeedsInfo,
    Approved,
    Live,
    Ended,
    Rejected,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Draft => "draft",
            ListingStatus::PendingReview => "pending_review",
            ListingStatus::NeedsInfo => "needs_info",
            ListingStatus::Approved => "approved",
            ListingStatus::Live => "live",
            ListingStatus::Ended => "ended",
            ListingStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(ListingStatus::Draft),
            "pending_review" => Some(ListingStatus::PendingReview),
            "needs_info" => Some(ListingStatus::NeedsInfo),
            "approved" => Some(ListingStatus::Approved),
            "live" => Some(ListingStatus::Live),
            "ended" => Some(ListingStatus::Ended),
            "rejected" => Some(ListingStatus::Rejected),
            _ => None,
        }
    }

    /// `draft` and `pending_review` are the same review-queue bucket under
    /// two names; `pending_review` is the canonical one.
    pub fn is_awaiting_review(&self) -> bool {
        matches!(
            self,
            ListingStatus::Draft | ListingStatus::PendingReview | ListingStatus::NeedsInfo
        )
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// endregion: --- Listing Status

// region:    --- Listing Model

/// An auction listing (vehicle or electronics lot).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Listing {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub starting_price: i64,
    pub reserve_price: Option<i64>,
    pub current_bid: i64,
    pub bid_increment: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: ListingStatus,
    pub featured: bool,
    pub view_count: i64,
    pub bid_count: i64,
    pub seller_id: Option<i64>,
    pub category_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    /// Display status: a `live` listing whose end time has passed reads as
    /// `ended` without anything being persisted.
    pub fn effective_status(&self, now: DateTime<Utc>) -> ListingStatus {
        if self.status == ListingStatus::Live && now > self.end_time {
            ListingStatus::Ended
        } else {
            self.status
        }
    }
}

// endregion: --- Listing Model

// region:    --- Tests

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn listing(status: ListingStatus, end_time: DateTime<Utc>) -> Listing {
        Listing {
            id: 1,
            title: "2019 Ford Transit".to_string(),
            description: "Repossessed cargo van".to_string(),
            starting_price: 500_000,
            reserve_price: None,
            current_bid: 500_000,
            bid_increment: 10_000,
            start_time: end_time - Duration::days(7),
            end_time,
            status,
            featured: false,
            view_count: 0,
            bid_count: 0,
            seller_id: Some(7),
            category_id: Some(1),
            created_at: end_time - Duration::days(8),
            updated_at: end_time - Duration::days(8),
        }
    }

    #[test]
    fn status_round_trips_through_strings() {
        for s in [
            "draft",
            "pending_review",
            "needs_info",
            "approved",
            "live",
            "ended",
            "rejected",
        ] {
            assert_eq!(ListingStatus::parse(s).unwrap().as_str(), s);
        }
        assert!(ListingStatus::parse("active").is_none());
    }

    #[test]
    fn live_listing_past_end_time_reads_as_ended() {
        let now = Utc::now();
        let expired = listing(ListingStatus::Live, now - Duration::minutes(1));
        assert_eq!(expired.effective_status(now), ListingStatus::Ended);

        let running = listing(ListingStatus::Live, now + Duration::hours(1));
        assert_eq!(running.effective_status(now), ListingStatus::Live);
    }

    #[test]
    fn effective_status_only_derives_from_live() {
        let now = Utc::now();
        let approved = listing(ListingStatus::Approved, now - Duration::minutes(1));
        assert_eq!(approved.effective_status(now), ListingStatus::Approved);
    }
}

// endregion: --- Tests
