// region:    --- Imports
use crate::audit::PostgresAuditLog;
use crate::database::DatabaseManager;
use crate::lifecycle::{self, TransitionAction, TransitionCommand, TransitionError};
use crate::listing::ListingStatus;
use crate::notification::{self, PostgresNotificationOutbox};
use crate::query;
use crate::query::handlers::ListingFilter;
use crate::store::PostgresListingStore;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
// endregion: --- Imports

// region:    --- Transition Handler

#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub action: String,
    pub admin_id: i64,
    pub admin_name: String,
    pub reason: Option<String>,
    pub message: Option<String>,
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

fn transition_error_response(err: TransitionError) -> axum::response::Response {
    let status = match err {
        TransitionError::NotFound(_) => StatusCode::NOT_FOUND,
        TransitionError::ConcurrentModification(_) => StatusCode::CONFLICT,
        TransitionError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    };
    let body = serde_json::json!({
        "error": err.to_string(),
        "code": err.code(),
    });
    (status, Json(body)).into_response()
}

/// Admin transition endpoint: approve / reject / request_info / make_live.
pub async fn handle_transition(
    State(db_manager): State<Arc<DatabaseManager>>,
    Path(listing_id): Path<i64>,
    headers: HeaderMap,
    Json(req): Json<TransitionRequest>,
) -> impl IntoResponse {
    info!(
        "{:<12} --> transition request: listing {} action {:?}",
        "Handler", listing_id, req.action
    );

    let Some(action) = TransitionAction::parse(&req.action) else {
        return transition_error_response(TransitionError::InvalidAction(req.action));
    };

    let pool = db_manager.get_pool();
    let store = PostgresListingStore::new(Arc::clone(&pool));
    let audit = PostgresAuditLog::new(Arc::clone(&pool));
    let outbox = PostgresNotificationOutbox::new(pool);

    let cmd = TransitionCommand {
        listing_id,
        action,
        admin_id: req.admin_id,
        admin_name: req.admin_name,
        reason: req.reason,
        message: req.message,
        ip_address: header_value(&headers, "x-forwarded-for"),
        user_agent: header_value(&headers, "user-agent"),
    };

    match lifecycle::apply_transition(cmd, &store, &audit, &outbox).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "id": outcome.listing.id,
                "old_status": outcome.old_status,
                "new_status": outcome.listing.status,
                "action": action,
                "notification_sent": outcome.notification_sent(),
            })),
        )
            .into_response(),
        Err(err) => transition_error_response(err),
    }
}

// endregion: --- Transition Handler

// region:    --- Query Handlers

#[derive(Debug, Deserialize)]
pub struct ListListingsParams {
    pub status: Option<String>,
    pub category_id: Option<i64>,
    pub featured: Option<bool>,
    pub seller_id: Option<i64>,
    pub q: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Public listing page with optional filters.
pub async fn handle_list_listings(
    State(db_manager): State<Arc<DatabaseManager>>,
    Query(params): Query<ListListingsParams>,
) -> impl IntoResponse {
    let status = match params.status.as_deref() {
        Some(raw) => match ListingStatus::parse(raw) {
            Some(status) => Some(status),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({
                        "error": format!("unknown status: {raw}"),
                        "code": "INVALID_STATUS",
                    })),
                )
                    .into_response()
            }
        },
        None => None,
    };

    let filter = ListingFilter {
        status,
        category_id: params.category_id,
        featured: params.featured,
        seller_id: params.seller_id,
        q: params.q,
        page: params.page,
        per_page: params.per_page,
    };

    match query::handlers::list_listings(&db_manager, filter).await {
        Ok(page) => Json(page).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// Single listing lookup.
pub async fn handle_get_listing(
    State(db_manager): State<Arc<DatabaseManager>>,
    Path(listing_id): Path<i64>,
) -> impl IntoResponse {
    match query::handlers::get_listing(&db_manager, listing_id).await {
        Ok(Some(listing)) => Json(listing).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": format!("listing {listing_id} not found"),
                "code": "NOT_FOUND",
            })),
        )
            .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// Per-status listing counts for the admin dashboard.
pub async fn handle_listing_stats(
    State(db_manager): State<Arc<DatabaseManager>>,
) -> impl IntoResponse {
    match query::handlers::status_counts(&db_manager).await {
        Ok(counts) => Json(counts).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

// endregion: --- Query Handlers

// region:    --- Notification Handlers

/// A user's notifications, newest first.
pub async fn handle_get_notifications(
    State(db_manager): State<Arc<DatabaseManager>>,
    Path(user_id): Path<i64>,
) -> impl IntoResponse {
    match notification::get_user_notifications(&db_manager, user_id).await {
        Ok(entries) => Json(entries).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// Mark one notification read.
pub async fn handle_mark_notification_read(
    State(db_manager): State<Arc<DatabaseManager>>,
    Path(notification_id): Path<i64>,
) -> impl IntoResponse {
    match notification::mark_notification_read(&db_manager, notification_id).await {
        Ok(true) => (StatusCode::OK, Json(serde_json::json!({ "read": true }))).into_response(),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": format!("notification {notification_id} not found"),
                "code": "NOT_FOUND",
            })),
        )
            .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

// endregion: --- Notification Handlers
