//! Auction status lifecycle engine: the sole authority for moving a
//! listing between statuses. Validates the transition, applies the status
//! write with an optimistic guard, then appends the audit and notification
//! side effects. Audit/outbox failures never roll back a committed status
//! write; they are logged and reported in the outcome instead.

// region:    --- Imports
use crate::audit::{AuditLog, AuditLogEntry, NewAuditLogEntry};
use crate::listing::{Listing, ListingStatus};
use crate::notification::{NewNotification, NotificationOutbox, NotificationOutboxEntry};
use crate::store::ListingStore;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};
// endregion: --- Imports

// region:    --- Transition Action

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionAction {
    Approve,
    Reject,
    RequestInfo,
    MakeLive,
}

impl TransitionAction {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "approve" => Some(TransitionAction::Approve),
            "reject" => Some(TransitionAction::Reject),
            "request_info" => Some(TransitionAction::RequestInfo),
            "make_live" => Some(TransitionAction::MakeLive),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionAction::Approve => "approve",
            TransitionAction::Reject => "reject",
            TransitionAction::RequestInfo => "request_info",
            TransitionAction::MakeLive => "make_live",
        }
    }

    pub fn target(&self) -> ListingStatus {
        match self {
            TransitionAction::Approve => ListingStatus::Approved,
            TransitionAction::Reject => ListingStatus::Rejected,
            TransitionAction::RequestInfo => ListingStatus::NeedsInfo,
            TransitionAction::MakeLive => ListingStatus::Live,
        }
    }

    /// Approve/reject only act on the review queue. Request-info and
    /// make-live stay permissive about the source state, restricted only
    /// by already being in the target.
    pub fn allows_source(&self, current: ListingStatus) -> bool {
        match self {
            TransitionAction::Approve | TransitionAction::Reject => current.is_awaiting_review(),
            TransitionAction::RequestInfo | TransitionAction::MakeLive => current != self.target(),
        }
    }

    pub fn notification_type(&self) -> &'static str {
        match self {
            TransitionAction::Approve => "auction_approved",
            TransitionAction::Reject => "auction_rejected",
            TransitionAction::RequestInfo => "auction_info_requested",
            TransitionAction::MakeLive => "auction_live",
        }
    }

    pub fn notification_title(&self) -> &'static str {
        match self {
            TransitionAction::Approve => "Auction Approved",
            TransitionAction::Reject => "Auction Rejected",
            TransitionAction::RequestInfo => "More Information Requested",
            TransitionAction::MakeLive => "Auction Is Live",
        }
    }
}

impl fmt::Display for TransitionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// endregion: --- Transition Action

// region:    --- Command / Outcome / Error

/// One admin-triggered transition request. Actor identity always comes
/// from the caller's authenticated session, never from a constant.
#[derive(Debug, Clone)]
pub struct TransitionCommand {
    pub listing_id: i64,
    pub action: TransitionAction,
    pub admin_id: i64,
    pub admin_name: String,
    pub reason: Option<String>,
    pub message: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// What a committed transition produced. `audit`/`notification` are `None`
/// when the secondary write failed (or, for the notification, when the
/// listing has no seller), so callers can observe partial side effects.
#[derive(Debug)]
pub struct TransitionOutcome {
    pub listing: Listing,
    pub old_status: ListingStatus,
    pub audit: Option<AuditLogEntry>,
    pub notification: Option<NotificationOutboxEntry>,
}

impl TransitionOutcome {
    pub fn notification_sent(&self) -> bool {
        self.notification.is_some()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    #[error("listing {0} not found")]
    NotFound(i64),
    #[error("unknown action: {0}")]
    InvalidAction(String),
    #[error("cannot {action} a listing in status '{current}'")]
    InvalidTransition {
        action: TransitionAction,
        current: ListingStatus,
    },
    #[error("a rejection reason is required")]
    MissingReason,
    #[error("a message to the seller is required")]
    MissingMessage,
    #[error("listing {0} was modified by another admin, retry")]
    ConcurrentModification(i64),
    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),
}

impl TransitionError {
    pub fn code(&self) -> &'static str {
        match self {
            TransitionError::NotFound(_) => "NOT_FOUND",
            TransitionError::InvalidAction(_) => "INVALID_ACTION",
            TransitionError::InvalidTransition { .. } => "INVALID_TRANSITION",
            TransitionError::MissingReason => "MISSING_REASON",
            TransitionError::MissingMessage => "MISSING_MESSAGE",
            TransitionError::ConcurrentModification(_) => "CONCURRENT_MODIFICATION",
            TransitionError::Store(_) => "STORE_ERROR",
        }
    }
}

// endregion: --- Command / Outcome / Error

// region:    --- Apply Transition

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |s| s.trim().is_empty())
}

/// Apply one admin transition: load, validate, write the status with its
/// `updated_at` guard, then append audit and notification entries.
pub async fn apply_transition(
    cmd: TransitionCommand,
    store: &impl ListingStore,
    audit: &impl AuditLog,
    outbox: &impl NotificationOutbox,
) -> Result<TransitionOutcome, TransitionError> {
    info!(
        "{:<12} --> {} listing {} by admin {} ({})",
        "Lifecycle", cmd.action, cmd.listing_id, cmd.admin_id, cmd.admin_name
    );

    let listing = store
        .get(cmd.listing_id)
        .await?
        .ok_or(TransitionError::NotFound(cmd.listing_id))?;

    // Transition-specific inputs are checked before the source state, so a
    // blank reason fails the same way whatever status the listing is in.
    match cmd.action {
        TransitionAction::Reject if is_blank(&cmd.reason) => {
            return Err(TransitionError::MissingReason)
        }
        TransitionAction::RequestInfo if is_blank(&cmd.message) => {
            return Err(TransitionError::MissingMessage)
        }
        _ => {}
    }

    let old_status = listing.status;
    if !cmd.action.allows_source(old_status) {
        return Err(TransitionError::InvalidTransition {
            action: cmd.action,
            current: old_status,
        });
    }

    let new_status = cmd.action.target();
    let updated = store
        .update_status(listing.id, new_status, listing.updated_at)
        .await?
        .ok_or(TransitionError::ConcurrentModification(listing.id))?;

    info!(
        "{:<12} --> listing {} committed: {} -> {}",
        "Lifecycle", updated.id, old_status, new_status
    );

    // The status write is authoritative from here on. Audit and outbox
    // appends may fail without undoing it.
    let audit_entry = match audit
        .append(build_audit_entry(&cmd, &updated, old_status, new_status))
        .await
    {
        Ok(entry) => Some(entry),
        Err(e) => {
            warn!(
                "{:<12} --> audit append failed for listing {}: {}",
                "Lifecycle", updated.id, e
            );
            None
        }
    };

    let notification = match updated.seller_id {
        Some(seller_id) => {
            match outbox
                .append(build_notification(
                    &cmd, &updated, seller_id, old_status, new_status,
                ))
                .await
            {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(
                        "{:<12} --> notification append failed for listing {}: {}",
                        "Lifecycle", updated.id, e
                    );
                    None
                }
            }
        }
        None => None,
    };

    Ok(TransitionOutcome {
        listing: updated,
        old_status,
        audit: audit_entry,
        notification,
    })
}

fn build_audit_entry(
    cmd: &TransitionCommand,
    listing: &Listing,
    old_status: ListingStatus,
    new_status: ListingStatus,
) -> NewAuditLogEntry {
    NewAuditLogEntry {
        action_type: cmd.action.as_str().to_string(),
        resource_type: "auction".to_string(),
        resource_id: listing.id,
        admin_id: cmd.admin_id,
        admin_name: cmd.admin_name.clone(),
        old_values: serde_json::json!({ "status": old_status }),
        new_values: serde_json::json!({ "status": new_status }),
        reason: cmd.reason.clone().or_else(|| cmd.message.clone()),
        ip_address: cmd.ip_address.clone(),
        user_agent: cmd.user_agent.clone(),
    }
}

fn build_notification(
    cmd: &TransitionCommand,
    listing: &Listing,
    seller_id: i64,
    old_status: ListingStatus,
    new_status: ListingStatus,
) -> NewNotification {
    let message = match cmd.action {
        TransitionAction::Approve => {
            format!("Your auction \"{}\" has been approved.", listing.title)
        }
        TransitionAction::Reject => format!(
            "Your auction \"{}\" has been rejected. Reason: {}",
            listing.title,
            cmd.reason.as_deref().unwrap_or_default()
        ),
        TransitionAction::RequestInfo => format!(
            "An administrator requested more information about \"{}\": {}",
            listing.title,
            cmd.message.as_deref().unwrap_or_default()
        ),
        TransitionAction::MakeLive => {
            format!("Your auction \"{}\" is now live.", listing.title)
        }
    };

    NewNotification {
        user_id: seller_id,
        notification_type: cmd.action.notification_type().to_string(),
        title: cmd.action.notification_title().to_string(),
        message,
        data: serde_json::json!({
            "listing_id": listing.id,
            "action": cmd.action,
            "old_status": old_status,
            "new_status": new_status,
            "admin_name": cmd.admin_name,
            "timestamp": Utc::now(),
        }),
    }
}

// endregion: --- Apply Transition

// region:    --- Tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_parses_wire_names() {
        assert_eq!(
            TransitionAction::parse("approve"),
            Some(TransitionAction::Approve)
        );
        assert_eq!(
            TransitionAction::parse("request_info"),
            Some(TransitionAction::RequestInfo)
        );
        assert_eq!(TransitionAction::parse("delete"), None);
        assert_eq!(TransitionAction::parse(""), None);
    }

    #[test]
    fn approve_and_reject_only_act_on_the_review_queue() {
        for action in [TransitionAction::Approve, TransitionAction::Reject] {
            for source in [
                ListingStatus::Draft,
                ListingStatus::PendingReview,
                ListingStatus::NeedsInfo,
            ] {
                assert!(action.allows_source(source), "{action} from {source}");
            }
            for source in [
                ListingStatus::Approved,
                ListingStatus::Live,
                ListingStatus::Ended,
                ListingStatus::Rejected,
            ] {
                assert!(!action.allows_source(source), "{action} from {source}");
            }
        }
    }

    #[test]
    fn permissive_actions_reject_only_their_own_target() {
        assert!(!TransitionAction::RequestInfo.allows_source(ListingStatus::NeedsInfo));
        assert!(TransitionAction::RequestInfo.allows_source(ListingStatus::Live));
        assert!(TransitionAction::RequestInfo.allows_source(ListingStatus::Rejected));

        assert!(!TransitionAction::MakeLive.allows_source(ListingStatus::Live));
        assert!(TransitionAction::MakeLive.allows_source(ListingStatus::Draft));
        assert!(TransitionAction::MakeLive.allows_source(ListingStatus::Ended));
    }

    #[test]
    fn invalid_transition_message_names_the_current_status() {
        let err = TransitionError::InvalidTransition {
            action: TransitionAction::Approve,
            current: ListingStatus::Live,
        };
        assert!(err.to_string().contains("live"));
        assert!(err.to_string().contains("approve"));
    }
}

// endregion: --- Tests
