// region:    --- Imports
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;
// endregion: --- Imports

// region:    --- Audit Model

/// Immutable record of one committed admin transition.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditLogEntry {
    pub id: i64,
    pub action_type: String,
    pub resource_type: String,
    pub resource_id: i64,
    pub admin_id: i64,
    pub admin_name: String,
    pub old_values: serde_json::Value,
    pub new_values: serde_json::Value,
    pub reason: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Entry as built by the engine, before the store assigns id/created_at.
#[derive(Debug, Clone)]
pub struct NewAuditLogEntry {
    pub action_type: String,
    pub resource_type: String,
    pub resource_id: i64,
    pub admin_id: i64,
    pub admin_name: String,
    pub old_values: serde_json::Value,
    pub new_values: serde_json::Value,
    pub reason: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

// endregion: --- Audit Model

// region:    --- Audit Log Trait

/// Append-only sink. The core has no read side; audit history queries are
/// an admin-UI concern.
#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn append(&self, entry: NewAuditLogEntry) -> Result<AuditLogEntry, sqlx::Error>;
}

// endregion: --- Audit Log Trait

// region:    --- Postgres Audit Log

const APPEND_AUDIT_ENTRY: &str = r#"
    INSERT INTO audit_log
        (action_type, resource_type, resource_id, admin_id, admin_name,
         old_values, new_values, reason, ip_address, user_agent)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
    RETURNING *
"#;

pub struct PostgresAuditLog {
    pool: Arc<PgPool>,
}

impl PostgresAuditLog {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLog for PostgresAuditLog {
    async fn append(&self, entry: NewAuditLogEntry) -> Result<AuditLogEntry, sqlx::Error> {
        sqlx::query_as::<_, AuditLogEntry>(APPEND_AUDIT_ENTRY)
            .bind(&entry.action_type)
            .bind(&entry.resource_type)
            .bind(entry.resource_id)
            .bind(entry.admin_id)
            .bind(&entry.admin_name)
            .bind(&entry.old_values)
            .bind(&entry.new_values)
            .bind(&entry.reason)
            .bind(&entry.ip_address)
            .bind(&entry.user_agent)
            .fetch_one(&*self.pool)
            .await
    }
}

// endregion: --- Postgres Audit Log
