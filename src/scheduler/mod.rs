//! Background job persisting the implicit `live -> ended` move. The read
//! path already derives `ended` from `end_time`; this keeps the stored
//! status in step for anything reading the table directly.

// region:    --- Imports
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::time::{interval, Duration};
use tracing::{debug, error};
// endregion: --- Imports

// region:    --- Status Scheduler

pub struct StatusScheduler {
    pool: Arc<PgPool>,
}

impl StatusScheduler {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    pub async fn start(&self) {
        let pool = Arc::clone(&self.pool);
        tokio::spawn(async move {
            let mut interval = interval(Duration::from_secs(1));
            loop {
                interval.tick().await;
                if let Err(e) = Self::end_expired_listings(&pool).await {
                    error!(
                        "{:<12} --> failed to end expired listings: {:?}",
                        "Scheduler", e
                    );
                }
            }
        });
    }

    async fn end_expired_listings(pool: &PgPool) -> Result<(), sqlx::Error> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE listings SET status = 'ended', updated_at = NOW()
             WHERE status = 'live' AND end_time <= $1",
        )
        .bind(now)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            debug!(
                "{:<12} --> ended {} expired listings",
                "Scheduler",
                result.rows_affected()
            );
        }

        Ok(())
    }
}

// endregion: --- Status Scheduler
