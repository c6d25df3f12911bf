//! Activity log service

use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::{
    db::repositories::ActivityRepository,
    error::AppResult,
    models::ActivityLog,
    utils::pagination::Pagination,
};

/// Activity log service
pub struct ActivityService;

impl ActivityService {
    /// Record an action for a user.
    ///
    /// Failures are logged and swallowed so that auditing never fails the
    /// request that triggered it.
    pub async fn record(
        pool: &PgPool,
        user_id: &Uuid,
        action: &str,
        details: Option<serde_json::Value>,
        ip_address: Option<&str>,
    ) {
        if let Err(e) =
            ActivityRepository::create(pool, user_id, action, details.as_ref(), ip_address).await
        {
            warn!(user_id = %user_id, action, error = %e, "Failed to record activity");
        }
    }

    /// List a user's activity
    pub async fn list(
        pool: &PgPool,
        user_id: &Uuid,
        pagination: Pagination,
    ) -> AppResult<(Vec<ActivityLog>, i64)> {
        ActivityRepository::list_for_user(pool, user_id, pagination.offset(), pagination.limit())
            .await
    }
}
