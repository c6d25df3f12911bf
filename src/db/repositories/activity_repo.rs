//! Activity log repository

use sqlx::PgPool;
use uuid::Uuid;

use crate::{error::AppResult, models::ActivityLog};

/// Repository for activity log database operations
pub struct ActivityRepository;

impl ActivityRepository {
    /// Append an activity entry
    pub async fn create(
        pool: &PgPool,
        user_id: &Uuid,
        action: &str,
        details: Option<&serde_json::Value>,
        ip_address: Option<&str>,
    ) -> AppResult<ActivityLog> {
        let entry = sqlx::query_as::<_, ActivityLog>(
            r#"
            INSERT INTO activity_logs (user_id, action, details, ip_address)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(action)
        .bind(details)
        .bind(ip_address)
        .fetch_one(pool)
        .await?;

        Ok(entry)
    }

    /// List a user's activity with pagination, newest first
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: &Uuid,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<ActivityLog>, i64)> {
        let entries = sqlx::query_as::<_, ActivityLog>(
            r#"
            SELECT * FROM activity_logs
            WHERE user_id = $1
            ORDER BY created_at DESC
            OFFSET $2 LIMIT $3
            "#,
        )
        .bind(user_id)
        .bind(offset)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        let count: i64 =
            sqlx::query_scalar(r#"SELECT COUNT(*) FROM activity_logs WHERE user_id = $1"#)
                .bind(user_id)
                .fetch_one(pool)
                .await?;

        Ok((entries, count))
    }
}
