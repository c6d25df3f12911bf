//! Session repository

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{error::AppResult, models::Session};

/// Repository for session database operations
pub struct SessionRepository;

impl SessionRepository {
    /// Create a new active session
    pub async fn create(
        pool: &PgPool,
        id: &Uuid,
        user_id: &Uuid,
        token_hash: &str,
        user_agent: Option<&str>,
        ip_address: Option<&str>,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Session> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (id, user_id, token_hash, user_agent, ip_address, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(token_hash)
        .bind(user_agent)
        .bind(ip_address)
        .bind(expires_at)
        .fetch_one(pool)
        .await?;

        Ok(session)
    }

    /// Find session by ID
    pub async fn find_by_id(pool: &PgPool, id: &Uuid) -> AppResult<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(r#"SELECT * FROM sessions WHERE id = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(session)
    }

    /// List active, unexpired sessions for a user, newest activity first
    pub async fn list_active(pool: &PgPool, user_id: &Uuid) -> AppResult<Vec<Session>> {
        let sessions = sqlx::query_as::<_, Session>(
            r#"
            SELECT * FROM sessions
            WHERE user_id = $1 AND is_active AND expires_at > NOW()
            ORDER BY last_activity_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(sessions)
    }

    /// Update last activity time
    pub async fn touch(pool: &PgPool, id: &Uuid) -> AppResult<()> {
        sqlx::query(r#"UPDATE sessions SET last_activity_at = NOW() WHERE id = $1"#)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Replace the token hash and push out the expiry of an active session
    pub async fn rotate(
        pool: &PgPool,
        id: &Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            UPDATE sessions
            SET token_hash = $2, expires_at = $3, last_activity_at = NOW()
            WHERE id = $1 AND is_active
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(token_hash)
        .bind(expires_at)
        .fetch_optional(pool)
        .await?;

        Ok(session)
    }

    /// Deactivate a session. Returns whether a row changed.
    pub async fn deactivate(pool: &PgPool, id: &Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            r#"UPDATE sessions SET is_active = false WHERE id = $1 AND is_active"#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deactivate a session only if it belongs to `user_id`
    pub async fn deactivate_for_user(pool: &PgPool, id: &Uuid, user_id: &Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE sessions SET is_active = false
            WHERE id = $1 AND user_id = $2 AND is_active
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deactivate every active session of a user
    pub async fn deactivate_all_for_user(pool: &PgPool, user_id: &Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            r#"UPDATE sessions SET is_active = false WHERE user_id = $1 AND is_active"#,
        )
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Delete expired sessions and inactive ones older than `inactive_before`
    pub async fn delete_stale(pool: &PgPool, inactive_before: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM sessions
            WHERE expires_at <= NOW()
               OR (NOT is_active AND last_activity_at < $1)
            "#,
        )
        .bind(inactive_before)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}
