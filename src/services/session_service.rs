//! Session lifecycle service
//!
//! Every issued JWT is backed by a row in `sessions` so tokens can be revoked
//! before they expire. The row stores a SHA-256 of the token; a token is only
//! accepted while its session is active, unexpired and still holds that hash.

use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    constants::REVOKED_SESSION_RETENTION_DAYS,
    db::repositories::SessionRepository,
    error::{AppError, AppResult},
    models::{Session, User},
    services::jwt::{Claims, JwtManager},
    utils::hash_string,
};

/// Request metadata recorded alongside a session
#[derive(Debug, Clone, Default)]
pub struct ClientMetadata {
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

/// A freshly issued token and the session behind it
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub session: Session,
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Session service
pub struct SessionService;

impl SessionService {
    /// Create a session for `user` and issue its token
    pub async fn create(
        pool: &PgPool,
        jwt: &JwtManager,
        user: &User,
        client: &ClientMetadata,
    ) -> AppResult<IssuedSession> {
        let session_id = Uuid::new_v4();
        let (access_token, expires_at) = jwt.issue(user.id, user.telegram_id, session_id)?;

        let session = SessionRepository::create(
            pool,
            &session_id,
            &user.id,
            &hash_string(&access_token),
            client.user_agent.as_deref(),
            client.ip_address.as_deref(),
            expires_at,
        )
        .await?;

        debug!(user_id = %user.id, session_id = %session.id, "Session created");

        Ok(IssuedSession {
            session,
            access_token,
            expires_at,
        })
    }

    /// Check that `token` (already decoded into `claims`) is backed by a live
    /// session, and record activity on it
    pub async fn validate(pool: &PgPool, claims: &Claims, token: &str) -> AppResult<Session> {
        let session = SessionRepository::find_by_id(pool, &claims.sid)
            .await?
            .ok_or(AppError::SessionInvalid)?;

        if session.user_id != claims.sub {
            warn!(session_id = %session.id, "Token subject does not own the session");
            return Err(AppError::SessionInvalid);
        }

        let now = Utc::now();
        if session.is_active && session.is_expired_at(now) {
            SessionRepository::deactivate(pool, &session.id).await?;
            debug!(session_id = %session.id, "Deactivated expired session");
            return Err(AppError::SessionInvalid);
        }

        if !session.is_valid_for(&hash_string(token), now) {
            return Err(AppError::SessionInvalid);
        }

        SessionRepository::touch(pool, &session.id).await?;

        Ok(session)
    }

    /// Issue a new token for an existing session and extend its expiry.
    /// The previous token stops working immediately.
    pub async fn refresh(
        pool: &PgPool,
        jwt: &JwtManager,
        session_id: &Uuid,
        user_id: &Uuid,
        telegram_id: i64,
    ) -> AppResult<IssuedSession> {
        let (access_token, expires_at) = jwt.issue(*user_id, telegram_id, *session_id)?;

        let session =
            SessionRepository::rotate(pool, session_id, &hash_string(&access_token), expires_at)
                .await?
                .ok_or(AppError::SessionInvalid)?;

        Ok(IssuedSession {
            session,
            access_token,
            expires_at,
        })
    }

    /// Invalidate a single session
    pub async fn invalidate(pool: &PgPool, session_id: &Uuid) -> AppResult<()> {
        SessionRepository::deactivate(pool, session_id).await?;
        Ok(())
    }

    /// Invalidate every session of a user, returning how many were active
    pub async fn invalidate_all(pool: &PgPool, user_id: &Uuid) -> AppResult<u64> {
        SessionRepository::deactivate_all_for_user(pool, user_id).await
    }

    /// Revoke one of the user's own sessions
    pub async fn revoke(pool: &PgPool, user_id: &Uuid, session_id: &Uuid) -> AppResult<()> {
        if SessionRepository::deactivate_for_user(pool, session_id, user_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound("Session not found".to_string()))
        }
    }

    /// List the user's live sessions
    pub async fn list_active(pool: &PgPool, user_id: &Uuid) -> AppResult<Vec<Session>> {
        SessionRepository::list_active(pool, user_id).await
    }

    /// Delete expired sessions and long-revoked ones
    pub async fn cleanup_expired(pool: &PgPool) -> AppResult<u64> {
        SessionRepository::delete_stale(pool, retention_cutoff(Utc::now())).await
    }

    /// Spawn the periodic session sweeper
    pub fn spawn_sweeper(pool: PgPool, interval_secs: u64) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(StdDuration::from_secs(interval_secs));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            info!(interval_secs, "Session sweeper started");

            loop {
                interval.tick().await;
                match Self::cleanup_expired(&pool).await {
                    Ok(0) => debug!("Session sweep found nothing to delete"),
                    Ok(deleted) => info!(deleted, "Deleted stale sessions"),
                    Err(e) => warn!(error = %e, "Session sweep failed"),
                }
            }
        })
    }
}

/// Revoked sessions older than this are deleted by the sweeper
fn retention_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(REVOKED_SESSION_RETENTION_DAYS)
}
