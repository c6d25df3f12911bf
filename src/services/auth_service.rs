//! Authentication service

use serde_json::json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::{
    constants::actions,
    db::repositories::UserRepository,
    error::AppResult,
    models::User,
    services::{
        jwt::JwtManager,
        session_service::{ClientMetadata, IssuedSession, SessionService},
        ActivityService,
    },
    telegram::InitDataValidator,
};

/// Authentication service
pub struct AuthService;

impl AuthService {
    /// Sign in with Telegram launch data.
    ///
    /// Verifies the init data signature, creates or refreshes the user,
    /// then opens a new session.
    pub async fn login_with_telegram(
        pool: &PgPool,
        validator: &InitDataValidator,
        jwt: &JwtManager,
        raw_init_data: &str,
        client: &ClientMetadata,
    ) -> AppResult<(User, IssuedSession)> {
        let init_data = validator.validate(raw_init_data)?;

        let user = UserRepository::upsert_from_telegram(pool, &init_data.user).await?;
        let issued = SessionService::create(pool, jwt, &user, client).await?;

        info!(
            user_id = %user.id,
            telegram_id = user.telegram_id,
            session_id = %issued.session.id,
            "User signed in"
        );

        ActivityService::record(
            pool,
            &user.id,
            actions::LOGIN,
            Some(json!({
                "session_id": issued.session.id,
                "start_param": init_data.start_param,
                "chat_type": init_data.chat_type,
            })),
            client.ip_address.as_deref(),
        )
        .await;

        Ok((user, issued))
    }

    /// Reissue the token of the caller's session
    pub async fn refresh(
        pool: &PgPool,
        jwt: &JwtManager,
        user_id: &Uuid,
        telegram_id: i64,
        session_id: &Uuid,
        ip_address: Option<&str>,
    ) -> AppResult<IssuedSession> {
        let issued = SessionService::refresh(pool, jwt, session_id, user_id, telegram_id).await?;

        ActivityService::record(
            pool,
            user_id,
            actions::TOKEN_REFRESH,
            Some(json!({ "session_id": session_id })),
            ip_address,
        )
        .await;

        Ok(issued)
    }

    /// Logout the current session, or every session of the user
    pub async fn logout(
        pool: &PgPool,
        user_id: &Uuid,
        session_id: &Uuid,
        all_sessions: bool,
        ip_address: Option<&str>,
    ) -> AppResult<u64> {
        let (action, invalidated) = if all_sessions {
            (
                actions::LOGOUT_ALL,
                SessionService::invalidate_all(pool, user_id).await?,
            )
        } else {
            SessionService::invalidate(pool, session_id).await?;
            (actions::LOGOUT, 1)
        };

        info!(user_id = %user_id, all_sessions, invalidated, "User logged out");

        ActivityService::record(
            pool,
            user_id,
            action,
            Some(json!({ "session_id": session_id, "invalidated": invalidated })),
            ip_address,
        )
        .await;

        Ok(invalidated)
    }
}
