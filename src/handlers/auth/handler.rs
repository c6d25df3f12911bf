//! Authentication handler implementations

use axum::{body::Bytes, extract::State, Json};
use validator::Validate;

use crate::{
    error::AppResult,
    middleware::auth::AuthenticatedUser,
    services::{AuthService, ClientMetadata, UserService},
    state::AppState,
};

use super::{
    request::{LogoutRequest, TelegramAuthRequest},
    response::{AuthResponse, CurrentUserResponse, LogoutResponse, RefreshResponse},
};

const TOKEN_TYPE: &str = "Bearer";

/// Sign in with Telegram init data
pub async fn telegram_login(
    State(state): State<AppState>,
    client: ClientMetadata,
    Json(payload): Json<TelegramAuthRequest>,
) -> AppResult<Json<AuthResponse>> {
    payload.validate()?;

    let (user, issued) = AuthService::login_with_telegram(
        state.db(),
        state.init_data(),
        state.jwt(),
        &payload.init_data,
        &client,
    )
    .await?;

    Ok(Json(AuthResponse {
        access_token: issued.access_token,
        token_type: TOKEN_TYPE.to_string(),
        expires_in: state.jwt().expiry_seconds(),
        expires_at: issued.expires_at,
        session_id: issued.session.id,
        user: user.into(),
    }))
}

/// Reissue the token for the current session
pub async fn refresh_token(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    client: ClientMetadata,
) -> AppResult<Json<RefreshResponse>> {
    let issued = AuthService::refresh(
        state.db(),
        state.jwt(),
        &auth_user.user_id,
        auth_user.telegram_id,
        &auth_user.session_id,
        client.ip_address.as_deref(),
    )
    .await?;

    Ok(Json(RefreshResponse {
        access_token: issued.access_token,
        token_type: TOKEN_TYPE.to_string(),
        expires_in: state.jwt().expiry_seconds(),
        expires_at: issued.expires_at,
        session_id: issued.session.id,
    }))
}

/// Logout (invalidate the current session or all sessions)
pub async fn logout(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    client: ClientMetadata,
    body: Bytes,
) -> AppResult<Json<LogoutResponse>> {
    let all_sessions = LogoutRequest::from_body(&body)?.all_sessions;

    let sessions_invalidated = AuthService::logout(
        state.db(),
        &auth_user.user_id,
        &auth_user.session_id,
        all_sessions,
        client.ip_address.as_deref(),
    )
    .await?;

    Ok(Json(LogoutResponse {
        message: "Logged out successfully".to_string(),
        sessions_invalidated,
    }))
}

/// Get current authenticated user
pub async fn get_current_user(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> AppResult<Json<CurrentUserResponse>> {
    let user = UserService::get_user_by_id(state.db(), &auth_user.user_id).await?;

    Ok(Json(CurrentUserResponse {
        user: user.into(),
        session_id: auth_user.session_id,
    }))
}
