//! User handler implementations

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    constants::actions,
    error::AppResult,
    middleware::auth::AuthenticatedUser,
    services::{ActivityService, ClientMetadata, SessionService, UserService},
    state::AppState,
    utils::{PageQuery, Pagination},
};

use super::{
    request::UpdateProfileRequest,
    response::{ActivityListResponse, SessionResponse, SessionsListResponse, UserResponse},
};

/// Get the caller's profile
pub async fn get_profile(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> AppResult<Json<UserResponse>> {
    let user = UserService::get_user_by_id(state.db(), &auth_user.user_id).await?;
    Ok(Json(user.into()))
}

/// Update the caller's preferences
pub async fn update_profile(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    client: ClientMetadata,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<Json<UserResponse>> {
    payload.validate()?;

    let user = UserService::update_profile(
        state.db(),
        &auth_user.user_id,
        payload.language_code.as_deref(),
        client.ip_address.as_deref(),
    )
    .await?;

    Ok(Json(user.into()))
}

/// List the caller's active sessions
pub async fn list_sessions(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> AppResult<Json<SessionsListResponse>> {
    let sessions = SessionService::list_active(state.db(), &auth_user.user_id)
        .await?
        .into_iter()
        .map(|s| SessionResponse::new(s, &auth_user.session_id))
        .collect();

    Ok(Json(SessionsListResponse { sessions }))
}

/// Revoke one of the caller's sessions
pub async fn revoke_session(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    client: ClientMetadata,
    Path(session_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    SessionService::revoke(state.db(), &auth_user.user_id, &session_id).await?;

    ActivityService::record(
        state.db(),
        &auth_user.user_id,
        actions::SESSION_REVOKED,
        Some(json!({ "session_id": session_id })),
        client.ip_address.as_deref(),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

/// Get the caller's activity history
pub async fn list_activity(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<ActivityListResponse>> {
    let pagination = Pagination::from(query);

    let (activity, total) =
        ActivityService::list(state.db(), &auth_user.user_id, pagination).await?;

    Ok(Json(ActivityListResponse {
        activity,
        total,
        page: pagination.page,
        per_page: pagination.per_page,
    }))
}
