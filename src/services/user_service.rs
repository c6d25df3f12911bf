//! User service

use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    constants::actions,
    db::repositories::UserRepository,
    error::{AppError, AppResult},
    models::User,
    services::ActivityService,
};

/// User service for business logic
pub struct UserService;

impl UserService {
    /// Get user by ID
    pub async fn get_user_by_id(pool: &PgPool, id: &Uuid) -> AppResult<User> {
        UserRepository::find_by_id(pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Update the user's preferences
    pub async fn update_profile(
        pool: &PgPool,
        id: &Uuid,
        language_code: Option<&str>,
        ip_address: Option<&str>,
    ) -> AppResult<User> {
        let language_code = language_code.map(|code| code.trim().to_ascii_lowercase());

        let user = UserRepository::update_profile(pool, id, language_code.as_deref()).await?;

        ActivityService::record(
            pool,
            id,
            actions::PROFILE_UPDATE,
            Some(json!({ "language_code": language_code })),
            ip_address,
        )
        .await;

        Ok(user)
    }
}
