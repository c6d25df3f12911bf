//! User response DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{ActivityLog, Session, User};

/// User profile response
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
    pub display_name: String,
    pub language_code: Option<String>,
    pub is_premium: bool,
    pub photo_url: Option<String>,
    pub allows_write_to_pm: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            display_name: user.display_name(),
            id: user.id,
            telegram_id: user.telegram_id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            language_code: user.language_code,
            is_premium: user.is_premium,
            photo_url: user.photo_url,
            allows_write_to_pm: user.allows_write_to_pm,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
        }
    }
}

/// Active session entry
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: Uuid,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// True for the session the request was made with
    pub current: bool,
}

impl SessionResponse {
    pub fn new(session: Session, current_session_id: &Uuid) -> Self {
        Self {
            current: &session.id == current_session_id,
            id: session.id,
            user_agent: session.user_agent,
            ip_address: session.ip_address,
            created_at: session.created_at,
            last_activity_at: session.last_activity_at,
            expires_at: session.expires_at,
        }
    }
}

/// Active sessions response
#[derive(Debug, Serialize)]
pub struct SessionsListResponse {
    pub sessions: Vec<SessionResponse>,
}

/// Activity log response
#[derive(Debug, Serialize)]
pub struct ActivityListResponse {
    pub activity: Vec<ActivityLog>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}
