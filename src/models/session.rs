//! Session model

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Server-side session backing an issued JWT
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(skip_serializing)]
    pub token_hash: String,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Check if the session has passed its expiry time
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Check if the session can authenticate a request carrying `token_hash`
    pub fn is_valid_for(&self, token_hash: &str, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_expired_at(now) && self.token_hash == token_hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(is_active: bool, expires_in: Duration) -> Session {
        let now = Utc::now();
        Session {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            token_hash: "abc".to_string(),
            user_agent: None,
            ip_address: None,
            is_active,
            created_at: now,
            last_activity_at: now,
            expires_at: now + expires_in,
        }
    }

    #[test]
    fn test_active_session_is_valid() {
        let s = session(true, Duration::hours(1));
        assert!(s.is_valid_for("abc", Utc::now()));
    }

    #[test]
    fn test_token_hash_must_match() {
        let s = session(true, Duration::hours(1));
        assert!(!s.is_valid_for("abd", Utc::now()));
    }

    #[test]
    fn test_revoked_session_is_invalid() {
        let s = session(false, Duration::hours(1));
        assert!(!s.is_valid_for("abc", Utc::now()));
    }

    #[test]
    fn test_expired_session_is_invalid() {
        let s = session(true, Duration::seconds(-1));
        assert!(s.is_expired_at(Utc::now()));
        assert!(!s.is_valid_for("abc", Utc::now()));
    }
}
