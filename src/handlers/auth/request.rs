//! Authentication request DTOs

use serde::Deserialize;
use validator::Validate;

use crate::{
    constants::MAX_INIT_DATA_LENGTH,
    error::{AppError, AppResult},
};

/// Telegram sign-in request
#[derive(Debug, Deserialize, Validate)]
pub struct TelegramAuthRequest {
    /// Raw `Telegram.WebApp.initData` string
    #[validate(length(min = 1, max = MAX_INIT_DATA_LENGTH))]
    pub init_data: String,
}

/// Logout request
#[derive(Debug, Default, Deserialize)]
pub struct LogoutRequest {
    /// Invalidate all sessions of the user if true
    #[serde(default)]
    pub all_sessions: bool,
}

impl LogoutRequest {
    /// Parse the optional JSON body. An empty body means the defaults.
    pub fn from_body(body: &[u8]) -> AppResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        serde_json::from_slice(body)
            .map_err(|e| AppError::Validation(format!("Invalid logout body: {}", e)))
    }
}
