//! User request DTOs

use serde::Deserialize;
use validator::Validate;

use crate::constants::{MAX_LANGUAGE_CODE_LENGTH, MIN_LANGUAGE_CODE_LENGTH};

/// Update profile request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = MIN_LANGUAGE_CODE_LENGTH, max = MAX_LANGUAGE_CODE_LENGTH))]
    pub language_code: Option<String>,
}
