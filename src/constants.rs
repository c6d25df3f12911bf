//! Application-wide constants
//!
//! This module contains all constant values used throughout the application.
//! Constants are grouped by their purpose for better organization.

// =============================================================================
// SERVER DEFAULTS
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// Request timeout in seconds
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum accepted request body size (64 KB)
pub const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

// =============================================================================
// DATABASE DEFAULTS
// =============================================================================

/// Default maximum database connections in the pool
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

// =============================================================================
// TELEGRAM
// =============================================================================

/// Key used to derive the init-data secret from the bot token
pub const WEB_APP_DATA_KEY: &[u8] = b"WebAppData";

/// Default maximum age of init data in seconds (24 hours)
pub const DEFAULT_INIT_DATA_MAX_AGE_SECS: i64 = 86_400;

/// Tolerated clock skew for `auth_date` values in the future
pub const INIT_DATA_CLOCK_SKEW_SECS: i64 = 60;

/// Maximum accepted length of a raw init data string
pub const MAX_INIT_DATA_LENGTH: u64 = 4096;

// =============================================================================
// AUTHENTICATION DEFAULTS
// =============================================================================

/// Default JWT token expiry in hours
pub const DEFAULT_JWT_EXPIRY_HOURS: i64 = 24;

/// Minimum JWT secret length in bytes
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Token type stored in access token claims
pub const ACCESS_TOKEN_TYPE: &str = "access";

/// Default interval between expired-session sweeps
pub const DEFAULT_SESSION_CLEANUP_INTERVAL_SECS: u64 = 3600;

/// How long revoked sessions are kept before the sweeper deletes them
pub const REVOKED_SESSION_RETENTION_DAYS: i64 = 7;

// =============================================================================
// ACTIVITY LOG ACTIONS
// =============================================================================

/// Activity log action identifiers
pub mod actions {
    pub const LOGIN: &str = "login";
    pub const LOGOUT: &str = "logout";
    pub const LOGOUT_ALL: &str = "logout_all";
    pub const TOKEN_REFRESH: &str = "token_refresh";
    pub const SESSION_REVOKED: &str = "session_revoked";
    pub const PROFILE_UPDATE: &str = "profile_update";
}

// =============================================================================
// API VERSIONING
// =============================================================================

/// API base path
pub const API_BASE_PATH: &str = "/api/v1";

// =============================================================================
// RATE LIMITING
// =============================================================================

/// Rate limiting configuration
pub mod rate_limits {
    /// Auth endpoint - max requests
    pub const AUTH_MAX_REQUESTS: i64 = 10;
    /// Auth endpoint - window in seconds
    pub const AUTH_WINDOW_SECS: i64 = 60;

    /// General API - max requests
    pub const GENERAL_MAX_REQUESTS: i64 = 120;
    /// General API - window in seconds
    pub const GENERAL_WINDOW_SECS: i64 = 60;
}

// =============================================================================
// PAGINATION
// =============================================================================

/// Default page size for paginated results
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Maximum page size for paginated results
pub const MAX_PAGE_SIZE: u32 = 100;

// =============================================================================
// VALIDATION
// =============================================================================

/// Minimum language code length (e.g. "en")
pub const MIN_LANGUAGE_CODE_LENGTH: u64 = 2;

/// Maximum language code length (e.g. "pt-br")
pub const MAX_LANGUAGE_CODE_LENGTH: u64 = 10;
