//! Application state management
//!
//! This module contains the shared application state that is passed
//! to all request handlers via Axum's State extractor.

use std::sync::Arc;

use redis::aio::ConnectionManager;
use sqlx::PgPool;

use crate::{config::Config, services::JwtManager, telegram::InitDataValidator};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

/// Inner state (wrapped in Arc for cheap cloning)
struct AppStateInner {
    /// Database connection pool
    db: PgPool,

    /// Redis connection manager, present when rate limiting is enabled
    redis: Option<ConnectionManager>,

    /// Telegram init data validator
    init_data: InitDataValidator,

    /// Session token signer
    jwt: JwtManager,

    /// Application configuration
    config: Config,
}

impl AppState {
    /// Create a new application state
    pub fn new(db: PgPool, redis: Option<ConnectionManager>, config: Config) -> Self {
        let init_data = InitDataValidator::new(
            &config.telegram.bot_token,
            config.telegram.init_data_max_age_secs,
        );
        let jwt = JwtManager::new(&config.jwt.secret, config.jwt.expiry_seconds());

        Self {
            inner: Arc::new(AppStateInner {
                db,
                redis,
                init_data,
                jwt,
                config,
            }),
        }
    }

    /// Get a reference to the database pool
    pub fn db(&self) -> &PgPool {
        &self.inner.db
    }

    /// Get a clone of the Redis connection manager, if configured
    pub fn redis(&self) -> Option<ConnectionManager> {
        self.inner.redis.clone()
    }

    /// Get the init data validator
    pub fn init_data(&self) -> &InitDataValidator {
        &self.inner.init_data
    }

    /// Get the JWT manager
    pub fn jwt(&self) -> &JwtManager {
        &self.inner.jwt
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }
}
