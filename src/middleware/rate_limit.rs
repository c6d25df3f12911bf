//! Rate limiting middleware
//!
//! Fixed-window counters in Redis keyed by client IP and endpoint bucket.
//! Disabled when no Redis connection is configured.

use std::net::IpAddr;

use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::{
    constants::{rate_limits, API_BASE_PATH},
    error::AppError,
    middleware::client::{client_ip, peer_addr},
    state::AppState,
};

/// Rate limit middleware
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let Some(mut redis) = state.redis() else {
        return Ok(next.run(request).await);
    };

    let ip = client_ip(
        request.headers(),
        peer_addr(request.extensions()),
        &state.config().server.trusted_proxies,
    );

    let bucket = path_bucket(request.uri().path());
    let (limit, window) = get_rate_limit(bucket);
    let key = rate_limit_key(ip, bucket);

    let counted: redis::RedisResult<(i64,)> =
        window_pipeline(&key, window).query_async(&mut redis).await;
    let count = match counted {
        Ok((count,)) => count,
        Err(e) => {
            // Fail open: a Redis outage must not take the API down
            warn!(error = %e, "Rate limiter unavailable");
            return Ok(next.run(request).await);
        }
    };

    if count > limit {
        warn!(key = %key, count, "Rate limit exceeded");
        return Err(AppError::TooManyRequests);
    }

    Ok(next.run(request).await)
}

/// Open the window with its TTL if absent, then count the request.
/// Runs as one MULTI/EXEC so a counter never exists without an expiry.
fn window_pipeline(key: &str, window_secs: i64) -> redis::Pipeline {
    let mut pipe = redis::pipe();
    pipe.atomic()
        .cmd("SET")
        .arg(key)
        .arg(0)
        .arg("NX")
        .arg("EX")
        .arg(window_secs)
        .ignore()
        .incr(key, 1);
    pipe
}

fn rate_limit_key(ip: Option<IpAddr>, bucket: &str) -> String {
    match ip {
        Some(ip) => format!("rate_limit:{}:{}", ip, bucket),
        None => format!("rate_limit:unknown:{}", bucket),
    }
}

/// Get rate limit for a bucket
fn get_rate_limit(bucket: &str) -> (i64, i64) {
    match bucket {
        "auth" => (
            rate_limits::AUTH_MAX_REQUESTS,
            rate_limits::AUTH_WINDOW_SECS,
        ),
        _ => (
            rate_limits::GENERAL_MAX_REQUESTS,
            rate_limits::GENERAL_WINDOW_SECS,
        ),
    }
}

/// Get bucket for path (for grouping similar endpoints)
fn path_bucket(path: &str) -> &'static str {
    match path.strip_prefix(API_BASE_PATH) {
        Some(rest) if rest.starts_with("/auth/telegram") => "auth",
        _ => "general",
    }
}
