//! User handlers

mod handler;
pub mod request;
pub mod response;

pub use handler::*;
pub use request::*;
pub use response::*;

use axum::{
    routing::{delete, get},
    Router,
};

use crate::state::AppState;

/// User routes (all require authentication)
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(handler::get_profile).put(handler::update_profile))
        .route("/me/sessions", get(handler::list_sessions))
        .route("/me/sessions/{id}", delete(handler::revoke_session))
        .route("/me/activity", get(handler::list_activity))
}
