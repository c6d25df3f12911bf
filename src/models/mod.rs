//! Domain models
//!
//! This module contains all domain models used throughout the application.

pub mod activity_log;
pub mod session;
pub mod user;

pub use activity_log::*;
pub use session::*;
pub use user::*;
