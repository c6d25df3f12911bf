//! Business logic services

pub mod activity_service;
pub mod auth_service;
pub mod jwt;
pub mod session_service;
pub mod user_service;

pub use activity_service::ActivityService;
pub use auth_service::AuthService;
pub use jwt::{Claims, JwtManager};
pub use session_service::{ClientMetadata, IssuedSession, SessionService};
pub use user_service::UserService;
