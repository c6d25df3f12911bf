//! Database repositories
//!
//! Repositories handle all direct database interactions.

pub mod activity_repo;
pub mod session_repo;
pub mod user_repo;

pub use activity_repo::ActivityRepository;
pub use session_repo::SessionRepository;
pub use user_repo::UserRepository;
