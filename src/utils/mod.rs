//! Utility functions

pub mod crypto;
pub mod pagination;

pub use crypto::hash_string;
pub use pagination::{PageQuery, Pagination};
