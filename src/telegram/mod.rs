//! Telegram Web App integration
//!
//! Mini Apps receive their launch parameters (`initData`) from the Telegram
//! client as a URL-encoded string signed with a key derived from the bot
//! token. This module parses and verifies that string.

pub mod init_data;
pub mod user;

pub use init_data::{InitData, InitDataError, InitDataValidator};
pub use user::TelegramUser;
