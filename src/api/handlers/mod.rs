//! HTTP request handlers.

pub mod auth_handler;
pub mod password_reset_handler;
pub mod user_handler;
