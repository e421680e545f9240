//! Request middleware.

pub mod auth;

pub use auth::{SESSION_COOKIE, expired_session_cookie, session_cookie, session_middleware};
