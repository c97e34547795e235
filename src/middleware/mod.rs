//! Middleware components
//!
//! Authentication (JWT) and request-origin extraction.

pub mod auth;
pub mod client_ip;

pub use auth::{auth_middleware, AuthUser, Claims};
pub use client_ip::ClientIp;
