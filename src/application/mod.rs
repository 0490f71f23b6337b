//! Application layer services implementing business logic.
//!
//! Services consume repository traits and expose the operations HTTP handlers
//! and the admin CLI call into.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Short link allocation, resolution and deactivation
//! - [`services::token_service::TokenService`] - Signed access/refresh tokens and their cookies
//! - [`services::session_guard::SessionGuard`] - Cookie-to-identity authentication
//! - [`services::account_service::AccountService`] - Registration, login and session rotation

pub mod services;
