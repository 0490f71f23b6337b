//! Business logic services for the application layer.

pub mod account_service;
pub mod link_service;
pub mod session_guard;
pub mod token_service;

pub use account_service::{AccountService, AuthSession};
pub use link_service::{LinkService, LinkSettings};
pub use session_guard::{GuardMode, SessionGuard};
pub use token_service::{SessionTokens, TokenService, TokenSettings};
