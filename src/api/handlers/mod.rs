//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod auth;
pub mod health;
pub mod links;
pub mod redirect;

pub use auth::{
    change_password_handler, login_handler, logout_handler, me_handler, refresh_handler,
    register_handler,
};
pub use health::health_handler;
pub use links::{create_link_handler, deactivate_link_handler, resolve_link_handler};
pub use redirect::redirect_handler;
