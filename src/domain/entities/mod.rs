//! Core domain entities.
//!
//! Entities are plain data structures. Creation inputs live in separate
//! `New*` structs so that database-assigned fields never need placeholders.
//!
//! - [`Link`] / [`NewLink`] - a short code mapped to an original URL
//! - [`User`] / [`NewUser`] - an account that owns links
//! - [`Identity`] - the authenticated principal attached to a request

pub mod link;
pub mod user;

pub use link::{Link, NewLink};
pub use user::{Identity, NewUser, User, normalize_email};
