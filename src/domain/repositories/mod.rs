//! Repository trait definitions for the domain layer.
//!
//! Traits define the contract for data operations; implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are generated
//! via `mockall` for unit tests.
//!
//! # Available Repositories
//!
//! - [`LinkRepository`] - Short link storage, uniqueness and click counting
//! - [`UserRepository`] - User accounts
//! - [`RevocationRepository`] - Revoked refresh-token ids

pub mod link_repository;
pub mod revocation_repository;
pub mod user_repository;

pub use link_repository::LinkRepository;
pub use revocation_repository::RevocationRepository;
pub use user_repository::UserRepository;

#[cfg(test)]
pub use link_repository::MockLinkRepository;
#[cfg(test)]
pub use revocation_repository::MockRevocationRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
