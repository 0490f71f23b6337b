//! Repository implementations.
//!
//! PostgreSQL implementations use SQLx with runtime-bound parameters and
//! `FromRow` entities. The in-memory implementations enforce the same
//! constraints and back the integration tests.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - Link storage, uniqueness and click counting
//! - [`PgUserRepository`] - User accounts
//! - [`PgRevocationRepository`] - Revoked refresh-token ids
//! - [`memory`] - In-process counterparts of the above

pub mod memory;
pub mod pg_link_repository;
pub mod pg_revocation_repository;
pub mod pg_user_repository;

pub use memory::{InMemoryLinkRepository, InMemoryRevocationRepository, InMemoryUserRepository};
pub use pg_link_repository::PgLinkRepository;
pub use pg_revocation_repository::PgRevocationRepository;
pub use pg_user_repository::PgUserRepository;
