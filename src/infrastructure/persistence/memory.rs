//! In-process repository implementations.
//!
//! Each store keeps its rows behind a single `parking_lot::Mutex` and applies
//! the same uniqueness rules as the PostgreSQL schema inside one critical
//! section, so concurrent callers observe the same conflicts they would
//! against the database. Used by integration tests and local experiments.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::json;

use crate::domain::entities::{Link, NewLink, NewUser, User};
use crate::domain::repositories::{LinkRepository, RevocationRepository, UserRepository};
use crate::error::AppError;

#[derive(Default)]
struct LinkTable {
    next_id: i64,
    by_code: HashMap<String, Link>,
}

/// In-memory link store.
#[derive(Default)]
pub struct InMemoryLinkRepository {
    table: Mutex<LinkTable>,
}

impl InMemoryLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored links.
    pub fn len(&self) -> usize {
        self.table.lock().by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl LinkRepository for InMemoryLinkRepository {
    async fn insert_unique(&self, new_link: NewLink) -> Result<Link, AppError> {
        let mut table = self.table.lock();

        if table.by_code.contains_key(&new_link.short_code) {
            return Err(AppError::ShortCodeConflict {
                code: new_link.short_code,
            });
        }
        if table.by_code.values().any(|link| {
            link.owner_id == new_link.owner_id && link.original_url == new_link.original_url
        }) {
            return Err(AppError::DuplicateLink);
        }

        table.next_id += 1;
        let now = Utc::now();
        let link = Link {
            id: table.next_id,
            short_code: new_link.short_code,
            original_url: new_link.original_url,
            owner_id: new_link.owner_id,
            clicks: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        table.by_code.insert(link.short_code.clone(), link.clone());

        Ok(link)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        Ok(self.table.lock().by_code.get(code).cloned())
    }

    async fn find_by_owner_and_url(
        &self,
        owner_id: i64,
        original_url: &str,
    ) -> Result<Option<Link>, AppError> {
        Ok(self
            .table
            .lock()
            .by_code
            .values()
            .find(|link| link.owner_id == owner_id && link.original_url == original_url)
            .cloned())
    }

    async fn increment_clicks(&self, code: &str) -> Result<(), AppError> {
        if let Some(link) = self.table.lock().by_code.get_mut(code)
            && link.is_active
        {
            link.clicks += 1;
            link.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn deactivate(&self, code: &str, owner_id: Option<i64>) -> Result<bool, AppError> {
        let mut table = self.table.lock();

        match table.by_code.get_mut(code) {
            Some(link) if owner_id.is_none_or(|owner| owner == link.owner_id) => {
                if link.is_active {
                    link.is_active = false;
                    link.updated_at = Utc::now();
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[derive(Default)]
struct UserTable {
    next_id: i64,
    by_id: HashMap<i64, User>,
}

/// In-memory user store.
#[derive(Default)]
pub struct InMemoryUserRepository {
    table: Mutex<UserTable>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes a user, as an operator would. Returns whether it existed.
    pub fn remove(&self, id: i64) -> bool {
        self.table.lock().by_id.remove(&id).is_some()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut table = self.table.lock();

        if table.by_id.values().any(|user| user.email == new_user.email) {
            return Err(AppError::conflict(
                "User with this email already exists",
                json!({ "field": "email" }),
            ));
        }

        table.next_id += 1;
        let now = Utc::now();
        let user = User {
            id: table.next_id,
            email: new_user.email,
            password_hash: new_user.password_hash,
            created_at: now,
            updated_at: now,
        };
        table.by_id.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .table
            .lock()
            .by_id
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.table.lock().by_id.get(&id).cloned())
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<bool, AppError> {
        match self.table.lock().by_id.get_mut(&id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// In-memory revocation list.
#[derive(Default)]
pub struct InMemoryRevocationRepository {
    revoked: Mutex<HashMap<String, (i64, DateTime<Utc>)>>,
}

impl InMemoryRevocationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RevocationRepository for InMemoryRevocationRepository {
    async fn revoke(
        &self,
        token_id: &str,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let mut revoked = self.revoked.lock();
        if revoked.contains_key(token_id) {
            return Ok(false);
        }
        revoked.insert(token_id.to_string(), (user_id, expires_at));
        Ok(true)
    }

    async fn is_revoked(&self, token_id: &str) -> Result<bool, AppError> {
        Ok(self.revoked.lock().contains_key(token_id))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let mut revoked = self.revoked.lock();
        let before = revoked.len();
        revoked.retain(|_, (_, expires_at)| *expires_at >= now);
        Ok((before - revoked.len()) as u64)
    }
}
