//! Storage seams consumed by the auth core.
//!
//! The issuer and validator only see these traits, so any store (SurrealDB
//! in production, fakes in tests) can stand behind them.

use std::future::Future;
use std::pin::Pin;

use anyhow::Result;

use crate::db::schema::{SessionRecord, UserRecord};
use crate::types::{UserId, Username};

/// Boxed future returned by the directory traits.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Read access to user accounts.
pub trait UserDirectory: Send + Sync {
    /// Look up an account by its principal. `Ok(None)` when absent.
    fn find_user_by_id<'a>(&'a self, user_id: &'a UserId) -> StoreFuture<'a, Option<UserRecord>>;

    /// Look up an account by its login name. `Ok(None)` when absent.
    fn find_user_by_username<'a>(
        &'a self,
        username: &'a Username,
    ) -> StoreFuture<'a, Option<UserRecord>>;
}

/// Durable record of issued tokens.
pub trait SessionRegistry: Send + Sync {
    /// Persist a session. Must only return `Ok` once the record has landed.
    fn create_session<'a>(&'a self, session: &'a SessionRecord) -> StoreFuture<'a, ()>;
}
