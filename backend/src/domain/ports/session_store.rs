//! Driving port for session lifecycle.
//!
//! Inbound adapters create a session at login, resolve the cookie on every
//! authenticated request and revoke it at logout. Identity is always an
//! explicit result of `resolve`, never ambient request state.

use async_trait::async_trait;

use crate::domain::{Error, IssuedSession, SessionToken, UserId};

/// Bearer-token sessions with a fixed time to live.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Issue a fresh token for `user_id`.
    async fn create(&self, user_id: UserId) -> Result<IssuedSession, Error>;

    /// The user a live token belongs to. Unknown, expired and revoked tokens
    /// all yield `None`.
    async fn resolve(&self, token: &SessionToken) -> Result<Option<UserId>, Error>;

    /// Invalidate a token immediately.
    async fn revoke(&self, token: &SessionToken) -> Result<(), Error>;

    /// Drop expired sessions, returning how many were removed.
    async fn purge_expired(&self) -> Result<u64, Error>;
}
