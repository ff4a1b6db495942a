//! Driven port for session persistence.
//!
//! Adapters store [`SessionRecord`]s keyed by token digest. Expiry is judged
//! by the caller; `find` returns expired rows unchanged.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{SessionDigest, SessionRecord};

use super::define_port_error;

define_port_error! {
    /// Failures raised by session repositories.
    pub enum SessionPersistenceError {
        /// The store could not be reached.
        Connection { message: String } => "session repository connection failed: {message}",
        /// A query failed while executing.
        Query { message: String } => "session repository query failed: {message}",
    }
}

/// Session storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Store a new session.
    async fn insert(&self, session: &SessionRecord) -> Result<(), SessionPersistenceError>;

    /// Look up a session by digest.
    async fn find(
        &self,
        digest: &SessionDigest,
    ) -> Result<Option<SessionRecord>, SessionPersistenceError>;

    /// Remove a session. Removing an unknown digest is not an error.
    async fn delete(&self, digest: &SessionDigest) -> Result<(), SessionPersistenceError>;

    /// Remove every session with `expires_at <= now`, returning the count.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, SessionPersistenceError>;
}
