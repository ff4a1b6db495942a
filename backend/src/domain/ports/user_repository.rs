//! Driven port for account persistence.
use async_trait::async_trait;

use crate::domain::{NewUser, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Failures raised by account repositories.
    pub enum UserPersistenceError {
        /// The store could not be reached.
        Connection { message: String } => "user repository connection failed: {message}",
        /// A query failed while executing.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses the email address.
        DuplicateEmail {} => "email address already registered",
    }
}

/// An account together with its password hash, for credential checks only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    pub user: User,
    /// PHC-formatted hash.
    pub password_hash: String,
}

/// Account storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert an account; fails with `DuplicateEmail` if the email is taken.
    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError>;

    /// Fetch an account by id.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch an account and its hash by normalised email.
    async fn find_credentials(
        &self,
        email: &str,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError>;
}
