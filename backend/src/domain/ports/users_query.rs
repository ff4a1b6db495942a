//! Driving port for reading the signed-in account.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId};

/// Account lookups for authenticated callers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// The account behind a resolved session. A session whose account no
    /// longer exists is reported as `unauthenticated`.
    async fn current_user(&self, user_id: UserId) -> Result<User, Error>;
}
