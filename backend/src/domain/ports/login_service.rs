//! Driving port for login and logout.

use async_trait::async_trait;

use crate::domain::{Error, IssuedSession, LoginCredentials, SessionToken, User};

/// A successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub session: IssuedSession,
}

/// Password authentication backed by sessions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Check credentials and open a session. Unknown emails and wrong
    /// passwords fail identically with `unauthenticated`.
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginOutcome, Error>;

    /// Close the session identified by `token`.
    async fn logout(&self, token: &SessionToken) -> Result<(), Error>;
}
