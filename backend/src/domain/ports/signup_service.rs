//! Driving port for account registration.

use async_trait::async_trait;

use crate::domain::{Error, SignupDetails, User};

/// Account creation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SignupService: Send + Sync {
    /// Register a new account. A taken email fails with `conflict`.
    async fn signup(&self, details: &SignupDetails) -> Result<User, Error>;
}
