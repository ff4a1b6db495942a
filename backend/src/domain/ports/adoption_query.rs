//! Driving port for caller-scoped adoption history.

use async_trait::async_trait;

use crate::domain::{
    AdoptionHistoryEntry, ApplicationHistoryEntry, DonationHistoryEntry, Error, UserId,
};

/// History views, each newest first.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdoptionQuery: Send + Sync {
    /// Pets the user has adopted.
    async fn adoptions(&self, user: UserId) -> Result<Vec<AdoptionHistoryEntry>, Error>;

    /// Applications the user has submitted.
    async fn applications(&self, user: UserId) -> Result<Vec<ApplicationHistoryEntry>, Error>;

    /// Listings the user has donated, with the applications they received.
    async fn donations(&self, user: UserId) -> Result<Vec<DonationHistoryEntry>, Error>;
}
