//! Driving port for catalogue browsing.

use async_trait::async_trait;
use pagination::Page;

use crate::domain::{Error, Pet, PetSearch};

/// Public catalogue search.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PetsQuery: Send + Sync {
    /// Run a compiled search.
    async fn search(&self, search: &PetSearch) -> Result<Page<Pet>, Error>;
}
