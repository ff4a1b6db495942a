//! Driven port for pet listings.
use async_trait::async_trait;
use pagination::Page;

use crate::domain::{NewPet, Pet, PetId, PetSearch};

use super::define_port_error;

define_port_error! {
    /// Failures raised by catalogue repositories.
    pub enum CataloguePersistenceError {
        /// The store could not be reached.
        Connection { message: String } => "catalogue connection failed: {message}",
        /// A query failed while executing.
        Query { message: String } => "catalogue query failed: {message}",
    }
}

/// Pet listing storage and search.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogueRepository: Send + Sync {
    /// Run a compiled search, returning one page and the total match count.
    async fn search(&self, search: &PetSearch) -> Result<Page<Pet>, CataloguePersistenceError>;

    /// List a new pet as available.
    async fn insert_pet(&self, pet: &NewPet) -> Result<Pet, CataloguePersistenceError>;

    /// Fetch one listing.
    async fn find_pet(&self, id: PetId) -> Result<Option<Pet>, CataloguePersistenceError>;
}
