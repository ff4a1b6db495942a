//! Domain ports for the hexagonal boundary.
//!
//! Driving ports (`*Service`, `*Query`, `*Command`, [`SessionStore`]) are
//! called by inbound adapters. Driven ports (`*Repository`,
//! [`PasswordHasher`], [`ImageStore`]) are implemented by outbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod adoption_command;
mod adoption_query;
mod adoption_repository;
mod catalogue_repository;
mod image_store;
mod login_service;
mod password_hasher;
mod pets_query;
mod session_repository;
mod session_store;
mod signup_service;
mod user_repository;
mod users_query;

#[cfg(test)]
pub use adoption_command::MockAdoptionCommand;
pub use adoption_command::{AdoptionCommand, DonationRequest};
#[cfg(test)]
pub use adoption_query::MockAdoptionQuery;
pub use adoption_query::AdoptionQuery;
#[cfg(test)]
pub use adoption_repository::MockAdoptionRepository;
pub use adoption_repository::{AdoptionPersistenceError, AdoptionRepository};
#[cfg(test)]
pub use catalogue_repository::MockCatalogueRepository;
pub use catalogue_repository::{CataloguePersistenceError, CatalogueRepository};
#[cfg(test)]
pub use image_store::MockImageStore;
pub use image_store::{ImageStore, ImageStoreError, UPLOADS_PREFIX};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::{LoginOutcome, LoginService};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use pets_query::MockPetsQuery;
pub use pets_query::PetsQuery;
#[cfg(test)]
pub use session_repository::MockSessionRepository;
pub use session_repository::{SessionPersistenceError, SessionRepository};
#[cfg(test)]
pub use session_store::MockSessionStore;
pub use session_store::SessionStore;
#[cfg(test)]
pub use signup_service::MockSignupService;
pub use signup_service::SignupService;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{StoredCredentials, UserPersistenceError, UserRepository};
#[cfg(test)]
pub use users_query::MockUsersQuery;
pub use users_query::UsersQuery;
