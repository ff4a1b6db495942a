//! PostgreSQL persistence adapters using Diesel.
//!
//! Repositories translate between the Diesel row structs in `models.rs` and
//! domain types; lifecycle rules stay in the domain and are only invoked
//! here inside the transaction that holds the relevant pet row. Database
//! errors are mapped to each port's error type before they leave this
//! module.
//!
//! ```no_run
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! use pet_adoption::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/pets")).await?;
//! let users = DieselUserRepository::new(pool);
//! # let _ = users;
//! # Ok(())
//! # }
//! ```

mod diesel_adoption_repository;
mod diesel_catalogue_repository;
pub(crate) mod diesel_helpers;
mod diesel_session_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_adoption_repository::DieselAdoptionRepository;
pub use diesel_catalogue_repository::DieselCatalogueRepository;
pub use diesel_session_repository::DieselSessionRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
