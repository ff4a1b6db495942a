//! Builders wiring adapters into the services handlers call.
//!
//! With a pool the Diesel repositories back every port; without one a single
//! [`MemoryStore`] does, so the server still runs for local development.

use std::path::Path;
use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::warn;

use pet_adoption::domain::ports::{
    AdoptionRepository, CatalogueRepository, ImageStore, PasswordHasher, SessionRepository,
    UserRepository,
};
use pet_adoption::domain::{
    AccountService, AdoptionService, CatalogueService, EmailAddress, ExampleDataSeeder,
    SessionService,
};
use pet_adoption::inbound::http::state::HttpStatePorts;
use pet_adoption::outbound::memory::MemoryStore;
use pet_adoption::outbound::password::Argon2PasswordHasher;
use pet_adoption::outbound::persistence::{
    DbPool, DieselAdoptionRepository, DieselCatalogueRepository, DieselSessionRepository,
    DieselUserRepository,
};
use pet_adoption::outbound::uploads::FilesystemImageStore;

use super::ServerConfig;

/// Driven adapters for one storage backend.
struct Repositories<S, C> {
    users: Arc<dyn UserRepository>,
    sessions: Arc<S>,
    catalogue: Arc<C>,
    adoptions: Arc<dyn AdoptionRepository>,
}

/// Everything the server needs once adapters are chosen.
pub(crate) struct Wiring {
    pub(crate) ports: HttpStatePorts,
    pub(crate) seeder: ExampleDataSeeder,
}

fn diesel_repositories(
    pool: &DbPool,
) -> Repositories<DieselSessionRepository, DieselCatalogueRepository> {
    Repositories {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        sessions: Arc::new(DieselSessionRepository::new(pool.clone())),
        catalogue: Arc::new(DieselCatalogueRepository::new(pool.clone())),
        adoptions: Arc::new(DieselAdoptionRepository::new(pool.clone())),
    }
}

fn memory_repositories(clock: Arc<dyn Clock>) -> Repositories<MemoryStore, MemoryStore> {
    let store = Arc::new(MemoryStore::new(clock));
    Repositories {
        users: store.clone(),
        sessions: store.clone(),
        catalogue: store.clone(),
        adoptions: store,
    }
}

fn wire<S, C>(
    repositories: Repositories<S, C>,
    images: Arc<dyn ImageStore>,
    clock: Arc<dyn Clock>,
    admin_email: EmailAddress,
) -> Wiring
where
    S: SessionRepository + 'static,
    C: CatalogueRepository + 'static,
{
    let Repositories {
        users,
        sessions,
        catalogue,
        adoptions,
    } = repositories;
    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher);
    let catalogue_port: Arc<dyn CatalogueRepository> = catalogue.clone();

    let session_store = Arc::new(SessionService::new(sessions, clock));
    let accounts = Arc::new(AccountService::new(
        users.clone(),
        session_store.clone(),
        hasher.clone(),
    ));
    let adoption = Arc::new(AdoptionService::new(
        adoptions,
        catalogue_port.clone(),
        users.clone(),
        images.clone(),
        admin_email,
    ));

    Wiring {
        ports: HttpStatePorts {
            sessions: session_store,
            login: accounts.clone(),
            signup: accounts.clone(),
            users: accounts,
            pets: Arc::new(CatalogueService::new(catalogue)),
            adoption: adoption.clone(),
            adoption_query: adoption,
            images,
        },
        seeder: ExampleDataSeeder::new(users, catalogue_port, hasher),
    }
}

fn open_image_store(dir: &Path) -> std::io::Result<Arc<dyn ImageStore>> {
    let store = FilesystemImageStore::open(dir).map_err(|err| {
        std::io::Error::other(format!(
            "failed to open uploads directory {}: {err}",
            dir.display()
        ))
    })?;
    Ok(Arc::new(store))
}

/// Choose adapters for `config` and wire the services.
///
/// # Errors
///
/// Returns [`std::io::Error`] when the uploads directory cannot be opened.
pub(crate) fn build_wiring(config: &ServerConfig) -> std::io::Result<Wiring> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let images = open_image_store(&config.uploads_dir)?;
    let admin_email = config.admin_email.clone();
    Ok(match &config.db_pool {
        Some(pool) => wire(diesel_repositories(pool), images, clock, admin_email),
        None => {
            warn!("no database configured; using the in-memory store, data is lost on restart");
            wire(memory_repositories(clock.clone()), images, clock, admin_email)
        }
    })
}
