//! Shared helpers for PostgreSQL-backed integration tests.
//!
//! Each test gets a temporary database on the shared embedded cluster from
//! `pg-embed-setup-unpriv`, migrated with the backend's embedded migrations.
//! A cluster that cannot start fails the test unless `SKIP_TEST_CLUSTER` is
//! truthy, in which case the test prints a `SKIP-TEST-CLUSTER` marker.

use std::time::Duration;

use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};
use rstest::fixture;
use tokio::runtime::Runtime;

use pet_adoption::domain::ports::{CatalogueRepository, UserRepository};
use pet_adoption::domain::{EmailAddress, NewPet, NewUser, Pet, User, UserId};
use pet_adoption::outbound::persistence::{
    DbPool, DieselCatalogueRepository, DieselUserRepository, PoolConfig, run_pending_migrations,
};

const SHARED_CLUSTER_RETRIES: usize = 5;
const SHARED_CLUSTER_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Runtime, pool and the temporary database they point at.
///
/// Fields drop in order, so the database is removed after the pool closes.
pub struct TestDatabase {
    pub runtime: Runtime,
    pub pool: DbPool,
    _database: TemporaryDatabase,
}

/// Returns true when `SKIP_TEST_CLUSTER` is `1`, `true` or `yes`.
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Skip when opted in, otherwise fail loudly so CI never reports a silent pass.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

fn shared_cluster() -> Result<&'static ClusterHandle, String> {
    let mut attempt = 1;
    loop {
        match pg_embedded_setup_unpriv::test_support::shared_cluster_handle() {
            Ok(handle) => return Ok(handle),
            Err(error) if attempt >= SHARED_CLUSTER_RETRIES => return Err(error.to_string()),
            Err(_) => {
                std::thread::sleep(SHARED_CLUSTER_RETRY_DELAY);
                attempt += 1;
            }
        }
    }
}

fn provision() -> Result<TestDatabase, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = shared_cluster()?;
    let database = cluster
        .temporary_database(format!("test_{}", uuid::Uuid::new_v4().simple()))
        .map_err(|err| format!("create temporary database: {err:?}"))?;
    let url = database.url().to_string();

    let pool = runtime.block_on(async {
        run_pending_migrations(&url)
            .await
            .map_err(|err| format!("migrations: {err}"))?;
        DbPool::new(PoolConfig::new(&url).with_max_size(4))
            .await
            .map_err(|err| format!("pool: {err}"))
    })?;

    Ok(TestDatabase {
        runtime,
        pool,
        _database: database,
    })
}

/// A freshly migrated, empty database.
#[fixture]
pub fn database() -> Option<TestDatabase> {
    match provision() {
        Ok(database) => Some(database),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

/// Insert a user with a placeholder hash.
pub async fn user(pool: &DbPool, name: &str) -> User {
    DieselUserRepository::new(pool.clone())
        .insert(&NewUser {
            name: name.to_owned(),
            email: EmailAddress::parse(&format!("{}@example.com", name.to_lowercase()))
                .expect("email"),
            phone: "01700000000".to_owned(),
            password_hash: "$argon2id$placeholder".to_owned(),
        })
        .await
        .expect("insert user")
}

/// List a pet for `donor`.
pub async fn pet(pool: &DbPool, donor: UserId, name: &str, price: i64) -> Pet {
    DieselCatalogueRepository::new(pool.clone())
        .insert_pet(&NewPet {
            donor,
            name: name.to_owned(),
            breed: "Mixed".to_owned(),
            age: 2,
            species: "Dog".to_owned(),
            bio: "Friendly".to_owned(),
            location: "dhaka".to_owned(),
            price,
            image: "uploads/test.jpg".to_owned(),
        })
        .await
        .expect("insert pet")
}
