//! Example catalogue seeding.
//!
//! Creates the administrator account when it is missing and, only on that
//! first creation, lists the sample pets under it. Re-running against a
//! seeded store is a no-op.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use super::ports::{
    CataloguePersistenceError, CatalogueRepository, PasswordHashError, PasswordHasher,
    UserPersistenceError, UserRepository,
};
use super::{EmailAddress, NewPet, NewUser, UserId};

const ADMIN_NAME: &str = "Admin User";
const ADMIN_PHONE: &str = "555-0123";

struct SamplePet {
    name: &'static str,
    age: i32,
    breed: &'static str,
    species: &'static str,
    image: &'static str,
    bio: &'static str,
    location: &'static str,
    price: i64,
}

const SAMPLE_PETS: [SamplePet; 8] = [
    SamplePet {
        name: "Buddy",
        age: 3,
        breed: "Golden Retriever",
        species: "Dog",
        image: "https://images.pexels.com/photos/551628/pexels-photo-551628.jpeg?auto=compress&cs=tinysrgb&w=400",
        bio: "Friendly and energetic golden retriever who loves playing fetch and swimming. Great with kids!",
        location: "dhaka",
        price: 15000,
    },
    SamplePet {
        name: "Luna",
        age: 2,
        breed: "Siamese",
        species: "Cat",
        image: "https://images.pexels.com/photos/45201/kitty-cat-kitten-pet-45201.jpeg?auto=compress&cs=tinysrgb&w=400",
        bio: "Beautiful and intelligent Siamese cat with striking blue eyes. Loves attention and purring.",
        location: "chittagong",
        price: 8000,
    },
    SamplePet {
        name: "Max",
        age: 4,
        breed: "German Shepherd",
        species: "Dog",
        image: "https://images.pexels.com/photos/1108099/pexels-photo-1108099.jpeg?auto=compress&cs=tinysrgb&w=400",
        bio: "Loyal and protective German Shepherd. Well-trained and perfect for active families.",
        location: "dhaka",
        price: 25000,
    },
    SamplePet {
        name: "Whiskers",
        age: 5,
        breed: "Persian",
        species: "Cat",
        image: "https://images.pexels.com/photos/596590/pexels-photo-596590.jpeg?auto=compress&cs=tinysrgb&w=400",
        bio: "Gentle Persian cat with long, fluffy fur. Calm and affectionate, perfect for quiet homes.",
        location: "sylhet",
        price: 12000,
    },
    SamplePet {
        name: "Bella",
        age: 2,
        breed: "Labrador",
        species: "Dog",
        image: "https://images.pexels.com/photos/1805164/pexels-photo-1805164.jpeg?auto=compress&cs=tinysrgb&w=400",
        bio: "Sweet and gentle Labrador who loves everyone she meets. Great with children and other pets.",
        location: "rajshahi",
        price: 0,
    },
    SamplePet {
        name: "Mittens",
        age: 3,
        breed: "Maine Coon",
        species: "Cat",
        image: "https://images.pexels.com/photos/1170986/pexels-photo-1170986.jpeg?auto=compress&cs=tinysrgb&w=400",
        bio: "Majestic Maine Coon with a playful personality. Loves climbing and interactive toys.",
        location: "dhaka",
        price: 18000,
    },
    SamplePet {
        name: "Charlie",
        age: 1,
        breed: "Beagle",
        species: "Dog",
        image: "https://images.pexels.com/photos/1254140/pexels-photo-1254140.jpeg?auto=compress&cs=tinysrgb&w=400",
        bio: "Young and playful Beagle puppy. Full of energy and loves to explore. Perfect for active families.",
        location: "chittagong",
        price: 10000,
    },
    SamplePet {
        name: "Shadow",
        age: 4,
        breed: "British Shorthair",
        species: "Cat",
        image: "https://images.pexels.com/photos/1741205/pexels-photo-1741205.jpeg?auto=compress&cs=tinysrgb&w=400",
        bio: "Calm and dignified British Shorthair. Independent but affectionate. Great for apartment living.",
        location: "dhaka",
        price: 0,
    },
];

impl SamplePet {
    fn to_new_pet(&self, donor: UserId) -> NewPet {
        NewPet {
            donor,
            name: self.name.to_owned(),
            breed: self.breed.to_owned(),
            age: self.age,
            species: self.species.to_owned(),
            bio: self.bio.to_owned(),
            location: self.location.to_owned(),
            price: self.price,
            image: self.image.to_owned(),
        }
    }
}

/// What a seeding run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The administrator already existed; nothing was written.
    AlreadySeeded,
    /// The administrator was created and the sample pets listed.
    Seeded {
        /// New administrator id.
        admin: UserId,
        /// Number of pets listed.
        pets: usize,
    },
}

/// Seeding failures.
#[derive(Debug, Error)]
pub enum ExampleDataSeedingError {
    /// Hashing the administrator password failed.
    #[error("failed to hash administrator password: {0}")]
    Hash(#[from] PasswordHashError),
    /// Account storage failed.
    #[error("failed to store administrator: {0}")]
    Users(#[from] UserPersistenceError),
    /// Listing storage failed.
    #[error("failed to list sample pets: {0}")]
    Catalogue(#[from] CataloguePersistenceError),
}

/// Seeds the administrator and sample catalogue.
#[derive(Clone)]
pub struct ExampleDataSeeder {
    users: Arc<dyn UserRepository>,
    catalogue: Arc<dyn CatalogueRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl ExampleDataSeeder {
    /// Create a seeder over the given adapters.
    pub fn new(
        users: Arc<dyn UserRepository>,
        catalogue: Arc<dyn CatalogueRepository>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            users,
            catalogue,
            hasher,
        }
    }

    /// Seed once for `admin_email`.
    ///
    /// # Errors
    ///
    /// Returns [`ExampleDataSeedingError`] when hashing or persistence fails.
    pub async fn seed(
        &self,
        admin_email: &EmailAddress,
        admin_password: &str,
    ) -> Result<SeedOutcome, ExampleDataSeedingError> {
        if self
            .users
            .find_credentials(admin_email.as_ref())
            .await?
            .is_some()
        {
            return Ok(SeedOutcome::AlreadySeeded);
        }

        let password_hash = self.hasher.hash(admin_password)?;
        let admin = match self
            .users
            .insert(&NewUser {
                name: ADMIN_NAME.to_owned(),
                email: admin_email.clone(),
                phone: ADMIN_PHONE.to_owned(),
                password_hash,
            })
            .await
        {
            Ok(user) => user,
            Err(UserPersistenceError::DuplicateEmail {}) => return Ok(SeedOutcome::AlreadySeeded),
            Err(err) => return Err(err.into()),
        };

        for sample in &SAMPLE_PETS {
            self.catalogue.insert_pet(&sample.to_new_pet(admin.id)).await?;
        }
        info!(admin = %admin.id, pets = SAMPLE_PETS.len(), "example catalogue seeded");
        Ok(SeedOutcome::Seeded {
            admin: admin.id,
            pets: SAMPLE_PETS.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::User;
    use crate::domain::ports::{
        MockCatalogueRepository, MockPasswordHasher, MockUserRepository, StoredCredentials,
    };
    use crate::domain::{Pet, PetId, PetStatus};
    use chrono::{DateTime, Utc};
    use rstest::{fixture, rstest};

    #[fixture]
    fn admin_email() -> EmailAddress {
        EmailAddress::parse("admin@petcenter.com").expect("admin email")
    }

    fn admin(email: &EmailAddress) -> User {
        User {
            id: UserId::new(1),
            name: ADMIN_NAME.into(),
            email: email.clone(),
            phone: ADMIN_PHONE.into(),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn existing_admin_skips_seeding(admin_email: EmailAddress) {
        let existing = admin(&admin_email);
        let mut users = MockUserRepository::new();
        users.expect_find_credentials().return_once(move |_| {
            Ok(Some(StoredCredentials {
                user: existing,
                password_hash: "h".into(),
            }))
        });
        let seeder = ExampleDataSeeder::new(
            Arc::new(users),
            Arc::new(MockCatalogueRepository::new()),
            Arc::new(MockPasswordHasher::new()),
        );

        let outcome = seeder.seed(&admin_email, "pw").await.expect("seed");
        assert_eq!(outcome, SeedOutcome::AlreadySeeded);
    }

    #[rstest]
    #[tokio::test]
    async fn fresh_store_gets_admin_and_sample_pets(admin_email: EmailAddress) {
        let created = admin(&admin_email);
        let mut users = MockUserRepository::new();
        users.expect_find_credentials().return_once(|_| Ok(None));
        users
            .expect_insert()
            .withf(|user| user.name == ADMIN_NAME && user.password_hash == "hashed")
            .return_once(move |_| Ok(created));
        let mut hasher = MockPasswordHasher::new();
        hasher.expect_hash().return_once(|_| Ok("hashed".into()));
        let mut catalogue = MockCatalogueRepository::new();
        catalogue
            .expect_insert_pet()
            .withf(|pet| pet.donor == UserId::new(1))
            .times(SAMPLE_PETS.len())
            .returning(|pet| {
                Ok(Pet {
                    id: PetId::new(1),
                    name: pet.name.clone(),
                    breed: pet.breed.clone(),
                    age: pet.age,
                    species: pet.species.clone(),
                    image: pet.image.clone(),
                    bio: pet.bio.clone(),
                    status: PetStatus::Available,
                    donated_by: pet.donor,
                    location: pet.location.clone(),
                    price: pet.price,
                    created_at: DateTime::<Utc>::UNIX_EPOCH,
                })
            });
        let seeder =
            ExampleDataSeeder::new(Arc::new(users), Arc::new(catalogue), Arc::new(hasher));

        let outcome = seeder.seed(&admin_email, "pw").await.expect("seed");
        assert_eq!(
            outcome,
            SeedOutcome::Seeded {
                admin: UserId::new(1),
                pets: 8
            }
        );
    }

    #[rstest]
    fn sample_catalogue_mixes_species_and_free_pets() {
        let dogs = SAMPLE_PETS.iter().filter(|p| p.species == "Dog").count();
        let free = SAMPLE_PETS.iter().filter(|p| p.price == 0).count();
        assert_eq!(dogs, 4);
        assert_eq!(free, 2);
    }
}
