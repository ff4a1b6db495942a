//! In-process store used when no database is configured.
//!
//! One [`MemoryStore`] implements every driven persistence port over a single
//! async mutex. Each port call takes the lock once, so lifecycle transitions
//! are as atomic here as the Diesel transactions are in PostgreSQL. State is
//! lost on restart.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use pagination::Page;
use tokio::sync::Mutex;

use crate::domain::adoption::lifecycle::{
    check_admin_deletion, check_approval, check_donor_removal, check_submission,
    siblings_to_reject,
};
use crate::domain::ports::{
    AdoptionPersistenceError, AdoptionRepository, CataloguePersistenceError,
    CatalogueRepository, SessionPersistenceError, SessionRepository, StoredCredentials,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    Adoption, AdoptionHistoryEntry, AdoptionId, Application, ApplicationHistoryEntry,
    ApplicationId, ApplicationState, ApplicationStatus, ApprovalOutcome, DonationHistoryEntry,
    LifecycleError, ListingState, NewApplication, NewPet, NewUser, Pet, PetId, PetSearch, PetStatus,
    SessionDigest, SessionRecord, User, UserId,
};

#[derive(Default)]
struct State {
    last_id: i64,
    users: BTreeMap<UserId, (User, String)>,
    pets: BTreeMap<PetId, Pet>,
    applications: BTreeMap<ApplicationId, Application>,
    adoptions: BTreeMap<AdoptionId, Adoption>,
    sessions: HashMap<SessionDigest, SessionRecord>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn listing(&self, id: PetId) -> Option<ListingState> {
        self.pets.get(&id).map(|pet| ListingState {
            id: pet.id,
            donor: pet.donated_by,
            status: pet.status,
        })
    }

    fn application_states(&self, pet: PetId) -> Vec<ApplicationState> {
        self.applications
            .values()
            .filter(|application| application.pet_id == pet)
            .map(|application| ApplicationState {
                id: application.id,
                pet_id: application.pet_id,
                applicant: application.applicant_id,
                status: application.status,
            })
            .collect()
    }

    fn set_application_status(&mut self, id: ApplicationId, status: ApplicationStatus) {
        if let Some(application) = self.applications.get_mut(&id) {
            application.status = status;
        }
    }

    fn drop_pet(&mut self, id: PetId) {
        self.pets.remove(&id);
        self.applications
            .retain(|_, application| application.pet_id != id);
        self.adoptions.retain(|_, adoption| adoption.pet_id != id);
    }
}

/// Shared in-memory implementation of the persistence ports.
#[derive(Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    /// Create an empty store stamping rows with `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            clock,
        }
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }
}

fn rejected(reason: LifecycleError) -> AdoptionPersistenceError {
    AdoptionPersistenceError::rejected(reason)
}

fn count(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut state = self.state.lock().await;
        if state
            .users
            .values()
            .any(|(existing, _)| existing.email == user.email)
        {
            return Err(UserPersistenceError::duplicate_email());
        }
        let id = UserId::new(state.next_id());
        let stored = User {
            id,
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
        };
        state
            .users
            .insert(id, (stored.clone(), user.password_hash.clone()));
        Ok(stored)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let state = self.state.lock().await;
        Ok(state.users.get(&id).map(|(user, _)| user.clone()))
    }

    async fn find_credentials(
        &self,
        email: &str,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .find(|(user, _)| user.email.as_ref() == email)
            .map(|(user, hash)| StoredCredentials {
                user: user.clone(),
                password_hash: hash.clone(),
            }))
    }
}

#[async_trait]
impl SessionRepository for MemoryStore {
    async fn insert(&self, session: &SessionRecord) -> Result<(), SessionPersistenceError> {
        let mut state = self.state.lock().await;
        state
            .sessions
            .insert(session.digest.clone(), session.clone());
        Ok(())
    }

    async fn find(
        &self,
        digest: &SessionDigest,
    ) -> Result<Option<SessionRecord>, SessionPersistenceError> {
        let state = self.state.lock().await;
        Ok(state.sessions.get(digest).cloned())
    }

    async fn delete(&self, digest: &SessionDigest) -> Result<(), SessionPersistenceError> {
        let mut state = self.state.lock().await;
        state.sessions.remove(digest);
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, SessionPersistenceError> {
        let mut state = self.state.lock().await;
        let before = state.sessions.len();
        state.sessions.retain(|_, session| session.is_live_at(now));
        Ok(count(before.saturating_sub(state.sessions.len())))
    }
}

#[async_trait]
impl CatalogueRepository for MemoryStore {
    async fn search(&self, search: &PetSearch) -> Result<Page<Pet>, CataloguePersistenceError> {
        let state = self.state.lock().await;
        let mut matches: Vec<Pet> = state
            .pets
            .values()
            .filter(|pet| search.filter.matches(pet))
            .cloned()
            .collect();
        matches.sort_by(|a, b| search.sort.compare(a, b));
        Ok(Page::from_ordered(matches, search.page))
    }

    async fn insert_pet(&self, pet: &NewPet) -> Result<Pet, CataloguePersistenceError> {
        let created_at = self.now();
        let mut state = self.state.lock().await;
        let id = PetId::new(state.next_id());
        let stored = Pet {
            id,
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
            created_at,
        };
        state.pets.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find_pet(&self, id: PetId) -> Result<Option<Pet>, CataloguePersistenceError> {
        let state = self.state.lock().await;
        Ok(state.pets.get(&id).cloned())
    }
}

#[async_trait]
impl AdoptionRepository for MemoryStore {
    async fn submit_application(
        &self,
        application: &NewApplication,
    ) -> Result<Application, AdoptionPersistenceError> {
        let applied_at = self.now();
        let mut state = self.state.lock().await;
        let already_applied = state.applications.values().any(|existing| {
            existing.pet_id == application.pet_id
                && existing.applicant_id == application.applicant_id
        });
        check_submission(state.listing(application.pet_id).as_ref(), already_applied)
            .map_err(rejected)?;
        let id = ApplicationId::new(state.next_id());
        let stored = Application {
            id,
            pet_id: application.pet_id,
            applicant_id: application.applicant_id,
            applicant: application.applicant.clone(),
            details: application.details.clone(),
            status: ApplicationStatus::Pending,
            applied_at,
        };
        state.applications.insert(id, stored.clone());
        Ok(stored)
    }

    async fn approve_application(
        &self,
        application: ApplicationId,
        donor: UserId,
    ) -> Result<ApprovalOutcome, AdoptionPersistenceError> {
        let adopted_at = self.now();
        let mut state = self.state.lock().await;
        let pet_id = state
            .applications
            .get(&application)
            .map(|stored| stored.pet_id)
            .ok_or_else(|| rejected(LifecycleError::ApplicationNotFound))?;
        let states = state.application_states(pet_id);
        let target = states.iter().find(|candidate| candidate.id == application);
        check_approval(target, state.listing(pet_id).as_ref(), donor).map_err(rejected)?;
        let adopter = target
            .map(|candidate| candidate.applicant)
            .ok_or_else(|| rejected(LifecycleError::ApplicationNotFound))?;

        if let Some(pet) = state.pets.get_mut(&pet_id) {
            pet.status = PetStatus::Adopted;
        }
        let adoption = Adoption {
            id: AdoptionId::new(state.next_id()),
            pet_id,
            adopter_id: adopter,
            donor_id: donor,
            adopted_at,
        };
        state.adoptions.insert(adoption.id, adoption.clone());
        state.set_application_status(application, ApplicationStatus::Approved);
        let rejected_ids = siblings_to_reject(application, &states);
        for id in &rejected_ids {
            state.set_application_status(*id, ApplicationStatus::Rejected);
        }
        Ok(ApprovalOutcome {
            adoption,
            rejected: rejected_ids,
        })
    }

    async fn remove_donation(
        &self,
        pet: PetId,
        donor: UserId,
    ) -> Result<(), AdoptionPersistenceError> {
        let mut state = self.state.lock().await;
        check_donor_removal(state.listing(pet).as_ref(), donor).map_err(rejected)?;
        state.drop_pet(pet);
        Ok(())
    }

    async fn delete_pet(&self, pet: PetId) -> Result<(), AdoptionPersistenceError> {
        let mut state = self.state.lock().await;
        check_admin_deletion(state.listing(pet).as_ref()).map_err(rejected)?;
        state.drop_pet(pet);
        Ok(())
    }

    async fn adoptions_by(
        &self,
        adopter: UserId,
    ) -> Result<Vec<AdoptionHistoryEntry>, AdoptionPersistenceError> {
        let state = self.state.lock().await;
        let mut entries: Vec<(AdoptionId, AdoptionHistoryEntry)> = state
            .adoptions
            .values()
            .filter(|adoption| adoption.adopter_id == adopter)
            .filter_map(|adoption| {
                state.pets.get(&adoption.pet_id).map(|pet| {
                    (
                        adoption.id,
                        AdoptionHistoryEntry {
                            id: pet.id,
                            name: pet.name.clone(),
                            breed: pet.breed.clone(),
                            species: pet.species.clone(),
                            image: pet.image.clone(),
                            adopted_at: adoption.adopted_at,
                        },
                    )
                })
            })
            .collect();
        entries.sort_by(|(a_id, a), (b_id, b)| {
            b.adopted_at.cmp(&a.adopted_at).then(b_id.cmp(a_id))
        });
        Ok(entries.into_iter().map(|(_, entry)| entry).collect())
    }

    async fn applications_by(
        &self,
        applicant: UserId,
    ) -> Result<Vec<ApplicationHistoryEntry>, AdoptionPersistenceError> {
        let state = self.state.lock().await;
        let mut entries: Vec<ApplicationHistoryEntry> = state
            .applications
            .values()
            .filter(|application| application.applicant_id == applicant)
            .filter_map(|application| {
                state.pets.get(&application.pet_id).map(|pet| {
                    ApplicationHistoryEntry::new(
                        application.clone(),
                        pet.name.clone(),
                        pet.image.clone(),
                    )
                })
            })
            .collect();
        entries.sort_by(|a, b| b.applied_at.cmp(&a.applied_at).then(b.id.cmp(&a.id)));
        Ok(entries)
    }

    async fn donations_by(
        &self,
        donor: UserId,
    ) -> Result<Vec<DonationHistoryEntry>, AdoptionPersistenceError> {
        let state = self.state.lock().await;
        let mut pets: Vec<&Pet> = state
            .pets
            .values()
            .filter(|pet| pet.donated_by == donor)
            .collect();
        pets.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(pets
            .into_iter()
            .map(|pet| {
                let mut received: Vec<&Application> = state
                    .applications
                    .values()
                    .filter(|application| application.pet_id == pet.id)
                    .collect();
                received.sort_by(|a, b| b.applied_at.cmp(&a.applied_at).then(b.id.cmp(&a.id)));
                let applications: Vec<_> = received
                    .into_iter()
                    .map(|application| application.clone().into())
                    .collect();
                DonationHistoryEntry {
                    id: pet.id,
                    name: pet.name.clone(),
                    image: pet.image.clone(),
                    status: pet.status,
                    created_at: pet.created_at,
                    application_count: count(applications.len()),
                    applications,
                }
            })
            .collect())
    }
}
