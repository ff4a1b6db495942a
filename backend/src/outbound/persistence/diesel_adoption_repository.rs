//! PostgreSQL-backed [`AdoptionRepository`].
//!
//! Every transition runs in one transaction that first locks the pet row.
//! Approval takes `FOR UPDATE`, so two approvals on one pet serialize and
//! the second sees the pet already adopted. Submission takes `FOR SHARE`,
//! which lets applications for the same pet proceed together while still
//! waiting behind an approval in flight.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::pooled_connection::bb8::PooledConnection;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::adoption::lifecycle::{
    check_admin_deletion, check_approval, check_donor_removal, check_submission,
    siblings_to_reject,
};
use crate::domain::ports::{AdoptionPersistenceError, AdoptionRepository};
use crate::domain::{
    AdoptionHistoryEntry, Application, ApplicationHistoryEntry, ApplicationId, ApplicationStatus,
    ApprovalOutcome, DonationHistoryEntry, LifecycleError, ListingState, NewApplication, Pet,
    PetId, PetStatus, ReceivedApplication, UserId,
};

use super::diesel_helpers::{is_unique_violation, map_diesel_error, map_pool_error};
use super::models::{
    AdoptionRow, ApplicationRow, ListingRow, NewAdoptionRow, NewApplicationRow, PetRow,
};
use super::pool::DbPool;
use super::schema::{adoption_applications, adoptions, pets};

const APPLICATION_CONSTRAINT: &str = "adoption_applications_pet_applicant_key";
const ADOPTION_CONSTRAINT: &str = "adoptions_pet_id_key";

/// Diesel implementation of [`AdoptionRepository`].
#[derive(Clone)]
pub struct DieselAdoptionRepository {
    pool: DbPool,
}

impl DieselAdoptionRepository {
    /// Create a repository over `pool`.
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Why a transaction closure gave up.
#[derive(Debug)]
enum TxError {
    Diesel(diesel::result::Error),
    Rejected(LifecycleError),
    Corrupt(String),
}

impl From<diesel::result::Error> for TxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

impl From<LifecycleError> for TxError {
    fn from(reason: LifecycleError) -> Self {
        Self::Rejected(reason)
    }
}

impl From<TxError> for AdoptionPersistenceError {
    fn from(error: TxError) -> Self {
        match error {
            TxError::Diesel(err) => diesel_error(&err),
            TxError::Rejected(reason) => {
                debug!(%reason, "lifecycle transition refused");
                Self::rejected(reason)
            }
            TxError::Corrupt(message) => Self::query(message),
        }
    }
}

fn diesel_error(error: &diesel::result::Error) -> AdoptionPersistenceError {
    map_diesel_error(
        error,
        AdoptionPersistenceError::query,
        AdoptionPersistenceError::connection,
    )
}

/// Turn a unique violation of `constraint` into a lifecycle refusal.
fn refuse_duplicate(
    error: diesel::result::Error,
    constraint: &str,
    reason: LifecycleError,
) -> TxError {
    if is_unique_violation(&error, constraint) {
        TxError::Rejected(reason)
    } else {
        TxError::Diesel(error)
    }
}

async fn listing_for_update(
    conn: &mut AsyncPgConnection,
    pet: PetId,
) -> Result<Option<ListingState>, TxError> {
    let row: Option<ListingRow> = pets::table
        .find(pet.get())
        .select(ListingRow::as_select())
        .for_update()
        .first(conn)
        .await
        .optional()?;
    row.map(ListingState::try_from)
        .transpose()
        .map_err(TxError::Corrupt)
}

async fn listing_for_share(
    conn: &mut AsyncPgConnection,
    pet: PetId,
) -> Result<Option<ListingState>, TxError> {
    let row: Option<ListingRow> = pets::table
        .find(pet.get())
        .select(ListingRow::as_select())
        .for_share()
        .first(conn)
        .await
        .optional()?;
    row.map(ListingState::try_from)
        .transpose()
        .map_err(TxError::Corrupt)
}

async fn submit(
    conn: &mut AsyncPgConnection,
    application: &NewApplication,
) -> Result<Application, TxError> {
    let listing = listing_for_share(conn, application.pet_id).await?;
    let already_applied: bool = diesel::select(diesel::dsl::exists(
        adoption_applications::table
            .filter(adoption_applications::pet_id.eq(application.pet_id.get()))
            .filter(adoption_applications::applicant_id.eq(application.applicant_id.get())),
    ))
    .get_result(conn)
    .await?;
    check_submission(listing.as_ref(), already_applied)?;

    let row = NewApplicationRow {
        pet_id: application.pet_id.get(),
        applicant_id: application.applicant_id.get(),
        applicant_name: &application.applicant.name,
        applicant_email: &application.applicant.email,
        applicant_phone: &application.applicant.phone,
        experience: application.details.experience(),
        living_situation: application.details.living_situation(),
        reason: application.details.reason(),
    };
    let stored: ApplicationRow = diesel::insert_into(adoption_applications::table)
        .values(&row)
        .returning(ApplicationRow::as_returning())
        .get_result(conn)
        .await
        .map_err(|err| refuse_duplicate(err, APPLICATION_CONSTRAINT, LifecycleError::AlreadyApplied))?;
    Application::try_from(stored).map_err(TxError::Corrupt)
}

async fn approve(
    conn: &mut AsyncPgConnection,
    application: ApplicationId,
    donor: UserId,
) -> Result<ApprovalOutcome, TxError> {
    let pet_id: Option<i64> = adoption_applications::table
        .find(application.get())
        .select(adoption_applications::pet_id)
        .first(conn)
        .await
        .optional()?;
    let Some(pet_id) = pet_id.map(PetId::new) else {
        return Err(LifecycleError::ApplicationNotFound.into());
    };

    // Application statuses are only read once the pet row is held.
    let listing = listing_for_update(conn, pet_id).await?;
    let rows: Vec<ApplicationRow> = adoption_applications::table
        .filter(adoption_applications::pet_id.eq(pet_id.get()))
        .select(ApplicationRow::as_select())
        .load(conn)
        .await?;
    let states = rows
        .iter()
        .map(ApplicationRow::state)
        .collect::<Result<Vec<_>, _>>()
        .map_err(TxError::Corrupt)?;
    let target = states.iter().find(|state| state.id == application);
    check_approval(target, listing.as_ref(), donor)?;
    let adopter = target
        .map(|state| state.applicant)
        .ok_or(LifecycleError::ApplicationNotFound)?;

    diesel::update(pets::table.find(pet_id.get()))
        .set(pets::status.eq(PetStatus::Adopted.as_str()))
        .execute(conn)
        .await?;
    let adoption: AdoptionRow = diesel::insert_into(adoptions::table)
        .values(&NewAdoptionRow {
            pet_id: pet_id.get(),
            adopter_id: adopter.get(),
            donor_id: donor.get(),
        })
        .returning(AdoptionRow::as_returning())
        .get_result(conn)
        .await
        .map_err(|err| refuse_duplicate(err, ADOPTION_CONSTRAINT, LifecycleError::PetAlreadyAdopted))?;
    diesel::update(adoption_applications::table.find(application.get()))
        .set(adoption_applications::status.eq(ApplicationStatus::Approved.as_str()))
        .execute(conn)
        .await?;

    let rejected = siblings_to_reject(application, &states);
    if !rejected.is_empty() {
        let ids: Vec<i64> = rejected.iter().map(|id| id.get()).collect();
        diesel::update(
            adoption_applications::table.filter(adoption_applications::id.eq_any(ids)),
        )
        .set(adoption_applications::status.eq(ApplicationStatus::Rejected.as_str()))
        .execute(conn)
        .await?;
    }

    Ok(ApprovalOutcome {
        adoption: adoption.into(),
        rejected,
    })
}

async fn delete_listing(
    conn: &mut AsyncPgConnection,
    pet: PetId,
    donor: Option<UserId>,
) -> Result<(), TxError> {
    let listing = listing_for_update(conn, pet).await?;
    match donor {
        Some(actor) => check_donor_removal(listing.as_ref(), actor)?,
        None => check_admin_deletion(listing.as_ref())?,
    }
    diesel::delete(adoptions::table.filter(adoptions::pet_id.eq(pet.get())))
        .execute(conn)
        .await?;
    // Applications go with the pet through `ON DELETE CASCADE`.
    diesel::delete(pets::table.find(pet.get()))
        .execute(conn)
        .await?;
    Ok(())
}

fn count(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}

impl DieselAdoptionRepository {
    async fn connection(
        &self,
    ) -> Result<PooledConnection<'_, AsyncPgConnection>, AdoptionPersistenceError> {
        self.pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, AdoptionPersistenceError::connection))
    }
}

#[async_trait]
impl AdoptionRepository for DieselAdoptionRepository {
    async fn submit_application(
        &self,
        application: &NewApplication,
    ) -> Result<Application, AdoptionPersistenceError> {
        let mut conn = self.connection().await?;
        let stored = conn
            .transaction::<_, TxError, _>(|conn| submit(conn, application).scope_boxed())
            .await?;
        Ok(stored)
    }

    async fn approve_application(
        &self,
        application: ApplicationId,
        donor: UserId,
    ) -> Result<ApprovalOutcome, AdoptionPersistenceError> {
        let mut conn = self.connection().await?;
        let outcome = conn
            .transaction::<_, TxError, _>(|conn| approve(conn, application, donor).scope_boxed())
            .await?;
        Ok(outcome)
    }

    async fn remove_donation(
        &self,
        pet: PetId,
        donor: UserId,
    ) -> Result<(), AdoptionPersistenceError> {
        let mut conn = self.connection().await?;
        conn.transaction::<_, TxError, _>(|conn| delete_listing(conn, pet, Some(donor)).scope_boxed())
            .await?;
        Ok(())
    }

    async fn delete_pet(&self, pet: PetId) -> Result<(), AdoptionPersistenceError> {
        let mut conn = self.connection().await?;
        conn.transaction::<_, TxError, _>(|conn| delete_listing(conn, pet, None).scope_boxed())
            .await?;
        Ok(())
    }

    async fn adoptions_by(
        &self,
        adopter: UserId,
    ) -> Result<Vec<AdoptionHistoryEntry>, AdoptionPersistenceError> {
        let mut conn = self.connection().await?;
        let rows: Vec<(i64, String, String, String, String, DateTime<Utc>)> = adoptions::table
            .inner_join(pets::table)
            .filter(adoptions::adopter_id.eq(adopter.get()))
            .order((adoptions::adopted_at.desc(), adoptions::id.desc()))
            .select((
                pets::id,
                pets::name,
                pets::breed,
                pets::species,
                pets::image,
                adoptions::adopted_at,
            ))
            .load(&mut conn)
            .await
            .map_err(|err| diesel_error(&err))?;
        Ok(rows
            .into_iter()
            .map(|(id, name, breed, species, image, adopted_at)| AdoptionHistoryEntry {
                id: PetId::new(id),
                name,
                breed,
                species,
                image,
                adopted_at,
            })
            .collect())
    }

    async fn applications_by(
        &self,
        applicant: UserId,
    ) -> Result<Vec<ApplicationHistoryEntry>, AdoptionPersistenceError> {
        let mut conn = self.connection().await?;
        let rows: Vec<(ApplicationRow, String, String)> = adoption_applications::table
            .inner_join(pets::table)
            .filter(adoption_applications::applicant_id.eq(applicant.get()))
            .order((
                adoption_applications::applied_at.desc(),
                adoption_applications::id.desc(),
            ))
            .select((ApplicationRow::as_select(), pets::name, pets::image))
            .load(&mut conn)
            .await
            .map_err(|err| diesel_error(&err))?;
        rows.into_iter()
            .map(|(row, pet_name, pet_image)| {
                Application::try_from(row)
                    .map(|application| ApplicationHistoryEntry::new(application, pet_name, pet_image))
                    .map_err(AdoptionPersistenceError::query)
            })
            .collect()
    }

    async fn donations_by(
        &self,
        donor: UserId,
    ) -> Result<Vec<DonationHistoryEntry>, AdoptionPersistenceError> {
        let mut conn = self.connection().await?;
        let pet_rows: Vec<PetRow> = pets::table
            .filter(pets::donated_by.eq(donor.get()))
            .order((pets::created_at.desc(), pets::id.desc()))
            .select(PetRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| diesel_error(&err))?;
        let ids: Vec<i64> = pet_rows.iter().map(|row| row.id).collect();
        let application_rows: Vec<ApplicationRow> = adoption_applications::table
            .filter(adoption_applications::pet_id.eq_any(ids))
            .order((
                adoption_applications::applied_at.desc(),
                adoption_applications::id.desc(),
            ))
            .select(ApplicationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| diesel_error(&err))?;

        let mut received: HashMap<PetId, Vec<ReceivedApplication>> = HashMap::new();
        for row in application_rows {
            let application = Application::try_from(row).map_err(AdoptionPersistenceError::query)?;
            received
                .entry(application.pet_id)
                .or_default()
                .push(application.into());
        }

        pet_rows
            .into_iter()
            .map(|row| {
                let pet = Pet::try_from(row).map_err(AdoptionPersistenceError::query)?;
                let applications = received.remove(&pet.id).unwrap_or_default();
                Ok(DonationHistoryEntry {
                    id: pet.id,
                    name: pet.name,
                    image: pet.image,
                    status: pet.status,
                    created_at: pet.created_at,
                    application_count: count(applications.len()),
                    applications,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    //! Error classification; transactional behaviour is covered by the
    //! database-backed integration tests.
    use super::*;
    use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;

    struct Violation(&'static str);

    impl DatabaseErrorInformation for Violation {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            None
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            Some(self.0)
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn violation(constraint: &'static str) -> DieselError {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, Box::new(Violation(constraint)))
    }

    #[rstest]
    fn duplicate_application_is_refused_as_already_applied() {
        let error = refuse_duplicate(
            violation(APPLICATION_CONSTRAINT),
            APPLICATION_CONSTRAINT,
            LifecycleError::AlreadyApplied,
        );
        assert_eq!(
            AdoptionPersistenceError::from(error),
            AdoptionPersistenceError::rejected(LifecycleError::AlreadyApplied)
        );
    }

    #[rstest]
    fn second_adoption_row_is_refused_as_already_adopted() {
        let error = refuse_duplicate(
            violation(ADOPTION_CONSTRAINT),
            ADOPTION_CONSTRAINT,
            LifecycleError::PetAlreadyAdopted,
        );
        assert_eq!(
            AdoptionPersistenceError::from(error),
            AdoptionPersistenceError::rejected(LifecycleError::PetAlreadyAdopted)
        );
    }

    #[rstest]
    fn other_constraints_stay_query_errors() {
        let error = refuse_duplicate(
            violation("users_email_key"),
            APPLICATION_CONSTRAINT,
            LifecycleError::AlreadyApplied,
        );
        assert!(matches!(
            AdoptionPersistenceError::from(error),
            AdoptionPersistenceError::Query { .. }
        ));
    }

    #[rstest]
    fn corrupt_rows_surface_as_query_errors() {
        let error = TxError::Corrupt("unknown pet status: lost".to_owned());
        assert_eq!(
            AdoptionPersistenceError::from(error),
            AdoptionPersistenceError::query("unknown pet status: lost")
        );
    }
}
