//! Diesel row structs and their conversions into domain types.
//!
//! Rows never leave the persistence module. Conversions that can fail
//! (status text, stored emails) report a plain message that each repository
//! wraps in its own query error.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{adoption_applications, adoptions, pets, sessions, users};
use crate::domain::ports::StoredCredentials;
use crate::domain::{
    Adoption, AdoptionId, ApplicantSnapshot, Application, ApplicationDetails, ApplicationId,
    ApplicationState, ApplicationStatus, EmailAddress, ListingState, Pet, PetId, PetStatus,
    SessionDigest, SessionRecord, User, UserId,
};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
}

impl UserRow {
    pub(crate) fn into_user(self) -> Result<User, String> {
        Ok(self.into_credentials()?.user)
    }

    pub(crate) fn into_credentials(self) -> Result<StoredCredentials, String> {
        let email = EmailAddress::parse(&self.email)
            .map_err(|err| format!("stored email for user {}: {err}", self.id))?;
        Ok(StoredCredentials {
            user: User {
                id: UserId::new(self.id),
                name: self.name,
                email,
                phone: self.phone,
            },
            password_hash: self.password_hash,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub password_hash: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = pets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PetRow {
    pub id: i64,
    pub name: String,
    pub breed: String,
    pub age: i32,
    pub species: String,
    pub image: String,
    pub bio: String,
    pub status: String,
    pub donated_by: i64,
    pub location: String,
    pub price: i64,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<PetRow> for Pet {
    type Error = String;

    fn try_from(row: PetRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<PetStatus>().map_err(|err| err.to_string())?;
        Ok(Self {
            id: PetId::new(row.id),
            name: row.name,
            breed: row.breed,
            age: row.age,
            species: row.species,
            image: row.image,
            bio: row.bio,
            status,
            donated_by: UserId::new(row.donated_by),
            location: row.location,
            price: row.price,
            created_at: row.created_at,
        })
    }
}

/// The columns lifecycle checks need, read under a row lock.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = pets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ListingRow {
    pub id: i64,
    pub donated_by: i64,
    pub status: String,
}

impl TryFrom<ListingRow> for ListingState {
    type Error = String;

    fn try_from(row: ListingRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: PetId::new(row.id),
            donor: UserId::new(row.donated_by),
            status: row
                .status
                .parse::<PetStatus>()
                .map_err(|err| err.to_string())?,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = pets)]
pub(crate) struct NewPetRow<'a> {
    pub name: &'a str,
    pub breed: &'a str,
    pub age: i32,
    pub species: &'a str,
    pub image: &'a str,
    pub bio: &'a str,
    pub donated_by: i64,
    pub location: &'a str,
    pub price: i64,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = adoption_applications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ApplicationRow {
    pub id: i64,
    pub pet_id: i64,
    pub applicant_id: i64,
    pub applicant_name: String,
    pub applicant_email: String,
    pub applicant_phone: String,
    pub experience: String,
    pub living_situation: String,
    pub reason: String,
    pub status: String,
    pub applied_at: DateTime<Utc>,
}

impl TryFrom<ApplicationRow> for Application {
    type Error = String;

    fn try_from(row: ApplicationRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<ApplicationStatus>()
            .map_err(|err| err.to_string())?;
        let details =
            ApplicationDetails::try_from_parts(&row.experience, &row.living_situation, &row.reason)
                .map_err(|err| format!("stored application {}: {err}", row.id))?;
        Ok(Self {
            id: ApplicationId::new(row.id),
            pet_id: PetId::new(row.pet_id),
            applicant_id: UserId::new(row.applicant_id),
            applicant: ApplicantSnapshot {
                name: row.applicant_name,
                email: row.applicant_email,
                phone: row.applicant_phone,
            },
            details,
            status,
            applied_at: row.applied_at,
        })
    }
}

impl ApplicationRow {
    pub(crate) fn state(&self) -> Result<ApplicationState, String> {
        Ok(ApplicationState {
            id: ApplicationId::new(self.id),
            pet_id: PetId::new(self.pet_id),
            applicant: UserId::new(self.applicant_id),
            status: self
                .status
                .parse::<ApplicationStatus>()
                .map_err(|err| err.to_string())?,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = adoption_applications)]
pub(crate) struct NewApplicationRow<'a> {
    pub pet_id: i64,
    pub applicant_id: i64,
    pub applicant_name: &'a str,
    pub applicant_email: &'a str,
    pub applicant_phone: &'a str,
    pub experience: &'a str,
    pub living_situation: &'a str,
    pub reason: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = adoptions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AdoptionRow {
    pub id: i64,
    pub pet_id: i64,
    pub adopter_id: i64,
    pub donor_id: i64,
    pub adopted_at: DateTime<Utc>,
}

impl From<AdoptionRow> for Adoption {
    fn from(row: AdoptionRow) -> Self {
        Self {
            id: AdoptionId::new(row.id),
            pet_id: PetId::new(row.pet_id),
            adopter_id: UserId::new(row.adopter_id),
            donor_id: UserId::new(row.donor_id),
            adopted_at: row.adopted_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = adoptions)]
pub(crate) struct NewAdoptionRow {
    pub pet_id: i64,
    pub adopter_id: i64,
    pub donor_id: i64,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SessionRow {
    pub token_digest: String,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
}

impl From<SessionRow> for SessionRecord {
    fn from(row: SessionRow) -> Self {
        Self {
            digest: SessionDigest::from_stored(row.token_digest),
            user_id: UserId::new(row.user_id),
            expires_at: row.expires_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = sessions)]
pub(crate) struct NewSessionRow<'a> {
    pub token_digest: &'a str,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
}
