//! Adoption use-cases.
//!
//! The service validates input, resolves the acting user, and delegates each
//! lifecycle transition to the repository's atomic unit. Image bytes are
//! written before the listing row so no transaction is open during file I/O.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use super::lifecycle::check_administrator;
use super::{
    AdoptionHistoryEntry, ApplicantSnapshot, Application, ApplicationDetails,
    ApplicationHistoryEntry, ApplicationId, ApprovalOutcome, DonationHistoryEntry,
    NewApplication,
};
use crate::domain::account::map_user_error;
use crate::domain::catalogue::map_catalogue_error;
use crate::domain::ports::{
    AdoptionCommand, AdoptionPersistenceError, AdoptionQuery, AdoptionRepository,
    CatalogueRepository, DonationRequest, ImageStore, ImageStoreError, UserRepository,
};
use crate::domain::{DonationValidationError, EmailAddress, Error, Pet, PetId, User, UserId};

const NOT_AUTHENTICATED: &str = "Not authenticated";

fn map_adoption_error(error: AdoptionPersistenceError) -> Error {
    match error {
        AdoptionPersistenceError::Connection { message } => Error::service_unavailable(message),
        AdoptionPersistenceError::Query { message } => Error::internal(message),
        AdoptionPersistenceError::Rejected { reason } => reason.into(),
    }
}

fn map_image_error(error: &ImageStoreError) -> Error {
    Error::internal(format!("failed to store image: {error}"))
}

/// Implements [`AdoptionCommand`] and [`AdoptionQuery`].
#[derive(Clone)]
pub struct AdoptionService {
    adoptions: Arc<dyn AdoptionRepository>,
    catalogue: Arc<dyn CatalogueRepository>,
    users: Arc<dyn UserRepository>,
    images: Arc<dyn ImageStore>,
    admin_email: EmailAddress,
}

impl AdoptionService {
    /// Wire the service. `admin_email` identifies the account allowed to
    /// delete arbitrary listings.
    pub fn new(
        adoptions: Arc<dyn AdoptionRepository>,
        catalogue: Arc<dyn CatalogueRepository>,
        users: Arc<dyn UserRepository>,
        images: Arc<dyn ImageStore>,
        admin_email: EmailAddress,
    ) -> Self {
        Self {
            adoptions,
            catalogue,
            users,
            images,
            admin_email,
        }
    }

    async fn acting_user(&self, id: UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthenticated(NOT_AUTHENTICATED))
    }
}

#[async_trait]
impl AdoptionCommand for AdoptionService {
    async fn donate(&self, donor: UserId, request: DonationRequest) -> Result<Pet, Error> {
        let details = request
            .form
            .validate()
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let image = request
            .image
            .filter(|image| !image.file_name.trim().is_empty())
            .ok_or_else(|| {
                Error::invalid_request(DonationValidationError::MissingImage.to_string())
            })?;

        let reference = self
            .images
            .save(&image.extension(), &image.bytes)
            .await
            .map_err(|err| map_image_error(&err))?;
        let new_pet = details.into_new_pet(donor, reference.clone());

        match self.catalogue.insert_pet(&new_pet).await {
            Ok(pet) => {
                info!(pet_id = %pet.id, donor = %donor, "pet donated");
                Ok(pet)
            }
            Err(err) => {
                if let Err(cleanup) = self.images.remove(&reference).await {
                    warn!(%reference, error = %cleanup, "failed to remove orphaned image");
                }
                Err(map_catalogue_error(err))
            }
        }
    }

    async fn apply(
        &self,
        applicant: UserId,
        pet: PetId,
        details: ApplicationDetails,
    ) -> Result<Application, Error> {
        let user = self.acting_user(applicant).await?;
        let application = NewApplication {
            pet_id: pet,
            applicant_id: applicant,
            applicant: ApplicantSnapshot::from(&user),
            details,
        };
        let stored = self
            .adoptions
            .submit_application(&application)
            .await
            .map_err(map_adoption_error)?;
        info!(application_id = %stored.id, pet_id = %pet, "application submitted");
        Ok(stored)
    }

    async fn approve(
        &self,
        donor: UserId,
        application: ApplicationId,
    ) -> Result<ApprovalOutcome, Error> {
        let outcome = self
            .adoptions
            .approve_application(application, donor)
            .await
            .map_err(map_adoption_error)?;
        info!(
            application_id = %application,
            pet_id = %outcome.adoption.pet_id,
            adoption_id = %outcome.adoption.id,
            rejected = outcome.rejected.len(),
            "application approved"
        );
        Ok(outcome)
    }

    async fn remove_donation(&self, donor: UserId, pet: PetId) -> Result<(), Error> {
        self.adoptions
            .remove_donation(pet, donor)
            .await
            .map_err(map_adoption_error)?;
        info!(pet_id = %pet, donor = %donor, "donation removed");
        Ok(())
    }

    async fn delete_pet(&self, actor: UserId, pet: PetId) -> Result<(), Error> {
        let user = self.acting_user(actor).await?;
        if let Err(err) = check_administrator(user.email == self.admin_email) {
            warn!(user_id = %actor, pet_id = %pet, "non-administrator attempted pet deletion");
            return Err(err.into());
        }
        self.adoptions
            .delete_pet(pet)
            .await
            .map_err(map_adoption_error)?;
        info!(pet_id = %pet, "pet deleted by administrator");
        Ok(())
    }
}

#[async_trait]
impl AdoptionQuery for AdoptionService {
    async fn adoptions(&self, user: UserId) -> Result<Vec<AdoptionHistoryEntry>, Error> {
        self.adoptions
            .adoptions_by(user)
            .await
            .map_err(map_adoption_error)
    }

    async fn applications(&self, user: UserId) -> Result<Vec<ApplicationHistoryEntry>, Error> {
        self.adoptions
            .applications_by(user)
            .await
            .map_err(map_adoption_error)
    }

    async fn donations(&self, user: UserId) -> Result<Vec<DonationHistoryEntry>, Error> {
        self.adoptions
            .donations_by(user)
            .await
            .map_err(map_adoption_error)
    }
}
