//! Driving port for donor and adopter actions.
//!
//! Every method takes the acting user explicitly; handlers obtain it from the
//! resolved session.

use async_trait::async_trait;

use crate::domain::{
    Application, ApplicationDetails, ApplicationId, ApprovalOutcome, DonationForm, Error,
    ImageUpload, Pet, PetId, UserId,
};

/// A donation as received from the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonationRequest {
    pub form: DonationForm,
    /// `None` when the form carried no usable image part.
    pub image: Option<ImageUpload>,
}

/// Mutating adoption use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdoptionCommand: Send + Sync {
    /// List a pet for adoption.
    async fn donate(&self, donor: UserId, request: DonationRequest) -> Result<Pet, Error>;

    /// Apply to adopt an available pet.
    async fn apply(
        &self,
        applicant: UserId,
        pet: PetId,
        details: ApplicationDetails,
    ) -> Result<Application, Error>;

    /// Approve an application on one of the donor's pets.
    async fn approve(
        &self,
        donor: UserId,
        application: ApplicationId,
    ) -> Result<ApprovalOutcome, Error>;

    /// Withdraw one of the donor's available listings.
    async fn remove_donation(&self, donor: UserId, pet: PetId) -> Result<(), Error>;

    /// Administrative deletion of any listing.
    async fn delete_pet(&self, actor: UserId, pet: PetId) -> Result<(), Error>;
}
