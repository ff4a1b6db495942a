//! Adoption lifecycle rules.
//!
//! Pets move `available -> adopted`; applications move `pending -> approved`
//! or `pending -> rejected`. Storage adapters load the rows involved under a
//! lock, call the matching `check_*` function, and only then write. Keeping
//! the rules here means every adapter rejects the same requests with the same
//! errors.

use super::{ApplicationId, ApplicationStatus, PetId, PetStatus, UserId};
use crate::domain::Error;

/// Broad category of a lifecycle violation, used for status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleErrorKind {
    /// A referenced row is missing or not eligible.
    NotFound,
    /// The request conflicts with the current state.
    Conflict,
    /// The caller lacks rights over the resource.
    Unauthorized,
}

/// A request the lifecycle rules refuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    /// The pet does not exist or is not available for applications.
    #[error("Pet not available")]
    PetUnavailable,
    /// The applicant already applied for this pet.
    #[error("You have already applied for this pet")]
    AlreadyApplied,
    /// No application with the given id.
    #[error("Application not found")]
    ApplicationNotFound,
    /// No pet with the given id.
    #[error("Pet not found")]
    PetNotFound,
    /// The caller did not donate the pet.
    #[error("Only the donor can manage this pet")]
    NotPetDonor,
    /// The application was already approved or rejected.
    #[error("Application has already been decided")]
    ApplicationNotPending,
    /// Another approval adopted the pet first.
    #[error("Pet is no longer available")]
    PetAlreadyAdopted,
    /// Donors cannot withdraw a pet that has been adopted.
    #[error("Adopted pets cannot be removed")]
    DonationAdopted,
    /// Only the administrator may delete arbitrary listings.
    #[error("Unauthorized")]
    NotAdministrator,
}

impl LifecycleError {
    /// Category used when mapping to transport errors.
    #[must_use]
    pub const fn kind(self) -> LifecycleErrorKind {
        match self {
            Self::PetUnavailable | Self::ApplicationNotFound | Self::PetNotFound => {
                LifecycleErrorKind::NotFound
            }
            Self::AlreadyApplied
            | Self::ApplicationNotPending
            | Self::PetAlreadyAdopted
            | Self::DonationAdopted => LifecycleErrorKind::Conflict,
            Self::NotPetDonor | Self::NotAdministrator => LifecycleErrorKind::Unauthorized,
        }
    }
}

impl From<LifecycleError> for Error {
    fn from(err: LifecycleError) -> Self {
        let message = err.to_string();
        match err.kind() {
            LifecycleErrorKind::NotFound => Self::not_found(message),
            LifecycleErrorKind::Conflict => Self::conflict(message),
            LifecycleErrorKind::Unauthorized => Self::forbidden(message),
        }
    }
}

/// The columns of a pet row the rules look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingState {
    pub id: PetId,
    pub donor: UserId,
    pub status: PetStatus,
}

/// The columns of an application row the rules look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplicationState {
    pub id: ApplicationId,
    pub pet_id: PetId,
    pub applicant: UserId,
    pub status: ApplicationStatus,
}

/// A new application needs an available pet and no earlier application by
/// the same user.
pub fn check_submission(
    pet: Option<&ListingState>,
    already_applied: bool,
) -> Result<(), LifecycleError> {
    match pet {
        Some(pet) if pet.status == PetStatus::Available => {}
        _ => return Err(LifecycleError::PetUnavailable),
    }
    if already_applied {
        return Err(LifecycleError::AlreadyApplied);
    }
    Ok(())
}

/// Approval requires the donor of a still available pet and a pending
/// application.
///
/// Adoption of the pet is checked before the application's own status so
/// that the loser of two racing approvals on one pet is told the pet is gone,
/// even though the winner has already rejected its application.
pub fn check_approval(
    application: Option<&ApplicationState>,
    pet: Option<&ListingState>,
    actor: UserId,
) -> Result<(), LifecycleError> {
    let application = application.ok_or(LifecycleError::ApplicationNotFound)?;
    let pet = pet
        .filter(|pet| pet.id == application.pet_id)
        .ok_or(LifecycleError::PetNotFound)?;
    if pet.donor != actor {
        return Err(LifecycleError::NotPetDonor);
    }
    if pet.status == PetStatus::Adopted {
        return Err(LifecycleError::PetAlreadyAdopted);
    }
    if application.status != ApplicationStatus::Pending {
        return Err(LifecycleError::ApplicationNotPending);
    }
    Ok(())
}

/// Applications other than `approved` that are still pending and must be
/// rejected alongside an approval.
#[must_use]
pub fn siblings_to_reject(
    approved: ApplicationId,
    applications: &[ApplicationState],
) -> Vec<ApplicationId> {
    applications
        .iter()
        .filter(|a| a.id != approved && a.status == ApplicationStatus::Pending)
        .map(|a| a.id)
        .collect()
}

/// Donors may withdraw their own listings while they are still available.
pub fn check_donor_removal(pet: Option<&ListingState>, actor: UserId) -> Result<(), LifecycleError> {
    let pet = pet.ok_or(LifecycleError::PetNotFound)?;
    if pet.donor != actor {
        return Err(LifecycleError::NotPetDonor);
    }
    if pet.status == PetStatus::Adopted {
        return Err(LifecycleError::DonationAdopted);
    }
    Ok(())
}

/// Arbitrary deletion is reserved for the administrator.
pub const fn check_administrator(is_administrator: bool) -> Result<(), LifecycleError> {
    if is_administrator {
        Ok(())
    } else {
        Err(LifecycleError::NotAdministrator)
    }
}

/// The administrator may delete any existing listing, adopted or not.
///
/// Callers run [`check_administrator`] first so a non-administrator learns
/// nothing about which ids exist.
pub fn check_admin_deletion(pet: Option<&ListingState>) -> Result<(), LifecycleError> {
    pet.map(|_| ()).ok_or(LifecycleError::PetNotFound)
}
