//! Adoption applications, completed adoptions, and the history views built
//! from them.
//!
//! The state machine itself lives in [`lifecycle`]: pure checks that every
//! storage adapter runs inside its transaction before applying a transition.
//! [`AdoptionService`] is the use-case layer that inbound adapters call.

pub mod lifecycle;
mod service;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{AdoptionId, ApplicationId, PetId, PetStatus, User, UserId};

pub use lifecycle::{ApplicationState, LifecycleError, LifecycleErrorKind, ListingState};
pub use service::AdoptionService;

/// Decision state of an application. `Approved` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    /// Stored and serialised form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised application status read from storage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown application status: {0}")]
pub struct UnknownApplicationStatus(pub String);

impl FromStr for ApplicationStatus {
    type Err = UnknownApplicationStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(UnknownApplicationStatus(other.to_owned())),
        }
    }
}

/// Contact details copied from the applicant's account when they apply.
///
/// Later profile edits do not rewrite submitted applications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ApplicantSnapshot {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl From<&User> for ApplicantSnapshot {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.as_ref().to_owned(),
            phone: user.phone.clone(),
        }
    }
}

/// Application form failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ApplicationValidationError {
    /// A free-text answer was blank.
    #[error("All fields are required")]
    MissingFields,
}

/// The applicant's free-text answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ApplicationDetails {
    experience: String,
    living_situation: String,
    reason: String,
}

impl ApplicationDetails {
    /// Trim the answers; each must be non-blank.
    ///
    /// # Examples
    /// ```
    /// use pet_adoption::domain::ApplicationDetails;
    ///
    /// let details = ApplicationDetails::try_from_parts(" Two cats ", "House", "Company")
    ///     .expect("valid answers");
    /// assert_eq!(details.experience(), "Two cats");
    /// assert!(ApplicationDetails::try_from_parts("", "House", "Company").is_err());
    /// ```
    pub fn try_from_parts(
        experience: &str,
        living_situation: &str,
        reason: &str,
    ) -> Result<Self, ApplicationValidationError> {
        let [experience, living_situation, reason] =
            [experience, living_situation, reason].map(str::trim);
        if experience.is_empty() || living_situation.is_empty() || reason.is_empty() {
            return Err(ApplicationValidationError::MissingFields);
        }
        Ok(Self {
            experience: experience.to_owned(),
            living_situation: living_situation.to_owned(),
            reason: reason.to_owned(),
        })
    }

    #[must_use]
    pub fn experience(&self) -> &str {
        &self.experience
    }

    #[must_use]
    pub fn living_situation(&self) -> &str {
        &self.living_situation
    }

    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// An application ready to be submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApplication {
    pub pet_id: PetId,
    pub applicant_id: UserId,
    pub applicant: ApplicantSnapshot,
    pub details: ApplicationDetails,
}

/// A stored application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Application {
    pub id: ApplicationId,
    pub pet_id: PetId,
    pub applicant_id: UserId,
    pub applicant: ApplicantSnapshot,
    pub details: ApplicationDetails,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}

/// The record of a completed match. Never updated once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Adoption {
    pub id: AdoptionId,
    pub pet_id: PetId,
    pub adopter_id: UserId,
    pub donor_id: UserId,
    pub adopted_at: DateTime<Utc>,
}

/// Everything an approval changed, returned for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalOutcome {
    /// The adoption row that was written.
    pub adoption: Adoption,
    /// Sibling applications moved from pending to rejected.
    pub rejected: Vec<ApplicationId>,
}

/// Pet adopted by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AdoptionHistoryEntry {
    /// Pet id.
    pub id: PetId,
    pub name: String,
    pub breed: String,
    pub species: String,
    pub image: String,
    pub adopted_at: DateTime<Utc>,
}

/// Application submitted by the caller, joined with its pet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ApplicationHistoryEntry {
    pub id: ApplicationId,
    pub pet_name: String,
    pub pet_image: String,
    pub applicant_name: String,
    pub applicant_email: String,
    pub applicant_phone: String,
    pub experience: String,
    pub living_situation: String,
    pub reason: String,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}

/// Application received on one of the caller's listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReceivedApplication {
    pub id: ApplicationId,
    pub applicant_name: String,
    pub applicant_email: String,
    pub applicant_phone: String,
    pub experience: String,
    pub living_situation: String,
    pub reason: String,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}

impl From<Application> for ReceivedApplication {
    fn from(application: Application) -> Self {
        let Application {
            id,
            applicant,
            details,
            status,
            applied_at,
            ..
        } = application;
        Self {
            id,
            applicant_name: applicant.name,
            applicant_email: applicant.email,
            applicant_phone: applicant.phone,
            experience: details.experience,
            living_situation: details.living_situation,
            reason: details.reason,
            status,
            applied_at,
        }
    }
}

/// A listing donated by the caller with the applications it received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DonationHistoryEntry {
    /// Pet id.
    pub id: PetId,
    pub name: String,
    pub image: String,
    pub status: PetStatus,
    pub created_at: DateTime<Utc>,
    pub application_count: u64,
    /// Newest first.
    pub applications: Vec<ReceivedApplication>,
}

impl ApplicationHistoryEntry {
    /// Flatten an application and the name and image of its pet.
    #[must_use]
    pub fn new(application: Application, pet_name: String, pet_image: String) -> Self {
        let Application {
            id,
            applicant,
            details,
            status,
            applied_at,
            ..
        } = application;
        Self {
            id,
            pet_name,
            pet_image,
            applicant_name: applicant.name,
            applicant_email: applicant.email,
            applicant_phone: applicant.phone,
            experience: details.experience,
            living_situation: details.living_situation,
            reason: details.reason,
            status,
            applied_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "House", "Company")]
    #[case("Years", "  ", "Company")]
    #[case("Years", "House", "\n")]
    fn blank_answers_are_rejected(
        #[case] experience: &str,
        #[case] living: &str,
        #[case] reason: &str,
    ) {
        assert_eq!(
            ApplicationDetails::try_from_parts(experience, living, reason),
            Err(ApplicationValidationError::MissingFields)
        );
    }

    #[rstest]
    #[case(ApplicationStatus::Pending)]
    #[case(ApplicationStatus::Approved)]
    #[case(ApplicationStatus::Rejected)]
    fn status_text_parses_back(#[case] status: ApplicationStatus) {
        assert_eq!(status.as_str().parse::<ApplicationStatus>(), Ok(status));
    }

    #[rstest]
    fn unknown_status_is_reported() {
        assert_eq!(
            "withdrawn".parse::<ApplicationStatus>(),
            Err(UnknownApplicationStatus("withdrawn".to_owned()))
        );
    }

    #[rstest]
    fn received_application_flattens_snapshot() {
        let application = Application {
            id: ApplicationId::new(4),
            pet_id: PetId::new(2),
            applicant_id: UserId::new(9),
            applicant: ApplicantSnapshot {
                name: "Ada".into(),
                email: "ada@example.com".into(),
                phone: "555".into(),
            },
            details: ApplicationDetails::try_from_parts("Dogs", "Flat", "Love")
                .expect("valid details"),
            status: ApplicationStatus::Pending,
            applied_at: DateTime::<Utc>::UNIX_EPOCH,
        };
        let received = ReceivedApplication::from(application);
        assert_eq!(received.applicant_email, "ada@example.com");
        assert_eq!(received.living_situation, "Flat");
    }
}
