//! Driven port for the adoption lifecycle.
//!
//! Each mutating method is one atomic unit: the adapter locks the pet row,
//! loads the state it needs, runs the matching
//! [`lifecycle`](crate::domain::adoption::lifecycle) check and writes every
//! change or none. A refused transition comes back as `Rejected`.
use async_trait::async_trait;

use crate::domain::{
    AdoptionHistoryEntry, Application, ApplicationHistoryEntry, ApplicationId, ApprovalOutcome,
    DonationHistoryEntry, LifecycleError, NewApplication, PetId, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Failures raised by adoption repositories.
    pub enum AdoptionPersistenceError {
        /// The store could not be reached.
        Connection { message: String } => "adoption repository connection failed: {message}",
        /// A query failed; the transaction was rolled back.
        Query { message: String } => "adoption repository query failed: {message}",
        /// The lifecycle rules refused the request; nothing was written.
        Rejected { reason: LifecycleError } => "{reason}",
    }
}

/// Transactional lifecycle transitions and caller-scoped history.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdoptionRepository: Send + Sync {
    /// Record a pending application for an available pet.
    async fn submit_application(
        &self,
        application: &NewApplication,
    ) -> Result<Application, AdoptionPersistenceError>;

    /// Approve an application: adopt the pet, record the adoption, approve
    /// this application and reject its pending siblings.
    async fn approve_application(
        &self,
        application: ApplicationId,
        donor: UserId,
    ) -> Result<ApprovalOutcome, AdoptionPersistenceError>;

    /// Delete a donor's own available listing and its applications.
    async fn remove_donation(&self, pet: PetId, donor: UserId)
    -> Result<(), AdoptionPersistenceError>;

    /// Delete any listing with its applications and adoption record.
    ///
    /// Callers must have established administrator rights.
    async fn delete_pet(&self, pet: PetId) -> Result<(), AdoptionPersistenceError>;

    /// Pets adopted by `adopter`, newest first.
    async fn adoptions_by(
        &self,
        adopter: UserId,
    ) -> Result<Vec<AdoptionHistoryEntry>, AdoptionPersistenceError>;

    /// Applications submitted by `applicant`, newest first.
    async fn applications_by(
        &self,
        applicant: UserId,
    ) -> Result<Vec<ApplicationHistoryEntry>, AdoptionPersistenceError>;

    /// Listings donated by `donor` with their applications, newest first.
    async fn donations_by(
        &self,
        donor: UserId,
    ) -> Result<Vec<DonationHistoryEntry>, AdoptionPersistenceError>;
}
