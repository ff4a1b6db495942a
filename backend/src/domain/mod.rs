//! Domain types, rules and use-case services for the adoption marketplace.
//!
//! Purpose: hold everything that decides *what* happens, independent of HTTP
//! and storage. Inbound adapters call the driving ports in [`ports`];
//! outbound adapters implement the driven ones.
//!
//! Public surface:
//! - [`Error`] and [`ErrorCode`]: transport-agnostic failures.
//! - Accounts: [`User`], [`EmailAddress`], [`LoginCredentials`],
//!   [`SignupDetails`] and the [`AccountService`].
//! - Sessions: [`SessionToken`], [`SessionService`].
//! - Catalogue: [`Pet`], [`DonationForm`], [`PetSearchParams`] compiled to
//!   [`PetSearch`], served by [`CatalogueService`].
//! - Adoption lifecycle: [`adoption`] and [`AdoptionService`].

pub mod account;
pub mod adoption;
pub mod auth;
pub mod catalogue;
pub mod error;
pub mod example_data;
pub mod ids;
pub mod pet;
pub mod pet_filter;
pub mod ports;
pub mod session;
pub mod trace_id;
pub mod user;

pub use self::account::AccountService;
pub use self::adoption::{
    Adoption, AdoptionHistoryEntry, AdoptionService, ApplicantSnapshot, Application,
    ApplicationDetails, ApplicationHistoryEntry, ApplicationState, ApplicationStatus,
    ApplicationValidationError, ApprovalOutcome, DonationHistoryEntry, LifecycleError,
    LifecycleErrorKind, ListingState, NewApplication, ReceivedApplication,
};
pub use self::auth::{
    LoginCredentials, LoginValidationError, SignupDetails, SignupValidationError,
};
pub use self::catalogue::CatalogueService;
pub use self::error::{Error, ErrorCode};
pub use self::example_data::{ExampleDataSeeder, ExampleDataSeedingError, SeedOutcome};
pub use self::ids::{AdoptionId, ApplicationId, PetId, UserId};
pub use self::pet::{
    DEFAULT_LOCATION, DonationForm, DonationValidationError, ImageUpload, NewPet, Pet,
    PetDetails, PetStatus,
};
pub use self::pet_filter::{
    AgeBand, PET_PAGE_SIZE, PetFilter, PetFilterError, PetPredicate, PetSearch, PetSearchParams,
    PetSort,
};
pub use self::session::{
    IssuedSession, SessionDigest, SessionRecord, SessionService, SessionToken, session_ttl,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{EmailAddress, NewUser, User, UserValidationError};

/// Convenient result alias for handlers and services.
///
/// # Examples
/// ```
/// use pet_adoption::domain::{ApiResult, Error};
///
/// fn guarded() -> ApiResult<()> {
///     Err(Error::forbidden("Unauthorized"))
/// }
/// assert!(guarded().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
