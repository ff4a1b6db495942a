//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see driving ports, so
//! they stay testable with mocks and no I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AdoptionCommand, AdoptionQuery, ImageStore, LoginService, PetsQuery, SessionStore,
    SignupService, UsersQuery,
};

use super::session_config::CookieSettings;

/// Parameter object bundling the port implementations handlers call.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub sessions: Arc<dyn SessionStore>,
    pub login: Arc<dyn LoginService>,
    pub signup: Arc<dyn SignupService>,
    pub users: Arc<dyn UsersQuery>,
    pub pets: Arc<dyn PetsQuery>,
    pub adoption: Arc<dyn AdoptionCommand>,
    pub adoption_query: Arc<dyn AdoptionQuery>,
    pub images: Arc<dyn ImageStore>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub sessions: Arc<dyn SessionStore>,
    pub login: Arc<dyn LoginService>,
    pub signup: Arc<dyn SignupService>,
    pub users: Arc<dyn UsersQuery>,
    pub pets: Arc<dyn PetsQuery>,
    pub adoption: Arc<dyn AdoptionCommand>,
    pub adoption_query: Arc<dyn AdoptionQuery>,
    pub images: Arc<dyn ImageStore>,
    /// Attributes for the `session_id` cookie.
    pub cookies: CookieSettings,
}

impl HttpState {
    /// Construct state from a ports bundle and cookie settings.
    #[must_use]
    pub fn new(ports: HttpStatePorts, cookies: CookieSettings) -> Self {
        let HttpStatePorts {
            sessions,
            login,
            signup,
            users,
            pets,
            adoption,
            adoption_query,
            images,
        } = ports;
        Self {
            sessions,
            login,
            signup,
            users,
            pets,
            adoption,
            adoption_query,
            images,
            cookies,
        }
    }
}
