//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::web;

use crate::domain::ports::{
    MockAdoptionCommand, MockAdoptionQuery, MockImageStore, MockLoginService, MockPetsQuery,
    MockSessionStore, MockSignupService, MockUsersQuery,
};
use crate::domain::{SessionToken, UserId};

use super::session::SESSION_COOKIE;
use super::session_config::CookieSettings;
use super::state::{HttpState, HttpStatePorts};

/// Mocks for every port in [`HttpState`]; set expectations, then build.
#[derive(Default)]
pub struct TestPorts {
    pub sessions: MockSessionStore,
    pub login: MockLoginService,
    pub signup: MockSignupService,
    pub users: MockUsersQuery,
    pub pets: MockPetsQuery,
    pub adoption: MockAdoptionCommand,
    pub adoption_query: MockAdoptionQuery,
    pub images: MockImageStore,
}

impl TestPorts {
    /// Resolve every presented session token to `user`.
    #[must_use]
    pub fn signed_in_as(mut self, user: UserId) -> Self {
        self.sessions
            .expect_resolve()
            .returning(move |_| Ok(Some(user)));
        self
    }

    /// Resolve every presented session token to nobody.
    #[must_use]
    pub fn signed_out(mut self) -> Self {
        self.sessions.expect_resolve().returning(|_| Ok(None));
        self
    }

    /// Wrap the mocks as handler state with insecure cookies for plain HTTP.
    pub fn into_state(self) -> web::Data<HttpState> {
        let ports = HttpStatePorts {
            sessions: Arc::new(self.sessions),
            login: Arc::new(self.login),
            signup: Arc::new(self.signup),
            users: Arc::new(self.users),
            pets: Arc::new(self.pets),
            adoption: Arc::new(self.adoption),
            adoption_query: Arc::new(self.adoption_query),
            images: Arc::new(self.images),
        };
        let cookies = CookieSettings {
            secure: false,
            ..CookieSettings::default()
        };
        web::Data::new(HttpState::new(ports, cookies))
    }
}

/// A `session_id` cookie carrying a fresh token.
pub fn session_cookie() -> Cookie<'static> {
    Cookie::new(SESSION_COOKIE, SessionToken::generate().as_str().to_owned())
}
