//! Session cookie handling for HTTP handlers.
//!
//! [`SessionContext`] only carries the token presented with the request.
//! Handlers resolve it explicitly against the [`SessionStore`], so identity
//! is an input of every authenticated call rather than ambient state.

use actix_web::cookie::Cookie;
use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::{Ready, ready};
use tracing::debug;

use crate::domain::ports::SessionStore;
use crate::domain::session::SESSION_TTL_SECS;
use crate::domain::{Error, IssuedSession, SessionToken, UserId};

use super::session_config::CookieSettings;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session_id";

/// Message returned when a request needs a live session and has none.
pub(crate) const NOT_AUTHENTICATED: &str = "Not authenticated";

/// Session token presented with the current request, if any.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    token: Option<SessionToken>,
}

impl SessionContext {
    /// Wrap an already parsed token.
    #[must_use]
    pub const fn new(token: Option<SessionToken>) -> Self {
        Self { token }
    }

    /// Token from the `session_id` cookie, when well formed.
    #[must_use]
    pub const fn token(&self) -> Option<&SessionToken> {
        self.token.as_ref()
    }

    /// Resolve the caller; `None` for anonymous, expired or revoked sessions.
    pub async fn user_id(&self, sessions: &dyn SessionStore) -> Result<Option<UserId>, Error> {
        match &self.token {
            Some(token) => sessions.resolve(token).await,
            None => Ok(None),
        }
    }

    /// Resolve the caller or fail with `401 Not authenticated`.
    pub async fn require_user(&self, sessions: &dyn SessionStore) -> Result<UserId, Error> {
        self.user_id(sessions)
            .await?
            .ok_or_else(|| Error::unauthenticated(NOT_AUTHENTICATED))
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = req.cookie(SESSION_COOKIE).and_then(|cookie| {
            let parsed = SessionToken::parse(cookie.value());
            if parsed.is_none() {
                debug!("ignoring malformed session cookie");
            }
            parsed
        });
        ready(Ok(Self::new(token)))
    }
}

/// Cookie handing a freshly issued session to the client.
#[must_use]
pub fn session_cookie(session: &IssuedSession, settings: CookieSettings) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, session.token.as_str().to_owned())
        .path("/")
        .http_only(true)
        .secure(settings.secure)
        .same_site(settings.same_site)
        .max_age(CookieDuration::seconds(SESSION_TTL_SECS))
        .finish()
}

/// Cookie instructing the client to drop its session.
#[must_use]
pub fn removal_cookie(settings: CookieSettings) -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE, "")
        .path("/")
        .http_only(true)
        .secure(settings.secure)
        .same_site(settings.same_site)
        .finish();
    cookie.make_removal();
    cookie
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockSessionStore;
    use actix_web::test::TestRequest;
    use rstest::rstest;

    fn extract(req: &HttpRequest) -> SessionContext {
        futures::executor::block_on(SessionContext::from_request(req, &mut Payload::None))
            .expect("infallible extractor")
    }

    #[rstest]
    fn reads_well_formed_cookie() {
        let token = SessionToken::generate();
        let req = TestRequest::default()
            .cookie(Cookie::new(SESSION_COOKIE, token.as_str().to_owned()))
            .to_http_request();
        assert_eq!(extract(&req).token(), Some(&token));
    }

    #[rstest]
    #[case(Some("not-a-token"))]
    #[case(None)]
    fn missing_or_malformed_cookie_is_anonymous(#[case] value: Option<&str>) {
        let mut builder = TestRequest::default();
        if let Some(value) = value {
            builder = builder.cookie(Cookie::new(SESSION_COOKIE, value.to_owned()));
        }
        assert!(extract(&builder.to_http_request()).token().is_none());
    }

    #[rstest]
    #[actix_web::test]
    async fn anonymous_requests_are_unauthenticated() {
        let store: Arc<dyn SessionStore> = Arc::new(MockSessionStore::new());
        let err = SessionContext::default()
            .require_user(store.as_ref())
            .await
            .expect_err("anonymous");
        assert_eq!(err.code(), ErrorCode::Unauthenticated);
        assert_eq!(err.message(), NOT_AUTHENTICATED);
    }

    #[rstest]
    #[actix_web::test]
    async fn expired_sessions_are_unauthenticated() {
        let mut store = MockSessionStore::new();
        store.expect_resolve().times(1).returning(|_| Ok(None));
        let context = SessionContext::new(Some(SessionToken::generate()));
        let err = context.require_user(&store).await.expect_err("expired");
        assert_eq!(err.code(), ErrorCode::Unauthenticated);
    }

    #[rstest]
    fn issued_cookie_lasts_seven_days() {
        let session = IssuedSession {
            token: SessionToken::generate(),
            user_id: UserId::new(1),
            expires_at: chrono::Utc::now(),
        };
        let cookie = session_cookie(&session, CookieSettings::default());
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.max_age(), Some(CookieDuration::days(7)));
    }

    #[rstest]
    fn removal_cookie_expires_immediately() {
        let cookie = removal_cookie(CookieSettings::default());
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(CookieDuration::ZERO));
    }
}
