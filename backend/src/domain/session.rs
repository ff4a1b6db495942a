//! Opaque session tokens and the session store service.
//!
//! A token is 32 bytes from the operating system RNG, hex encoded for the
//! cookie. Only its SHA-256 digest is persisted, so a leaked sessions table
//! cannot be replayed. Expiry is checked lazily when a token is resolved.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use zeroize::Zeroizing;

use super::ports::{SessionPersistenceError, SessionRepository, SessionStore};
use super::{Error, UserId};

/// Bytes of entropy carried by a session token.
pub const SESSION_TOKEN_BYTES: usize = 32;

/// Session lifetime in seconds (seven days).
pub const SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Session lifetime as a duration.
#[must_use]
pub fn session_ttl() -> TimeDelta {
    TimeDelta::seconds(SESSION_TTL_SECS)
}

/// Bearer token presented in the `session_id` cookie.
///
/// `Debug` output is redacted and the buffer is zeroed on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(Zeroizing<String>);

impl SessionToken {
    /// Generate a fresh token from the operating system RNG.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = Zeroizing::new([0_u8; SESSION_TOKEN_BYTES]);
        OsRng.fill_bytes(bytes.as_mut_slice());
        Self(Zeroizing::new(hex::encode(bytes.as_slice())))
    }

    /// Accept a token read from a cookie.
    ///
    /// Anything that could not have been issued by [`SessionToken::generate`]
    /// is rejected up front so it never reaches the store.
    ///
    /// # Examples
    /// ```
    /// use pet_adoption::domain::SessionToken;
    ///
    /// assert!(SessionToken::parse("not-a-token").is_none());
    /// let token = SessionToken::generate();
    /// assert!(SessionToken::parse(token.as_str()).is_some());
    /// ```
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let well_formed = raw.len() == SESSION_TOKEN_BYTES * 2
            && raw.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        well_formed.then(|| Self(Zeroizing::new(raw.to_owned())))
    }

    /// Token text for the cookie value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Digest stored in place of the token.
    #[must_use]
    pub fn digest(&self) -> SessionDigest {
        SessionDigest(hex::encode(Sha256::digest(self.0.as_bytes())))
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

/// Hex-encoded SHA-256 of a session token; the persisted lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionDigest(String);

impl SessionDigest {
    /// Rebuild a digest read back from storage.
    #[must_use]
    pub fn from_stored(hex_digest: impl Into<String>) -> Self {
        Self(hex_digest.into())
    }
}

impl AsRef<str> for SessionDigest {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Persisted session row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub digest: SessionDigest,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    /// A session is live strictly before its expiry instant.
    #[must_use]
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// A newly created session handed back to the login flow.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: SessionToken,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
}

pub(crate) fn map_session_persistence_error(error: SessionPersistenceError) -> Error {
    match error {
        SessionPersistenceError::Connection { message } => Error::service_unavailable(message),
        SessionPersistenceError::Query { message } => Error::internal(message),
    }
}

/// Session store backed by a [`SessionRepository`].
#[derive(Clone)]
pub struct SessionService<R> {
    repository: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> SessionService<R> {
    /// Create a service over `repository`, reading time from `clock`.
    pub fn new(repository: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }
}

impl<R> SessionService<R>
where
    R: SessionRepository,
{
    /// Resolve `token` against an explicit instant.
    ///
    /// Unknown, expired and revoked tokens are indistinguishable to callers.
    pub async fn resolve_at(
        &self,
        token: &SessionToken,
        now: DateTime<Utc>,
    ) -> Result<Option<UserId>, Error> {
        let record = self
            .repository
            .find(&token.digest())
            .await
            .map_err(map_session_persistence_error)?;
        Ok(record
            .filter(|session| session.is_live_at(now))
            .map(|session| session.user_id))
    }
}

#[async_trait]
impl<R> SessionStore for SessionService<R>
where
    R: SessionRepository,
{
    async fn create(&self, user_id: UserId) -> Result<IssuedSession, Error> {
        let token = SessionToken::generate();
        let expires_at = self.clock.utc() + session_ttl();
        let record = SessionRecord {
            digest: token.digest(),
            user_id,
            expires_at,
        };
        self.repository
            .insert(&record)
            .await
            .map_err(map_session_persistence_error)?;
        debug!(user_id = %user_id, %expires_at, "session created");
        Ok(IssuedSession {
            token,
            user_id,
            expires_at,
        })
    }

    async fn resolve(&self, token: &SessionToken) -> Result<Option<UserId>, Error> {
        self.resolve_at(token, self.clock.utc()).await
    }

    async fn revoke(&self, token: &SessionToken) -> Result<(), Error> {
        self.repository
            .delete(&token.digest())
            .await
            .map_err(map_session_persistence_error)
    }

    async fn purge_expired(&self) -> Result<u64, Error> {
        let removed = self
            .repository
            .purge_expired(self.clock.utc())
            .await
            .map_err(map_session_persistence_error)?;
        if removed > 0 {
            info!(removed, "purged expired sessions");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    //! Session lifecycle coverage against a mocked repository.
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockSessionRepository;
    use chrono::{Local, TimeZone};
    use rstest::{fixture, rstest};

    struct MutableClock(Mutex<DateTime<Utc>>);

    impl MutableClock {
        fn advance(&self, by: TimeDelta) {
            let mut now = self.0.lock().expect("clock lock");
            *now += by;
        }
    }

    impl Clock for MutableClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            *self.0.lock().expect("clock lock")
        }
    }

    #[derive(Default)]
    struct RecordingRepository {
        rows: Mutex<HashMap<SessionDigest, SessionRecord>>,
    }

    #[async_trait]
    impl SessionRepository for RecordingRepository {
        async fn insert(&self, session: &SessionRecord) -> Result<(), SessionPersistenceError> {
            self.rows
                .lock()
                .expect("rows lock")
                .insert(session.digest.clone(), session.clone());
            Ok(())
        }

        async fn find(
            &self,
            digest: &SessionDigest,
        ) -> Result<Option<SessionRecord>, SessionPersistenceError> {
            Ok(self.rows.lock().expect("rows lock").get(digest).cloned())
        }

        async fn delete(&self, digest: &SessionDigest) -> Result<(), SessionPersistenceError> {
            self.rows.lock().expect("rows lock").remove(digest);
            Ok(())
        }

        async fn purge_expired(
            &self,
            now: DateTime<Utc>,
        ) -> Result<u64, SessionPersistenceError> {
            let mut rows = self.rows.lock().expect("rows lock");
            let before = rows.len();
            rows.retain(|_, session| session.is_live_at(now));
            Ok((before - rows.len()) as u64)
        }
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[fixture]
    fn clock() -> Arc<MutableClock> {
        Arc::new(MutableClock(Mutex::new(start())))
    }

    fn service(clock: Arc<MutableClock>) -> SessionService<RecordingRepository> {
        SessionService::new(Arc::new(RecordingRepository::default()), clock)
    }

    #[rstest]
    fn generated_tokens_carry_256_bits() {
        let token = SessionToken::generate();
        assert_eq!(token.as_str().len(), SESSION_TOKEN_BYTES * 2);
        assert_ne!(token, SessionToken::generate());
    }

    #[rstest]
    fn debug_output_is_redacted() {
        let token = SessionToken::generate();
        assert!(!format!("{token:?}").contains(token.as_str()));
    }

    #[rstest]
    #[case("")]
    #[case("abc")]
    #[case(&"A".repeat(64))]
    #[case(&"z".repeat(64))]
    fn parse_rejects_foreign_tokens(#[case] raw: &str) {
        assert!(SessionToken::parse(raw).is_none());
    }

    #[rstest]
    fn digest_differs_from_token() {
        let token = SessionToken::generate();
        let digest = token.digest();
        assert_ne!(digest.as_ref(), token.as_str());
        assert_eq!(digest, token.digest());
    }

    #[rstest]
    #[tokio::test]
    async fn resolve_returns_user_until_expiry(clock: Arc<MutableClock>) {
        let service = service(clock.clone());
        let issued = service.create(UserId::new(7)).await.expect("create session");
        assert_eq!(issued.expires_at, start() + session_ttl());

        clock.advance(session_ttl() - TimeDelta::seconds(1));
        let resolved = service.resolve(&issued.token).await.expect("resolve");
        assert_eq!(resolved, Some(UserId::new(7)));

        clock.advance(TimeDelta::seconds(1));
        let resolved = service.resolve(&issued.token).await.expect("resolve");
        assert_eq!(resolved, None, "a session is dead at its expiry instant");
    }

    #[rstest]
    #[tokio::test]
    async fn revoke_prevents_reuse(clock: Arc<MutableClock>) {
        let service = service(clock);
        let issued = service.create(UserId::new(1)).await.expect("create session");
        service.revoke(&issued.token).await.expect("revoke");
        let resolved = service.resolve(&issued.token).await.expect("resolve");
        assert!(resolved.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn users_may_hold_several_sessions(clock: Arc<MutableClock>) {
        let service = service(clock);
        let first = service.create(UserId::new(1)).await.expect("first");
        let second = service.create(UserId::new(1)).await.expect("second");
        service.revoke(&first.token).await.expect("revoke first");

        assert!(service.resolve(&first.token).await.expect("resolve").is_none());
        assert_eq!(
            service.resolve(&second.token).await.expect("resolve"),
            Some(UserId::new(1))
        );
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_token_resolves_to_none(clock: Arc<MutableClock>) {
        let service = service(clock);
        let resolved = service
            .resolve(&SessionToken::generate())
            .await
            .expect("resolve");
        assert!(resolved.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn purge_removes_only_expired_sessions(clock: Arc<MutableClock>) {
        let service = service(clock.clone());
        let old = service.create(UserId::new(1)).await.expect("old");
        clock.advance(TimeDelta::days(3));
        let fresh = service.create(UserId::new(2)).await.expect("fresh");
        clock.advance(TimeDelta::days(5));

        assert_eq!(service.purge_expired().await.expect("purge"), 1);
        assert!(service.resolve(&old.token).await.expect("resolve").is_none());
        assert!(service.resolve(&fresh.token).await.expect("resolve").is_some());
    }

    #[rstest]
    #[case(SessionPersistenceError::connection("down"), ErrorCode::ServiceUnavailable)]
    #[case(SessionPersistenceError::query("boom"), ErrorCode::InternalError)]
    #[tokio::test]
    async fn repository_failures_are_mapped(
        #[case] failure: SessionPersistenceError,
        #[case] expected: ErrorCode,
    ) {
        let mut repository = MockSessionRepository::new();
        repository
            .expect_find()
            .times(1)
            .return_once(move |_| Err(failure));
        let service = SessionService::new(Arc::new(repository), clock());

        let err = service
            .resolve(&SessionToken::generate())
            .await
            .expect_err("failure must surface");
        assert_eq!(err.code(), expected);
    }
}
