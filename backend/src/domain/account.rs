//! Account use-cases: signup, login, logout and the current-user lookup.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use super::ports::{
    LoginOutcome, LoginService, PasswordHashError, PasswordHasher, SessionStore, SignupService,
    UserPersistenceError, UserRepository, UsersQuery,
};
use super::{Error, LoginCredentials, NewUser, SessionToken, SignupDetails, User, UserId};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub(crate) fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => Error::service_unavailable(message),
        UserPersistenceError::Query { message } => Error::internal(message),
        UserPersistenceError::DuplicateEmail {} => Error::conflict("Email already exists"),
    }
}

fn map_hash_error(error: &PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

/// Implements [`LoginService`], [`SignupService`] and [`UsersQuery`].
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionStore>,
    hasher: Arc<dyn PasswordHasher>,
}

impl AccountService {
    /// Wire the service.
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionStore>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            users,
            sessions,
            hasher,
        }
    }

    /// Run a hashing closure off the async executor.
    async fn with_hasher<T, F>(&self, work: F) -> Result<T, Error>
    where
        T: Send + 'static,
        F: FnOnce(&dyn PasswordHasher) -> Result<T, PasswordHashError> + Send + 'static,
    {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || work(hasher.as_ref()))
            .await
            .map_err(|err| Error::internal(format!("password task failed: {err}")))?
            .map_err(|err| map_hash_error(&err))
    }
}

#[async_trait]
impl LoginService for AccountService {
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginOutcome, Error> {
        let Some(stored) = self
            .users
            .find_credentials(credentials.email())
            .await
            .map_err(map_user_error)?
        else {
            warn!("login rejected: unknown email");
            return Err(Error::unauthenticated(INVALID_CREDENTIALS));
        };

        let password = credentials.password().to_owned();
        let hash = stored.password_hash;
        let verified = self
            .with_hasher(move |hasher| hasher.verify(&password, &hash))
            .await?;
        if !verified {
            warn!(user_id = %stored.user.id, "login rejected: wrong password");
            return Err(Error::unauthenticated(INVALID_CREDENTIALS));
        }

        let session = self.sessions.create(stored.user.id).await?;
        if let Err(err) = self.sessions.purge_expired().await {
            warn!(error = %err, "expired session purge failed");
        }
        info!(user_id = %stored.user.id, "user logged in");
        Ok(LoginOutcome {
            user: stored.user,
            session,
        })
    }

    async fn logout(&self, token: &SessionToken) -> Result<(), Error> {
        self.sessions.revoke(token).await
    }
}

#[async_trait]
impl SignupService for AccountService {
    async fn signup(&self, details: &SignupDetails) -> Result<User, Error> {
        let password = details.password().to_owned();
        let password_hash = self
            .with_hasher(move |hasher| hasher.hash(&password))
            .await?;
        let user = self
            .users
            .insert(&NewUser {
                name: details.name().to_owned(),
                email: details.email().clone(),
                phone: details.phone().to_owned(),
                password_hash,
            })
            .await
            .map_err(map_user_error)?;
        info!(user_id = %user.id, "account created");
        Ok(user)
    }
}

#[async_trait]
impl UsersQuery for AccountService {
    async fn current_user(&self, user_id: UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthenticated("Not authenticated"))
    }
}
