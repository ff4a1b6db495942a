//! PostgreSQL-backed [`SessionRepository`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{SessionPersistenceError, SessionRepository};
use crate::domain::{SessionDigest, SessionRecord};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::{NewSessionRow, SessionRow};
use super::pool::DbPool;
use super::schema::sessions;

/// Diesel implementation of [`SessionRepository`].
#[derive(Clone)]
pub struct DieselSessionRepository {
    pool: DbPool,
}

impl DieselSessionRepository {
    /// Create a repository over `pool`.
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn diesel_error(error: &diesel::result::Error) -> SessionPersistenceError {
    map_diesel_error(
        error,
        SessionPersistenceError::query,
        SessionPersistenceError::connection,
    )
}

#[async_trait]
impl SessionRepository for DieselSessionRepository {
    async fn insert(&self, session: &SessionRecord) -> Result<(), SessionPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, SessionPersistenceError::connection))?;
        diesel::insert_into(sessions::table)
            .values(&NewSessionRow {
                token_digest: session.digest.as_ref(),
                user_id: session.user_id.get(),
                expires_at: session.expires_at,
            })
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| diesel_error(&err))
    }

    async fn find(
        &self,
        digest: &SessionDigest,
    ) -> Result<Option<SessionRecord>, SessionPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, SessionPersistenceError::connection))?;
        let row: Option<SessionRow> = sessions::table
            .find(digest.as_ref())
            .select(SessionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| diesel_error(&err))?;
        Ok(row.map(SessionRecord::from))
    }

    async fn delete(&self, digest: &SessionDigest) -> Result<(), SessionPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, SessionPersistenceError::connection))?;
        diesel::delete(sessions::table.find(digest.as_ref()))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| diesel_error(&err))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, SessionPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, SessionPersistenceError::connection))?;
        let removed = diesel::delete(sessions::table.filter(sessions::expires_at.le(now)))
            .execute(&mut conn)
            .await
            .map_err(|err| diesel_error(&err))?;
        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }
}
