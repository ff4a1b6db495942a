//! HTTP server configuration object.

use std::net::SocketAddr;
use std::path::PathBuf;

use pet_adoption::domain::EmailAddress;
use pet_adoption::inbound::http::session_config::CookieSettings;
use pet_adoption::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) cookies: CookieSettings,
    pub(crate) uploads_dir: PathBuf,
    pub(crate) admin_email: EmailAddress,
    pub(crate) admin_password: Option<String>,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Construct a configuration that uses the in-memory store until a pool
    /// is attached.
    #[must_use]
    pub fn new(
        bind_addr: SocketAddr,
        cookies: CookieSettings,
        uploads_dir: PathBuf,
        admin_email: EmailAddress,
    ) -> Self {
        Self {
            bind_addr,
            cookies,
            uploads_dir,
            admin_email,
            admin_password: None,
            db_pool: None,
        }
    }

    /// Attach a database connection pool for the Diesel adapters.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Seed the administrator and sample catalogue with this password.
    #[must_use]
    pub fn with_example_data(mut self, admin_password: String) -> Self {
        self.admin_password = Some(admin_password);
        self
    }
}
