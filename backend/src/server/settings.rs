//! Process configuration loaded via OrthoConfig.
//!
//! Values come from `ADOPTION_*` environment variables, CLI flags or a
//! config file; optional fields fall back to the defaults below.

use std::net::SocketAddr;
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use pet_adoption::domain::{EmailAddress, UserValidationError};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_UPLOADS_DIR: &str = "uploads";
const DEFAULT_ADMIN_EMAIL: &str = "admin@petcenter.com";
const DEFAULT_POOL_MAX_SIZE: u32 = 10;

/// Invalid configuration values.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address {value}: {source}")]
    BindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("invalid administrator email {value}: {source}")]
    AdminEmail {
        value: String,
        source: UserValidationError,
    },
}

/// Server settings.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ADOPTION")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; when absent the in-memory store is used.
    pub database_url: Option<String>,
    /// Directory holding uploaded images.
    pub uploads_dir: Option<PathBuf>,
    /// Account allowed to delete any listing.
    pub admin_email: Option<String>,
    /// Password for the seeded administrator.
    pub admin_password: Option<String>,
    /// Create the administrator and sample catalogue at startup.
    #[ortho_config(default = false)]
    pub seed_example_data: bool,
    /// Upper bound on pooled database connections.
    pub pool_max_size: Option<u32>,
}

impl std::fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppSettings")
            .field("bind_addr", &self.bind_addr)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("uploads_dir", &self.uploads_dir)
            .field("admin_email", &self.admin_email)
            .field("admin_password", &self.admin_password.as_ref().map(|_| "<redacted>"))
            .field("seed_example_data", &self.seed_example_data)
            .field("pool_max_size", &self.pool_max_size)
            .finish()
    }
}

impl AppSettings {
    /// Listen address, defaulting to all interfaces on port 8000.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// Uploads directory, defaulting to `./uploads`.
    pub fn uploads_dir(&self) -> PathBuf {
        self.uploads_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOADS_DIR))
    }

    /// Administrator email, normalised.
    pub fn admin_email(&self) -> Result<EmailAddress, SettingsError> {
        let value = self.admin_email.as_deref().unwrap_or(DEFAULT_ADMIN_EMAIL);
        EmailAddress::parse(value).map_err(|source| SettingsError::AdminEmail {
            value: value.to_owned(),
            source,
        })
    }

    /// Connection pool size.
    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }
}

#[cfg(test)]
mod tests {
    //! Configuration parsing and defaults.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 7] = [
        "ADOPTION_BIND_ADDR",
        "ADOPTION_DATABASE_URL",
        "ADOPTION_UPLOADS_DIR",
        "ADOPTION_ADMIN_EMAIL",
        "ADOPTION_ADMIN_PASSWORD",
        "ADOPTION_SEED_EXAMPLE_DATA",
        "ADOPTION_POOL_MAX_SIZE",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("pet-adoption")]).expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("bind addr"),
            "0.0.0.0:8000".parse::<SocketAddr>().expect("literal")
        );
        assert!(settings.database_url.is_none());
        assert_eq!(settings.uploads_dir(), PathBuf::from("uploads"));
        assert_eq!(
            settings.admin_email().expect("admin email").as_ref(),
            "admin@petcenter.com"
        );
        assert!(!settings.seed_example_data);
        assert_eq!(settings.pool_max_size(), 10);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("ADOPTION_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            ("ADOPTION_DATABASE_URL", Some("postgres://localhost/pets".to_owned())),
            ("ADOPTION_UPLOADS_DIR", Some("/srv/uploads".to_owned())),
            ("ADOPTION_ADMIN_EMAIL", Some("Root@Shelter.org".to_owned())),
            ("ADOPTION_ADMIN_PASSWORD", Some("hunter2".to_owned())),
            ("ADOPTION_SEED_EXAMPLE_DATA", Some("true".to_owned())),
            ("ADOPTION_POOL_MAX_SIZE", Some("4".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr().expect("bind addr").port(), 9000);
        assert_eq!(
            settings.database_url.as_deref(),
            Some("postgres://localhost/pets")
        );
        assert_eq!(settings.uploads_dir(), PathBuf::from("/srv/uploads"));
        assert_eq!(
            settings.admin_email().expect("admin email").as_ref(),
            "root@shelter.org"
        );
        assert!(settings.seed_example_data);
        assert_eq!(settings.pool_max_size(), 4);
        assert!(!format!("{settings:?}").contains("hunter2"));
    }

    #[rstest]
    fn malformed_bind_address_is_reported() {
        let _guard = lock_env([("ADOPTION_BIND_ADDR", Some("not-an-address".to_owned()))]);
        let settings = load_from_empty_args();
        assert!(matches!(
            settings.bind_addr(),
            Err(SettingsError::BindAddr { .. })
        ));
    }
}
