//! Session cookie settings read from the environment.
//!
//! Release builds must set both toggles explicitly; debug builds fall back to
//! `Secure` + `Lax` and log a warning for each missing or invalid value.

use actix_web::cookie::SameSite;
use mockable::Env;
use tracing::warn;

const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
const SAMESITE_ENV: &str = "SESSION_SAMESITE";
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// Build mode for session configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate defaults and emit warnings for missing toggles.
    Debug,
    /// Release builds require explicit, valid session toggles.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    #[must_use]
    pub const fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    const fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Attributes applied to the `session_id` cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookieSettings {
    /// Whether the cookie is marked `Secure`.
    pub secure: bool,
    /// `SameSite` policy.
    pub same_site: SameSite,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            secure: true,
            same_site: SameSite::Lax,
        }
    }
}

/// Errors raised while validating session configuration.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// `SameSite=None` requires a secure cookie in release builds.
    #[error("SESSION_SAMESITE=None requires SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
}

/// Read cookie settings from `env`.
///
/// # Errors
///
/// Release builds fail on missing or malformed toggles and on an insecure
/// `SameSite=None`.
///
/// # Examples
///
/// ```rust
/// use actix_web::cookie::SameSite;
/// use mockable::MockEnv;
/// use pet_adoption::inbound::http::session_config::{BuildMode, cookie_settings_from_env};
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|name| match name {
///     "SESSION_COOKIE_SECURE" => Some("0".to_owned()),
///     "SESSION_SAMESITE" => Some("Strict".to_owned()),
///     _ => None,
/// });
/// let settings = cookie_settings_from_env(&env, BuildMode::Release).expect("valid settings");
/// assert!(!settings.secure);
/// assert_eq!(settings.same_site, SameSite::Strict);
/// ```
pub fn cookie_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<CookieSettings, SessionConfigError> {
    let defaults = CookieSettings::default();
    let secure = cookie_secure_from_env(env, mode, defaults.secure)?;
    let same_site = same_site_from_env(env, mode, secure, defaults.same_site)?;
    Ok(CookieSettings { secure, same_site })
}

/// Fall back with a warning in debug builds, fail in release builds.
fn fallback_or_error<T>(
    mode: BuildMode,
    fallback: T,
    error: SessionConfigError,
) -> Result<T, SessionConfigError> {
    if mode.is_debug() {
        warn!(%error, "using default session cookie setting");
        Ok(fallback)
    } else {
        Err(error)
    }
}

fn cookie_secure_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    fallback: bool,
) -> Result<bool, SessionConfigError> {
    let Some(value) = env.string(COOKIE_SECURE_ENV) else {
        return fallback_or_error(
            mode,
            fallback,
            SessionConfigError::MissingEnv {
                name: COOKIE_SECURE_ENV,
            },
        );
    };
    match parse_bool(&value) {
        Some(flag) => Ok(flag),
        None => fallback_or_error(
            mode,
            fallback,
            SessionConfigError::InvalidEnv {
                name: COOKIE_SECURE_ENV,
                value,
                expected: BOOL_EXPECTED,
            },
        ),
    }
}

fn same_site_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    secure: bool,
    fallback: SameSite,
) -> Result<SameSite, SessionConfigError> {
    let Some(value) = env.string(SAMESITE_ENV) else {
        return fallback_or_error(
            mode,
            fallback,
            SessionConfigError::MissingEnv { name: SAMESITE_ENV },
        );
    };
    match value.to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" if secure => Ok(SameSite::None),
        "none" => fallback_or_error(mode, SameSite::None, SessionConfigError::InsecureSameSiteNone),
        _ => fallback_or_error(
            mode,
            fallback,
            SessionConfigError::InvalidEnv {
                name: SAMESITE_ENV,
                value,
                expected: SAMESITE_EXPECTED,
            },
        ),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockable::MockEnv;
    use rstest::rstest;

    fn env_with(secure: Option<&'static str>, same_site: Option<&'static str>) -> MockEnv {
        let mut env = MockEnv::new();
        env.expect_string().returning(move |name| match name {
            COOKIE_SECURE_ENV => secure.map(str::to_owned),
            SAMESITE_ENV => same_site.map(str::to_owned),
            _ => None,
        });
        env
    }

    #[rstest]
    #[case(Some("yes"), Some("lax"), true, SameSite::Lax)]
    #[case(Some("0"), Some("Strict"), false, SameSite::Strict)]
    #[case(Some("true"), Some("None"), true, SameSite::None)]
    fn explicit_values_are_honoured(
        #[case] secure: Option<&'static str>,
        #[case] same_site: Option<&'static str>,
        #[case] expected_secure: bool,
        #[case] expected_same_site: SameSite,
    ) {
        let settings = cookie_settings_from_env(&env_with(secure, same_site), BuildMode::Release)
            .expect("valid settings");
        assert_eq!(settings.secure, expected_secure);
        assert_eq!(settings.same_site, expected_same_site);
    }

    #[rstest]
    fn debug_builds_fall_back_to_defaults() {
        let settings = cookie_settings_from_env(&env_with(None, Some("sideways")), BuildMode::Debug)
            .expect("debug fallback");
        assert_eq!(settings, CookieSettings::default());
    }

    #[rstest]
    #[case(None, Some("Lax"), SessionConfigError::MissingEnv { name: COOKIE_SECURE_ENV })]
    #[case(Some("1"), None, SessionConfigError::MissingEnv { name: SAMESITE_ENV })]
    #[case(Some("0"), Some("None"), SessionConfigError::InsecureSameSiteNone)]
    #[case(
        Some("maybe"),
        Some("Lax"),
        SessionConfigError::InvalidEnv {
            name: COOKIE_SECURE_ENV,
            value: "maybe".to_owned(),
            expected: BOOL_EXPECTED,
        }
    )]
    fn release_builds_reject_missing_or_unsafe_values(
        #[case] secure: Option<&'static str>,
        #[case] same_site: Option<&'static str>,
        #[case] expected: SessionConfigError,
    ) {
        let err = cookie_settings_from_env(&env_with(secure, same_site), BuildMode::Release)
            .expect_err("release rejects");
        assert_eq!(err, expected);
    }
}
