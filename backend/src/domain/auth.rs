//! Authentication inputs: login credentials and signup details.
//!
//! Handlers build these from raw payload strings before calling a port, so
//! services only ever see trimmed, validated values. Passwords are held in
//! [`Zeroizing`] buffers and wiped on drop.

use std::fmt;

use zeroize::Zeroizing;

use super::{EmailAddress, UserValidationError};

/// Login payload values were missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email was blank once trimmed.
    EmptyEmail,
    /// Password was empty.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Credentials presented at login.
///
/// ## Invariants
/// - `email` is trimmed and lowercased but not otherwise validated: a
///   malformed address simply fails to match any account.
/// - `password` is non-empty and keeps caller whitespace.
///
/// # Examples
/// ```
/// use pet_adoption::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" Ada@Example.com ", "s3cret").unwrap();
/// assert_eq!(creds.email(), "ada@example.com");
/// assert_eq!(creds.password(), "s3cret");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Build credentials from raw inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email used for the account lookup.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password exactly as supplied.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Signup payload failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignupValidationError {
    /// One or more of name, email, password, phone was blank.
    MissingFields,
    /// The email did not parse.
    InvalidEmail(UserValidationError),
}

impl fmt::Display for SignupValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFields => write!(f, "All fields are required"),
            Self::InvalidEmail(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for SignupValidationError {}

/// Validated signup request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupDetails {
    name: String,
    email: EmailAddress,
    password: Zeroizing<String>,
    phone: String,
}

impl SignupDetails {
    /// Trim and validate raw signup fields; every field is required.
    pub fn try_from_parts(
        name: &str,
        email: &str,
        password: &str,
        phone: &str,
    ) -> Result<Self, SignupValidationError> {
        let name = name.trim();
        let phone = phone.trim();
        if name.is_empty() || email.trim().is_empty() || password.is_empty() || phone.is_empty()
        {
            return Err(SignupValidationError::MissingFields);
        }
        let email = EmailAddress::parse(email).map_err(SignupValidationError::InvalidEmail)?;
        Ok(Self {
            name: name.to_owned(),
            email,
            password: Zeroizing::new(password.to_owned()),
            phone: phone.to_owned(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", LoginValidationError::EmptyEmail)]
    #[case("   ", "pw", LoginValidationError::EmptyEmail)]
    #[case("ada@example.com", "", LoginValidationError::EmptyPassword)]
    fn invalid_login_inputs(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(email, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn login_password_keeps_whitespace() {
        let creds = LoginCredentials::try_from_parts("ada@example.com", "  pw  ")
            .expect("valid credentials");
        assert_eq!(creds.password(), "  pw  ");
    }

    #[rstest]
    #[case("", "ada@example.com", "pw", "555")]
    #[case("Ada", "", "pw", "555")]
    #[case("Ada", "ada@example.com", "", "555")]
    #[case("Ada", "ada@example.com", "pw", "  ")]
    fn signup_requires_every_field(
        #[case] name: &str,
        #[case] email: &str,
        #[case] password: &str,
        #[case] phone: &str,
    ) {
        let err = SignupDetails::try_from_parts(name, email, password, phone)
            .expect_err("missing field must fail");
        assert_eq!(err, SignupValidationError::MissingFields);
        assert_eq!(err.to_string(), "All fields are required");
    }

    #[rstest]
    fn signup_rejects_malformed_email() {
        let err = SignupDetails::try_from_parts("Ada", "ada.example.com", "pw", "555")
            .expect_err("malformed email must fail");
        assert_eq!(
            err,
            SignupValidationError::InvalidEmail(UserValidationError::MalformedEmail)
        );
    }

    #[rstest]
    fn signup_trims_and_normalises() {
        let details = SignupDetails::try_from_parts(" Ada ", " ADA@example.com", "pw", " 555 ")
            .expect("valid signup");
        assert_eq!(details.name(), "Ada");
        assert_eq!(details.email().as_ref(), "ada@example.com");
        assert_eq!(details.phone(), "555");
    }
}
