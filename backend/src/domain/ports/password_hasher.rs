//! Driven port for password hashing.

use super::define_port_error;

define_port_error! {
    /// Hashing backend failures. A wrong password is not an error.
    pub enum PasswordHashError {
        /// Hashing or verification could not run.
        Backend { message: String } => "password hashing failed: {message}",
        /// The stored hash is not a valid PHC string.
        MalformedHash { message: String } => "stored password hash is malformed: {message}",
    }
}

/// One-way password hashing with per-password salts.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Hash `password` into a self-describing string.
    fn hash(&self, password: &str) -> Result<String, PasswordHashError>;

    /// Check `password` against a hash produced by [`PasswordHasher::hash`].
    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError>;
}
