//! Authentication primitives: credentials, registrations, and stored digests.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.
//! Passwords are never persisted in clear text; they are digested with a
//! per-credential random salt at registration and compared by digest.

use std::fmt;

use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::user::{Email, UserValidationError, Username};

/// Domain error returned when authentication payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthValidationError {
    /// Username was missing or blank once trimmed, or too long.
    InvalidUsername(UserValidationError),
    /// Password was blank.
    EmptyPassword,
    /// Email was present but implausible.
    InvalidEmail(UserValidationError),
}

impl fmt::Display for AuthValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUsername(err) | Self::InvalidEmail(err) => err.fmt(f),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for AuthValidationError {}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `username` is trimmed and must not be empty after trimming.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace to avoid surprising credential comparisons.
///
/// # Examples
/// ```
/// use backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("edith", "hunter2").unwrap();
/// assert_eq!(creds.username(), "edith");
/// assert_eq!(creds.password(), "hunter2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, AuthValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(AuthValidationError::InvalidUsername(
                UserValidationError::EmptyUsername,
            ));
        }

        if password.is_empty() {
            return Err(AuthValidationError::EmptyPassword);
        }

        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username string suitable for user lookups.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated registration payload.
#[derive(Debug, Clone)]
pub struct Registration {
    username: Username,
    password: Zeroizing<String>,
    email: Option<Email>,
}

impl Registration {
    /// Construct a registration from raw form inputs.
    pub fn try_from_parts(
        username: &str,
        password: &str,
        email: Option<&str>,
    ) -> Result<Self, AuthValidationError> {
        let username = Username::new(username).map_err(AuthValidationError::InvalidUsername)?;
        if password.is_empty() {
            return Err(AuthValidationError::EmptyPassword);
        }
        let email = email
            .filter(|raw| !raw.trim().is_empty())
            .map(Email::new)
            .transpose()
            .map_err(AuthValidationError::InvalidEmail)?;

        Ok(Self {
            username,
            password: Zeroizing::new(password.to_owned()),
            email,
        })
    }

    /// Requested login name.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Raw password awaiting digestion.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Optional contact email.
    pub fn email(&self) -> Option<&Email> {
        self.email.as_ref()
    }
}

/// Salted credential digest stored instead of the password itself.
///
/// The encoded form is `hex(salt)$hex(sha256(salt || password))`. Verification
/// re-digests the candidate with the stored salt and compares the result.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    const SALT_LEN: usize = 16;

    /// Digest a password with the supplied salt bytes.
    pub fn digest_with_salt(password: &str, salt: [u8; Self::SALT_LEN]) -> Self {
        Self(format!(
            "{}${}",
            hex::encode(salt),
            hex::encode(Self::digest_bytes(&salt, password))
        ))
    }

    /// Digest a password with a fresh random salt.
    pub fn digest(password: &str) -> Self {
        Self::digest_with_salt(password, rand::random())
    }

    /// Whether `candidate` digests to this hash under the stored salt.
    pub fn verify(&self, candidate: &str) -> bool {
        let Some((salt_hex, digest_hex)) = self.0.split_once('$') else {
            return false;
        };
        let Ok(salt) = hex::decode(salt_hex) else {
            return false;
        };
        hex::encode(Self::digest_bytes(&salt, candidate)) == digest_hex
    }

    /// Re-wrap an encoded digest loaded from storage.
    pub fn from_encoded(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// The `salt$digest` encoded form for persistence.
    pub fn as_encoded(&self) -> &str {
        self.0.as_str()
    }

    fn digest_bytes(salt: &[u8], password: &str) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(salt);
        hasher.update(password.as_bytes());
        hasher.finalize().into()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Digests stay out of logs.
        f.write_str("PasswordHash(..)")
    }
}
