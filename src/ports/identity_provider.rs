//! Identity provider port for credential management.
//!
//! The hosted service owns accounts, passwords, and tokens; this crate only
//! calls it. Tokens that come back are opaque handles; nothing here parses
//! or validates them.
//!
//! # When to Use
//!
//! The auth gateway is the only production caller. Everything content-side
//! works with an already-established [`Session`](crate::domain::session::Session)
//! and never touches this port.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use thiserror::Error;

use crate::domain::foundation::{EmailAddress, UserId, ValidationError};
use crate::domain::session::{AuthError, SessionToken};

/// Minimum password length accepted before any provider call.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Validated password, held as a secret.
#[derive(Clone)]
pub struct Password(SecretString);

impl Password {
    /// Creates a password, enforcing the minimum length.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if blank
    /// - `TooShort` if under [`MIN_PASSWORD_LENGTH`]
    pub fn new(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(ValidationError::empty_field("password"));
        }
        if raw.len() < MIN_PASSWORD_LENGTH {
            return Err(ValidationError::too_short(
                "password",
                MIN_PASSWORD_LENGTH,
                raw.len(),
            ));
        }
        Ok(Self(SecretString::new(raw)))
    }

    /// Exposes the raw password for the outbound provider call.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Password").field(&"REDACTED").finish()
    }
}

/// What the provider hands back after a successful sign-up or sign-in.
#[derive(Debug, Clone)]
pub struct ProviderSession {
    /// Provider-issued account id.
    pub user_id: UserId,

    /// Opaque session token for subsequent provider calls.
    pub token: SessionToken,

    /// Whether the provider already considers the email verified.
    pub email_verified: bool,
}

/// Errors reported by the identity provider.
///
/// Provider wire codes are mapped into these by the adapter; the application
/// layer never sees raw codes.
#[derive(Debug, Clone, Error)]
pub enum IdentityError {
    /// A credential already exists for this email.
    #[error("Email is already in use")]
    EmailInUse,

    /// Wrong password or unknown account.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The provider is rate limiting attempts for this account.
    #[error("Too many attempts")]
    TooManyAttempts,

    /// The account has been administratively disabled.
    #[error("Account disabled")]
    AccountDisabled,

    /// The provider rejected the supplied session token.
    #[error("Session token rejected")]
    TokenRejected,

    /// The provider is unreachable or failing.
    #[error("Identity provider unavailable: {0}")]
    Unavailable(String),
}

impl IdentityError {
    /// Creates an unavailable error with a message.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Returns true if this is a transient error that may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, IdentityError::Unavailable(_))
    }
}

impl From<IdentityError> for AuthError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::EmailInUse => AuthError::AlreadyRegistered,
            IdentityError::InvalidCredentials => AuthError::InvalidCredentials,
            IdentityError::TooManyAttempts => AuthError::TooManyAttempts,
            IdentityError::AccountDisabled => AuthError::AccountDisabled,
            IdentityError::TokenRejected => AuthError::NotAuthenticated,
            IdentityError::Unavailable(msg) => AuthError::ServiceUnavailable(msg),
        }
    }
}

/// Credential operations against the hosted identity service.
///
/// # Contract
///
/// Implementations must:
/// - Return `IdentityError::EmailInUse` from `sign_up` when a credential
///   already exists for the email
/// - Return `IdentityError::InvalidCredentials` from `sign_in` for both a
///   wrong password and an unknown account (no account enumeration)
/// - Return `IdentityError::Unavailable` for transient failures
/// - Treat `sign_out` of an already-revoked token as success
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Creates a credential and returns the initial session.
    async fn sign_up(
        &self,
        email: &EmailAddress,
        password: &Password,
    ) -> Result<ProviderSession, IdentityError>;

    /// Authenticates an existing credential.
    async fn sign_in(
        &self,
        email: &EmailAddress,
        password: &Password,
    ) -> Result<ProviderSession, IdentityError>;

    /// Revokes a session token.
    async fn sign_out(&self, token: &SessionToken) -> Result<(), IdentityError>;

    /// Asks the provider to email a verification link to the token's account.
    async fn send_verification_email(&self, token: &SessionToken) -> Result<(), IdentityError>;
}
