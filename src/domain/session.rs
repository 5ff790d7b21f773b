//! Session types for the authenticated identity.
//!
//! A [`Session`] is an explicit value handed to data-access calls rather than
//! ambient global state, so tests can supply one without process-wide setup.
//! The token inside is an opaque handle issued by the hosted identity
//! provider; this crate never inspects or validates it locally.

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

use super::foundation::{EmailAddress, Timestamp, UserId, ValidationError};
use thiserror::Error;

/// Opaque session token issued by the identity provider.
///
/// Wrapped in a secret so the raw value never lands in logs or debug output.
#[derive(Clone)]
pub struct SessionToken(SecretString);

impl SessionToken {
    /// Creates a token from the provider's raw string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(SecretString::new(raw.into()))
    }

    /// Exposes the raw token for outbound provider calls.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionToken").field(&"REDACTED").finish()
    }
}

/// The current authenticated identity.
#[derive(Debug, Clone)]
pub struct Session {
    /// Provider-issued user identifier.
    pub user_id: UserId,

    /// Email the user signed in with.
    pub email: EmailAddress,

    /// Display name composed from the profile, if one was loaded.
    pub display_name: Option<String>,

    /// Whether the account's email has been verified.
    pub verified: bool,

    /// When this session was issued locally.
    pub issued_at: Timestamp,

    /// Opaque provider token backing this session.
    pub token: SessionToken,
}

impl Session {
    /// Creates a new session.
    pub fn new(
        user_id: UserId,
        email: EmailAddress,
        display_name: Option<String>,
        verified: bool,
        token: SessionToken,
    ) -> Self {
        Self {
            user_id,
            email,
            display_name,
            verified,
            issued_at: Timestamp::now(),
            token,
        }
    }

    /// Returns the display name, or the email address as fallback.
    pub fn display_name_or_email(&self) -> &str {
        self.display_name.as_deref().unwrap_or(self.email.as_str())
    }
}

/// Authentication errors surfaced by the gateway.
///
/// Domain-centric: these describe what went wrong from the application's
/// perspective, not the provider's wire codes.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// The email's domain is outside the configured institution.
    #[error("Email domain '{domain}' is not allowed; use your college address")]
    EmailDomainNotAllowed { domain: String },

    /// A credential already exists for this email.
    #[error("An account is already registered for this email")]
    AlreadyRegistered,

    /// Wrong password or unknown account.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The provider is rate limiting sign-in attempts.
    #[error("Too many attempts; try again later")]
    TooManyAttempts,

    /// The account has been administratively disabled.
    #[error("This account has been disabled")]
    AccountDisabled,

    /// `confirm_verification` was called with nothing awaiting confirmation.
    #[error("No signup is awaiting verification")]
    NoPendingSignup,

    /// The credential exists but no profile document does.
    #[error("No profile exists for this account")]
    ProfileMissing,

    /// The operation requires a session and none is present.
    #[error("Not signed in")]
    NotAuthenticated,

    /// Input failed validation before any provider call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The identity service is unreachable or failing.
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    /// Creates a service unavailable error with a message.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Returns the stable error code for this error.
    pub fn code(&self) -> crate::domain::foundation::ErrorCode {
        use crate::domain::foundation::ErrorCode;
        match self {
            AuthError::EmailDomainNotAllowed { .. } => ErrorCode::EmailDomainNotAllowed,
            AuthError::AlreadyRegistered => ErrorCode::AlreadyRegistered,
            AuthError::InvalidCredentials => ErrorCode::InvalidCredentials,
            AuthError::TooManyAttempts => ErrorCode::TooManyAttempts,
            AuthError::AccountDisabled => ErrorCode::AccountDisabled,
            AuthError::NoPendingSignup => ErrorCode::NoPendingSignup,
            AuthError::ProfileMissing => ErrorCode::ProfileMissing,
            AuthError::NotAuthenticated => ErrorCode::NotAuthenticated,
            AuthError::Validation(_) => ErrorCode::ValidationFailed,
            AuthError::ServiceUnavailable(_) => ErrorCode::BackendUnavailable,
        }
    }

    /// Returns true if the input, not the account state, was at fault.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AuthError::Validation(_) | AuthError::EmailDomainNotAllowed { .. }
        )
    }

    /// Returns true if this is a transient error that may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::ServiceUnavailable(_))
    }
}
