//! Auth Gateway - account lifecycle against the identity provider.
//!
//! Owns sign-up, email verification, login, and logout. Sessions produced
//! here are published through the `SessionStore`; profile documents are
//! written alongside the provider credential so the rest of the app can
//! join questions to their authors.

use std::sync::Arc;

use serde_json::Value;

use crate::domain::activity::ActivityKind;
use crate::domain::foundation::{EmailAddress, Timestamp};
use crate::domain::session::{AuthError, Session};
use crate::domain::user::UserProfile;
use crate::ports::{
    DocumentStore, FieldUpdate, IdentityProvider, Password, PendingSignup, PendingSignupStore,
    ProviderSession, StoreError,
};

use super::{ActivityRecorder, CampusPolicy, SessionStore, USERS_COLLECTION};

/// Input for `sign_up`.
#[derive(Debug, Clone)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Account lifecycle operations.
pub struct AuthGateway {
    identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn DocumentStore>,
    pending: Arc<dyn PendingSignupStore>,
    sessions: Arc<SessionStore>,
    recorder: Arc<ActivityRecorder>,
    policy: CampusPolicy,
}

impl AuthGateway {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn DocumentStore>,
        pending: Arc<dyn PendingSignupStore>,
        sessions: Arc<SessionStore>,
        recorder: Arc<ActivityRecorder>,
        policy: CampusPolicy,
    ) -> Self {
        Self {
            identity,
            store,
            pending,
            sessions,
            recorder,
            policy,
        }
    }

    /// Registers a new account.
    ///
    /// On success a verification email is on its way and the signup waits
    /// in the pending store; no session is published until the user
    /// verifies and logs in.
    ///
    /// # Errors
    ///
    /// - `Validation` for a malformed email or short password
    /// - `EmailDomainNotAllowed` for addresses outside the campus domain
    /// - `AlreadyRegistered` if a credential exists for the email
    pub async fn sign_up(&self, request: SignUpRequest) -> Result<(), AuthError> {
        // 1. Validate the address and enforce the campus domain
        let email = EmailAddress::new(&request.email)?;
        if !self.policy.allows(&email) {
            return Err(AuthError::EmailDomainNotAllowed {
                domain: email.domain().to_string(),
            });
        }

        // 2. Validate the password before any provider call
        let password = Password::new(&request.password)?;

        // 3. Create the credential
        let provider_session = self.identity.sign_up(&email, &password).await?;
        let user_id = provider_session.user_id.clone();

        tracing::info!("Created account for {}", email);

        // 4. Write the initial profile document
        let profile = UserProfile::new(
            user_id.clone(),
            &request.first_name,
            &request.last_name,
            email.clone(),
            self.policy.college(),
        )?;
        let document = encode(&profile)?;
        self.store
            .put(USERS_COLLECTION, user_id.as_str(), document)
            .await
            .map_err(backend_error)?;

        // 5. Send the verification email and stash the signup for the
        //    confirmation step
        self.identity
            .send_verification_email(&provider_session.token)
            .await?;
        self.pending
            .stash(PendingSignup::new(user_id, email))
            .await
            .map_err(|e| AuthError::service_unavailable(e.to_string()))?;

        // 6. Drop the provider session; the user logs in after verifying
        if let Err(e) = self.identity.sign_out(&provider_session.token).await {
            tracing::warn!("Could not revoke post-signup session: {}", e);
        }

        Ok(())
    }

    /// Marks the pending signup's profile as verified.
    ///
    /// Called once the user reports having followed the emailed link.
    ///
    /// # Errors
    ///
    /// - `NoPendingSignup` when nothing is awaiting confirmation
    /// - `ProfileMissing` when the profile document is gone
    pub async fn confirm_verification(&self) -> Result<(), AuthError> {
        // 1. There must be a signup waiting
        let pending = self
            .pending
            .current()
            .await
            .map_err(|e| AuthError::service_unavailable(e.to_string()))?
            .ok_or(AuthError::NoPendingSignup)?;

        // 2. Mark the profile verified
        let updates = vec![FieldUpdate::set("verified", Value::Bool(true))];
        match self
            .store
            .patch(USERS_COLLECTION, pending.user_id.as_str(), updates)
            .await
        {
            Ok(()) => {}
            Err(StoreError::NotFound { .. }) => return Err(AuthError::ProfileMissing),
            Err(e) => return Err(backend_error(e)),
        }

        // 3. Done waiting
        self.pending
            .clear()
            .await
            .map_err(|e| AuthError::service_unavailable(e.to_string()))?;

        tracing::info!("Verified signup for {}", pending.email);
        Ok(())
    }

    /// Authenticates and publishes a session.
    ///
    /// # Errors
    ///
    /// - `InvalidCredentials` for a wrong password or unknown email
    /// - `ProfileMissing` when the credential has no usable profile; the
    ///   provider session is revoked before this returns
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        // 1. Validate the address. A short password can never match, so it
        //    reports as bad credentials rather than a validation error.
        let email = EmailAddress::new(email)?;
        let password = Password::new(password).map_err(|_| AuthError::InvalidCredentials)?;

        // 2. Authenticate against the provider
        let provider_session = self.identity.sign_in(&email, &password).await?;
        let user_id = provider_session.user_id.clone();

        // 3. Load the profile; a credential without one is unusable
        let document = match self.store.get(USERS_COLLECTION, user_id.as_str()).await {
            Ok(Some(document)) => document,
            Ok(None) => return Err(self.abandon_login(provider_session).await),
            Err(e) => return Err(backend_error(e)),
        };
        let profile: UserProfile = match serde_json::from_value(document) {
            Ok(profile) => profile,
            Err(e) => {
                tracing::error!("Stored profile for {} does not decode: {}", user_id, e);
                return Err(self.abandon_login(provider_session).await);
            }
        };

        // 4. Stamp the login and re-mark the address verified: a completed
        //    sign-in means the verification link was honored
        let stamp = encode(&Timestamp::now())?;
        let updates = vec![
            FieldUpdate::set("verified", Value::Bool(true)),
            FieldUpdate::set("lastLogin", stamp),
        ];
        match self
            .store
            .patch(USERS_COLLECTION, user_id.as_str(), updates)
            .await
        {
            Ok(()) => {}
            Err(StoreError::NotFound { .. }) => {
                return Err(self.abandon_login(provider_session).await)
            }
            Err(e) => return Err(backend_error(e)),
        }

        // 5. Publish the session
        let session = Session::new(
            user_id.clone(),
            email,
            profile.display_name(),
            true,
            provider_session.token,
        );
        self.sessions.set(session.clone());

        tracing::info!("Signed in {}", session.email);

        // 6. Log the login off the critical path
        let _ = self.recorder.record(&user_id, ActivityKind::Login, None);

        Ok(session)
    }

    /// Signs out.
    ///
    /// Local state always clears, and observers always hear about it;
    /// remote token revocation is best-effort.
    pub async fn logout(&self) {
        // 1. Clear the published session first so the app reads as signed
        //    out even when the provider is unreachable
        let previous = self.sessions.clear();

        // 2. Revoke the provider token
        if let Some(session) = previous {
            if let Err(e) = self.identity.sign_out(&session.token).await {
                tracing::warn!("Remote sign-out failed: {}", e);
            }
            tracing::info!("Signed out {}", session.email);
        }
    }

    /// Tears down a sign-in whose profile is missing or unreadable:
    /// revokes the token and clears any published session.
    async fn abandon_login(&self, provider_session: ProviderSession) -> AuthError {
        if let Err(e) = self.identity.sign_out(&provider_session.token).await {
            tracing::warn!("Could not revoke session for profile-less login: {}", e);
        }
        self.sessions.clear();
        AuthError::ProfileMissing
    }
}

impl std::fmt::Debug for AuthGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGateway")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

fn backend_error(error: StoreError) -> AuthError {
    AuthError::service_unavailable(error.to_string())
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Value, AuthError> {
    serde_json::to_value(value)
        .map_err(|e| AuthError::service_unavailable(format!("could not encode document: {}", e)))
}
