//! Pending-signup storage port.
//!
//! Holds the single record linking a just-created credential to its profile
//! until the user confirms the verification email. Ephemeral by design:
//! losing it only means the signup must be confirmed through a fresh login.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::{EmailAddress, Timestamp, UserId};

/// The record stashed between `sign_up` and `confirm_verification`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSignup {
    /// Account awaiting verification.
    pub user_id: UserId,

    /// Email the verification link was sent to.
    pub email: EmailAddress,

    /// When the signup happened.
    pub stashed_at: Timestamp,
}

impl PendingSignup {
    /// Creates a record stamped with the current time.
    pub fn new(user_id: UserId, email: EmailAddress) -> Self {
        Self {
            user_id,
            email,
            stashed_at: Timestamp::now(),
        }
    }
}

/// Errors surfaced by pending-signup storage.
#[derive(Debug, Clone, Error)]
pub enum PendingSignupError {
    /// The storage backing the slot failed.
    #[error("Pending-signup storage failed: {0}")]
    Storage(String),
}

/// Single-slot ephemeral storage for the pending-signup record.
///
/// # Contract
///
/// Implementations must:
/// - Hold at most one record; `stash` replaces any previous one
/// - Return `Ok(None)` from `current` when nothing is stashed
/// - Treat `clear` of an empty slot as success
#[async_trait]
pub trait PendingSignupStore: Send + Sync {
    /// Stores the record, replacing any previous one.
    async fn stash(&self, record: PendingSignup) -> Result<(), PendingSignupError>;

    /// Returns the stashed record, if any.
    async fn current(&self) -> Result<Option<PendingSignup>, PendingSignupError>;

    /// Empties the slot.
    async fn clear(&self) -> Result<(), PendingSignupError>;
}
