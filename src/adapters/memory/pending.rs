//! In-Memory Pending-Signup Store
//!
//! Holds the single signup awaiting email verification. The slot survives
//! only for the process lifetime, which matches how long the confirmation
//! step is expected to take on one device.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::ports::{PendingSignup, PendingSignupError, PendingSignupStore};

/// Process-local pending-signup slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryPendingSignups {
    slot: Arc<RwLock<Option<PendingSignup>>>,
}

impl MemoryPendingSignups {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when no signup is awaiting confirmation.
    pub async fn is_empty(&self) -> bool {
        self.slot.read().await.is_none()
    }
}

#[async_trait]
impl PendingSignupStore for MemoryPendingSignups {
    async fn stash(&self, signup: PendingSignup) -> Result<(), PendingSignupError> {
        *self.slot.write().await = Some(signup);
        Ok(())
    }

    async fn current(&self) -> Result<Option<PendingSignup>, PendingSignupError> {
        Ok(self.slot.read().await.clone())
    }

    async fn clear(&self) -> Result<(), PendingSignupError> {
        *self.slot.write().await = None;
        Ok(())
    }
}
