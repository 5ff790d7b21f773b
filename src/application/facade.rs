//! The app-facing entry point.
//!
//! Wires the auth gateway, content repository, session store, and activity
//! recorder over one identity provider and one document store. UI layers
//! hold a single `DoubtSolver` and reach everything through it.

use std::sync::Arc;

use crate::domain::session::Session;
use crate::ports::{DocumentStore, IdentityProvider, PendingSignupStore};

use super::{
    ActivityRecorder, AuthGateway, CampusPolicy, ContentRepository, SessionObserver, SessionStore,
    SubscriberId,
};

/// Campus Q&A service facade.
pub struct DoubtSolver {
    sessions: Arc<SessionStore>,
    auth: AuthGateway,
    content: ContentRepository,
}

impl DoubtSolver {
    /// Assembles the service over the given backends.
    ///
    /// The session store and activity recorder are created here and shared
    /// by both components, so a login makes content operations available
    /// immediately and all activity lands in one log.
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn DocumentStore>,
        pending: Arc<dyn PendingSignupStore>,
        policy: CampusPolicy,
    ) -> Self {
        let sessions = Arc::new(SessionStore::new());
        let recorder = Arc::new(ActivityRecorder::new(store.clone()));

        let auth = AuthGateway::new(
            identity,
            store.clone(),
            pending,
            sessions.clone(),
            recorder.clone(),
            policy.clone(),
        );
        let content = ContentRepository::new(store, sessions.clone(), recorder, policy);

        Self {
            sessions,
            auth,
            content,
        }
    }

    /// Account lifecycle operations.
    pub fn auth(&self) -> &AuthGateway {
        &self.auth
    }

    /// Question, answer, and category operations.
    pub fn content(&self) -> &ContentRepository {
        &self.content
    }

    /// The shared session store.
    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Returns the current session, if signed in.
    pub fn current_session(&self) -> Option<Session> {
        self.sessions.current()
    }

    /// Registers an observer for session changes.
    pub fn subscribe(&self, observer: Arc<dyn SessionObserver>) -> SubscriberId {
        self.sessions.subscribe(observer)
    }

    /// Removes a previously registered observer.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.sessions.unsubscribe(id)
    }
}

impl std::fmt::Debug for DoubtSolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DoubtSolver")
            .field("signed_in", &self.sessions.is_authenticated())
            .finish_non_exhaustive()
    }
}
