//! Session Store - process-local holder of the authenticated session.
//!
//! Components read the current session from here instead of threading it
//! through every call, and callers subscribe to hear about sign-in and
//! sign-out. Observers are invoked synchronously, in registration order,
//! with the state that was just installed.

use std::sync::{Arc, RwLock};

use crate::domain::session::Session;

/// Callback interface for session changes.
///
/// `None` means signed out. Implementations must not block: they run on
/// the caller's task, before the mutating call returns.
pub trait SessionObserver: Send + Sync {
    fn session_changed(&self, session: Option<&Session>);
}

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

#[derive(Default)]
struct Inner {
    current: Option<Session>,
    observers: Vec<(SubscriberId, Arc<dyn SessionObserver>)>,
    next_id: u64,
}

/// Holds the current session and notifies observers of changes.
#[derive(Default)]
pub struct SessionStore {
    inner: RwLock<Inner>,
}

impl SessionStore {
    /// Creates an empty store with no session and no observers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the current session, if signed in.
    pub fn current(&self) -> Option<Session> {
        self.inner
            .read()
            .expect("SessionStore: lock poisoned")
            .current
            .clone()
    }

    /// Returns true when a session is present.
    pub fn is_authenticated(&self) -> bool {
        self.inner
            .read()
            .expect("SessionStore: lock poisoned")
            .current
            .is_some()
    }

    /// Installs a session and notifies observers.
    pub fn set(&self, session: Session) {
        let observers = {
            let mut inner = self.inner.write().expect("SessionStore: lock poisoned");
            inner.current = Some(session.clone());
            inner.observers.clone()
        };

        // Lock is released; observers may re-enter the store.
        for (_, observer) in &observers {
            observer.session_changed(Some(&session));
        }
    }

    /// Removes the session, returning what was there, and notifies observers.
    ///
    /// Clearing an empty store still notifies, so observers converge on the
    /// signed-out state regardless of what they saw before.
    pub fn clear(&self) -> Option<Session> {
        let (previous, observers) = {
            let mut inner = self.inner.write().expect("SessionStore: lock poisoned");
            (inner.current.take(), inner.observers.clone())
        };

        for (_, observer) in &observers {
            observer.session_changed(None);
        }
        previous
    }

    /// Registers an observer; it is NOT called with the current state.
    pub fn subscribe(&self, observer: Arc<dyn SessionObserver>) -> SubscriberId {
        let mut inner = self.inner.write().expect("SessionStore: lock poisoned");
        let id = SubscriberId(inner.next_id);
        inner.next_id += 1;
        inner.observers.push((id, observer));
        id
    }

    /// Removes an observer. Returns false if the id was already gone.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut inner = self.inner.write().expect("SessionStore: lock poisoned");
        let before = inner.observers.len();
        inner.observers.retain(|(observer_id, _)| *observer_id != id);
        inner.observers.len() < before
    }

    /// Returns the number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.inner
            .read()
            .expect("SessionStore: lock poisoned")
            .observers
            .len()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read().expect("SessionStore: lock poisoned");
        f.debug_struct("SessionStore")
            .field("authenticated", &inner.current.is_some())
            .field("observers", &inner.observers.len())
            .finish()
    }
}
