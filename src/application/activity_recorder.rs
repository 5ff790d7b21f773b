//! Activity Recorder - best-effort usage logging.
//!
//! Appends entries to the activity log and refreshes the acting user's
//! last-active stamp. Both writes run off the caller's path: a failed
//! write is logged and never fails the operation that triggered it.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::domain::activity::{ActivityEntry, ActivityKind};
use crate::domain::foundation::{Timestamp, UserId};
use crate::ports::{DocumentStore, FieldUpdate};

use super::{ACTIVITY_COLLECTION, USERS_COLLECTION};

/// Records user activity without blocking or failing the caller.
pub struct ActivityRecorder {
    store: Arc<dyn DocumentStore>,
}

impl ActivityRecorder {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Appends an activity entry and stamps the user's `lastActive` field.
    ///
    /// Returns immediately; the writes happen on a spawned task. The
    /// returned handle exists so tests can wait for them to land, callers
    /// are expected to drop it.
    pub fn record(
        &self,
        user_id: &UserId,
        action: ActivityKind,
        detail: Option<String>,
    ) -> JoinHandle<()> {
        let entry = ActivityEntry::new(user_id.clone(), action, detail);
        let store = Arc::clone(&self.store);

        tokio::spawn(async move {
            Self::write_entry(store, entry).await;
        })
    }

    async fn write_entry(store: Arc<dyn DocumentStore>, entry: ActivityEntry) {
        let user_id = entry.user_id().clone();
        let action = entry.action();

        match serde_json::to_value(&entry) {
            Ok(document) => {
                if let Err(e) = store.create(ACTIVITY_COLLECTION, document).await {
                    tracing::warn!("Failed to record {} activity: {}", action, e);
                }
            }
            Err(e) => {
                tracing::warn!("Failed to encode {} activity entry: {}", action, e);
            }
        }

        match serde_json::to_value(Timestamp::now()) {
            Ok(stamp) => {
                let update = vec![FieldUpdate::set("lastActive", stamp)];
                if let Err(e) = store.patch(USERS_COLLECTION, user_id.as_str(), update).await {
                    tracing::warn!("Failed to stamp last-active for {}: {}", user_id, e);
                }
            }
            Err(e) => {
                tracing::warn!("Failed to encode last-active stamp: {}", e);
            }
        }
    }
}

impl std::fmt::Debug for ActivityRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityRecorder").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryBackend;
    use serde_json::json;

    fn user_id() -> UserId {
        UserId::new("uid-1").unwrap()
    }

    async fn backend_with_profile() -> MemoryBackend {
        let backend = MemoryBackend::new();
        backend
            .put(USERS_COLLECTION, "uid-1", json!({ "email": "alice@college.edu" }))
            .await
            .unwrap();
        backend
    }

    #[tokio::test]
    async fn record_appends_entry_and_stamps_last_active() {
        let backend = backend_with_profile().await;
        let recorder = ActivityRecorder::new(Arc::new(backend.clone()));

        recorder
            .record(&user_id(), ActivityKind::Login, None)
            .await
            .unwrap();

        assert_eq!(backend.collection_size(ACTIVITY_COLLECTION).await, 1);
        let profile = backend.document(USERS_COLLECTION, "uid-1").await.unwrap();
        assert!(profile["lastActive"].is_string());
    }

    #[tokio::test]
    async fn record_captures_action_and_detail() {
        let backend = backend_with_profile().await;
        let recorder = ActivityRecorder::new(Arc::new(backend.clone()));

        recorder
            .record(
                &user_id(),
                ActivityKind::QuestionAsked,
                Some("Why does TCP retransmit?".to_string()),
            )
            .await
            .unwrap();

        let results = backend
            .query(crate::ports::Query::collection(ACTIVITY_COLLECTION))
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].1["action"], "question_asked");
        assert_eq!(results[0].1["detail"], "Why does TCP retransmit?");
        assert_eq!(results[0].1["userId"], "uid-1");
    }

    #[tokio::test]
    async fn failed_log_write_still_stamps_last_active() {
        let backend = backend_with_profile().await;
        backend.fail_writes_to(ACTIVITY_COLLECTION).await;
        let recorder = ActivityRecorder::new(Arc::new(backend.clone()));

        recorder
            .record(&user_id(), ActivityKind::Login, None)
            .await
            .unwrap();

        assert_eq!(backend.collection_size(ACTIVITY_COLLECTION).await, 0);
        let profile = backend.document(USERS_COLLECTION, "uid-1").await.unwrap();
        assert!(profile["lastActive"].is_string());
    }

    #[tokio::test]
    async fn missing_profile_does_not_block_the_log_entry() {
        let backend = MemoryBackend::new();
        let recorder = ActivityRecorder::new(Arc::new(backend.clone()));

        recorder
            .record(&user_id(), ActivityKind::AnswerGiven, None)
            .await
            .unwrap();

        assert_eq!(backend.collection_size(ACTIVITY_COLLECTION).await, 1);
    }
}
