//! Content Repository - questions, answers, and categories.
//!
//! Every operation runs under the current session from the `SessionStore`.
//! Documents live in the hosted backend; this component owns the mapping
//! between domain aggregates and stored JSON, the author-name join on the
//! read path, and the counter updates on owner profiles.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::domain::activity::ActivityKind;
use crate::domain::category::CategoryRegistry;
use crate::domain::foundation::{AnswerId, DomainError, ErrorCode, QuestionId, ValidationError};
use crate::domain::question::{Answer, Question};
use crate::domain::session::Session;
use crate::domain::user::UserProfile;
use crate::ports::{DocumentStore, FieldUpdate, Query, StoreError};

use super::{
    ActivityRecorder, CampusPolicy, SessionStore, CATEGORIES_DOCUMENT, META_COLLECTION,
    QUESTIONS_COLLECTION, USERS_COLLECTION,
};

/// Errors surfaced by content operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ContentError {
    /// The operation requires a session and none is present.
    #[error("Not signed in")]
    NotAuthenticated,

    /// No document exists for this question id.
    #[error("Question {0} not found")]
    QuestionNotFound(QuestionId),

    /// The question has no answer with this id.
    #[error("Answer {0} not found")]
    AnswerNotFound(AnswerId),

    /// The caller already upvoted this question.
    #[error("This question was already upvoted")]
    AlreadyUpvoted,

    /// The caller does not own the record being changed.
    #[error("{0}")]
    Forbidden(String),

    /// Input failed validation before any write.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A domain rule rejected the input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A stored document does not decode.
    #[error("Stored document is malformed: {0}")]
    Malformed(String),

    /// The document service is unreachable or failing.
    #[error("Backend unavailable: {0}")]
    Backend(String),
}

impl ContentError {
    /// Returns the stable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            ContentError::NotAuthenticated => ErrorCode::NotAuthenticated,
            ContentError::QuestionNotFound(_) => ErrorCode::QuestionNotFound,
            ContentError::AnswerNotFound(_) => ErrorCode::AnswerNotFound,
            ContentError::AlreadyUpvoted => ErrorCode::AlreadyUpvoted,
            ContentError::Forbidden(_) => ErrorCode::Forbidden,
            ContentError::Validation(_) | ContentError::InvalidInput(_) => {
                ErrorCode::ValidationFailed
            }
            ContentError::Malformed(_) => ErrorCode::MalformedDocument,
            ContentError::Backend(_) => ErrorCode::BackendUnavailable,
        }
    }

    /// True when the caller's input was rejected before any write.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ContentError::Validation(_) | ContentError::InvalidInput(_)
        )
    }
}

impl From<StoreError> for ContentError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Serialization(message) => ContentError::Malformed(message),
            other => ContentError::Backend(other.to_string()),
        }
    }
}

impl From<DomainError> for ContentError {
    fn from(error: DomainError) -> Self {
        match error.code {
            ErrorCode::Forbidden => ContentError::Forbidden(error.message),
            _ => ContentError::InvalidInput(error.message),
        }
    }
}

/// Input for `create_question`.
#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub title: String,
    pub details: Option<String>,
    pub category: Option<String>,
}

/// Question, answer, and category operations over the document store.
pub struct ContentRepository {
    store: Arc<dyn DocumentStore>,
    sessions: Arc<SessionStore>,
    recorder: Arc<ActivityRecorder>,
    policy: CampusPolicy,
}

impl ContentRepository {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        sessions: Arc<SessionStore>,
        recorder: Arc<ActivityRecorder>,
        policy: CampusPolicy,
    ) -> Self {
        Self {
            store,
            sessions,
            recorder,
            policy,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Questions
    // ─────────────────────────────────────────────────────────────────────────

    /// Publishes a new question authored by the current user.
    ///
    /// # Errors
    ///
    /// - `NotAuthenticated` without a session
    /// - `InvalidInput` for an empty or oversized title
    pub async fn create_question(&self, request: NewQuestion) -> Result<Question, ContentError> {
        // 1. Must be signed in
        let session = self.require_session()?;

        // 2. Build the aggregate (validates the title)
        let question = Question::new(
            QuestionId::new(),
            request.title,
            request.details,
            request.category,
            session.user_id.clone(),
            session.display_name_or_email(),
            session.email.clone(),
        )?;

        // 3. The owner needs a profile for counters and the author join
        self.ensure_profile(&session).await?;

        // 4. Persist the question
        let document = encode(&question)?;
        self.store
            .put(QUESTIONS_COLLECTION, &question.id().to_string(), document)
            .await?;

        // 5. Fold the category into the registry. The question stands even
        //    when this write fails.
        if let Some(category) = question.category() {
            if let Err(e) = self.register_category(category).await {
                tracing::warn!("Could not register category '{}': {}", category, e);
            }
        }

        // 6. Bump the asked counter
        self.store
            .patch(
                USERS_COLLECTION,
                session.user_id.as_str(),
                vec![FieldUpdate::increment("questionsAsked", 1)],
            )
            .await?;

        tracing::info!("Question {} published", question.id());

        // 7. Log it off the critical path
        let _ = self.recorder.record(
            &session.user_id,
            ActivityKind::QuestionAsked,
            Some(question.title().to_string()),
        );

        Ok(question)
    }

    /// Returns the question feed, newest first, with author names resolved
    /// against current profiles. Pass a category to restrict the feed.
    ///
    /// No session required; the feed is readable before login.
    ///
    /// Questions and profiles are fetched concurrently; either failure
    /// fails the read. Individual documents that no longer decode are
    /// skipped rather than failing the whole feed.
    pub async fn fetch_questions(
        &self,
        category: Option<&str>,
    ) -> Result<Vec<Question>, ContentError> {
        // 1. Questions and author profiles, fetched together
        let mut query = Query::collection(QUESTIONS_COLLECTION).order_by_desc("createdAt");
        if let Some(category) = category {
            query = query.where_eq("category", Value::String(category.to_string()));
        }
        let questions_query = self.store.query(query);
        let profiles_query = self.store.query(Query::collection(USERS_COLLECTION));
        let (question_docs, profile_docs) = futures::try_join!(questions_query, profiles_query)?;

        // 2. Index display names by email
        let display_names = display_names_by_email(profile_docs);

        // 3. Decode. Author name prefers the current profile, then the
        //    name stored on the question, then the bare email.
        let mut questions = Vec::with_capacity(question_docs.len());
        for (id, document) in question_docs {
            let mut question: Question = match serde_json::from_value(document) {
                Ok(question) => question,
                Err(e) => {
                    tracing::warn!("Skipping question {} that does not decode: {}", id, e);
                    continue;
                }
            };

            let resolved = display_names.get(question.author_email().as_str()).cloned();
            if let Some(name) = resolved {
                question.refresh_author_name(name);
            } else if question.author_name().trim().is_empty() {
                let email = question.author_email().as_str().to_string();
                question.refresh_author_name(email);
            }
            questions.push(question);
        }
        Ok(questions)
    }

    /// Returns the current user's questions, newest first.
    pub async fn fetch_asked_questions(&self) -> Result<Vec<Question>, ContentError> {
        // 1. Must be signed in
        let session = self.require_session()?;

        // 2. Only this user's questions
        let query = Query::collection(QUESTIONS_COLLECTION)
            .where_eq(
                "ownerId",
                Value::String(session.user_id.as_str().to_string()),
            )
            .order_by_desc("createdAt");
        let documents = self.store.query(query).await?;

        // 3. Decode
        let mut questions = Vec::with_capacity(documents.len());
        for (id, document) in documents {
            match serde_json::from_value(document) {
                Ok(question) => questions.push(question),
                Err(e) => {
                    tracing::warn!("Skipping question {} that does not decode: {}", id, e);
                }
            }
        }
        Ok(questions)
    }

    /// Deletes a question owned by the current user.
    ///
    /// # Errors
    ///
    /// - `QuestionNotFound` when no document exists for the id
    /// - `Forbidden` when someone other than the owner asks
    pub async fn delete_question(&self, question_id: &QuestionId) -> Result<(), ContentError> {
        // 1. Load under the session
        let session = self.require_session()?;
        let question = self.load_question(question_id).await?;

        // 2. Only the owner deletes
        question.authorize_owner(&session.user_id)?;

        // 3. Remove the document
        self.store
            .delete(QUESTIONS_COLLECTION, &question_id.to_string())
            .await?;

        tracing::info!("Question {} deleted", question_id);

        // 4. Log it
        let _ = self.recorder.record(
            &session.user_id,
            ActivityKind::QuestionDeleted,
            Some(question.title().to_string()),
        );
        Ok(())
    }

    /// Upvotes a question, once per user.
    ///
    /// The upvote marker lands on the caller's profile before the counter
    /// moves on the question. Two writes, so a crash between them can lose
    /// the count bump but never double it.
    ///
    /// # Errors
    ///
    /// - `AlreadyUpvoted` on a repeat upvote
    /// - `QuestionNotFound` when the question is gone
    pub async fn upvote_question(&self, question_id: &QuestionId) -> Result<(), ContentError> {
        // 1. Must be signed in, with a profile to carry the marker
        let session = self.require_session()?;
        let profile = self.ensure_profile(&session).await?;

        // 2. One upvote per user
        if profile.has_upvoted(question_id) {
            return Err(ContentError::AlreadyUpvoted);
        }

        // 3. Marker, then counter
        let marker = vec![FieldUpdate::array_union(
            "upvotedQuestions",
            vec![encode(question_id)?],
        )];
        self.store
            .patch(USERS_COLLECTION, session.user_id.as_str(), marker)
            .await?;

        let bump = vec![FieldUpdate::increment("upvotes", 1)];
        match self
            .store
            .patch(QUESTIONS_COLLECTION, &question_id.to_string(), bump)
            .await
        {
            Ok(()) => {}
            Err(StoreError::NotFound { .. }) => {
                return Err(ContentError::QuestionNotFound(question_id.clone()))
            }
            Err(e) => return Err(e.into()),
        }

        // 4. Log it
        let _ = self.recorder.record(
            &session.user_id,
            ActivityKind::QuestionUpvoted,
            Some(question_id.to_string()),
        );
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Answers
    // ─────────────────────────────────────────────────────────────────────────

    /// Appends an answer to a question.
    ///
    /// # Errors
    ///
    /// - `Validation` for blank text
    /// - `QuestionNotFound` when the question is gone
    pub async fn add_answer(
        &self,
        question_id: &QuestionId,
        text: impl Into<String>,
    ) -> Result<Answer, ContentError> {
        // 1. Must be signed in
        let session = self.require_session()?;

        // 2. Build the answer (validates the text)
        let answer = Answer::new(session.email.clone(), text)?;

        // 3. Append at the tail of the question's answer list
        let update = vec![FieldUpdate::array_union("answers", vec![encode(&answer)?])];
        match self
            .store
            .patch(QUESTIONS_COLLECTION, &question_id.to_string(), update)
            .await
        {
            Ok(()) => {}
            Err(StoreError::NotFound { .. }) => {
                return Err(ContentError::QuestionNotFound(question_id.clone()))
            }
            Err(e) => return Err(e.into()),
        }

        // 4. Bump the answered counter
        self.ensure_profile(&session).await?;
        self.store
            .patch(
                USERS_COLLECTION,
                session.user_id.as_str(),
                vec![FieldUpdate::increment("answersGiven", 1)],
            )
            .await?;

        // 5. Log it
        let _ = self.recorder.record(
            &session.user_id,
            ActivityKind::AnswerGiven,
            Some(question_id.to_string()),
        );
        Ok(answer)
    }

    /// Replaces the text of the caller's own answer.
    ///
    /// # Errors
    ///
    /// - `AnswerNotFound` when the id is not on the question
    /// - `Forbidden` when the caller did not write the answer
    pub async fn edit_answer(
        &self,
        question_id: &QuestionId,
        answer_id: &AnswerId,
        text: impl Into<String>,
    ) -> Result<(), ContentError> {
        // 1. Load under the session
        let session = self.require_session()?;
        let mut question = self.load_question(question_id).await?;

        // 2. Domain checks: the answer exists and the caller wrote it
        question
            .edit_answer(answer_id, &session.email, text)
            .map_err(|e| answer_error(e, answer_id))?;

        // 3. Write back the whole answer list
        self.replace_answers(&question).await
    }

    /// Removes the caller's own answer and takes back its counter credit.
    ///
    /// # Errors
    ///
    /// - `AnswerNotFound` when the id is not on the question
    /// - `Forbidden` when the caller did not write the answer
    pub async fn delete_answer(
        &self,
        question_id: &QuestionId,
        answer_id: &AnswerId,
    ) -> Result<(), ContentError> {
        // 1. Load under the session
        let session = self.require_session()?;
        let mut question = self.load_question(question_id).await?;

        // 2. Domain checks, then drop the answer
        question
            .remove_answer(answer_id, &session.email)
            .map_err(|e| answer_error(e, answer_id))?;

        // 3. Write back the remaining answers
        self.replace_answers(&question).await?;

        // 4. Decrement the answered counter. A healed profile starts at
        //    zero and stays there.
        let profile = self.ensure_profile(&session).await?;
        if profile.answers_given() > 0 {
            self.store
                .patch(
                    USERS_COLLECTION,
                    session.user_id.as_str(),
                    vec![FieldUpdate::increment("answersGiven", -1)],
                )
                .await?;
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Categories
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the known categories, in first-use order. No session
    /// required; the ask form's dropdown loads before login completes.
    pub async fn fetch_categories(&self) -> Result<Vec<String>, ContentError> {
        // Registry document; absence means no categories yet
        let document = self.store.get(META_COLLECTION, CATEGORIES_DOCUMENT).await?;
        let registry: CategoryRegistry = match document {
            Some(document) => serde_json::from_value(document)
                .map_err(|e| ContentError::Malformed(format!("category registry: {}", e)))?,
            None => CategoryRegistry::empty(),
        };
        Ok(registry.categories().to_vec())
    }

    /// Adds a category to the registry.
    ///
    /// Unlike the fold-in during `create_question`, a direct add surfaces
    /// backend failures to the caller.
    pub async fn add_category(&self, name: impl Into<String>) -> Result<(), ContentError> {
        // 1. Validate
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::empty_field("category").into());
        }

        // 2. Union into the registry, creating it on first use
        self.register_category(&name).await?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Private helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn require_session(&self) -> Result<Session, ContentError> {
        self.sessions.current().ok_or(ContentError::NotAuthenticated)
    }

    async fn load_question(&self, question_id: &QuestionId) -> Result<Question, ContentError> {
        let document = self
            .store
            .get(QUESTIONS_COLLECTION, &question_id.to_string())
            .await?
            .ok_or_else(|| ContentError::QuestionNotFound(question_id.clone()))?;

        serde_json::from_value(document)
            .map_err(|e| ContentError::Malformed(format!("question {}: {}", question_id, e)))
    }

    /// Loads the caller's profile, writing a minimal one if none exists.
    ///
    /// Accounts whose profile write failed at sign-up would otherwise
    /// dead-end every counter update.
    async fn ensure_profile(&self, session: &Session) -> Result<UserProfile, ContentError> {
        let existing = self
            .store
            .get(USERS_COLLECTION, session.user_id.as_str())
            .await?;
        if let Some(document) = existing {
            return serde_json::from_value(document)
                .map_err(|e| ContentError::Malformed(format!("profile {}: {}", session.user_id, e)));
        }

        tracing::warn!("No profile for {}; writing a default one", session.user_id);
        let profile = UserProfile::default_for(
            session.user_id.clone(),
            session.email.clone(),
            self.policy.college(),
        );
        let document = encode(&profile)?;
        self.store
            .put(USERS_COLLECTION, session.user_id.as_str(), document)
            .await?;
        Ok(profile)
    }

    /// Unions one category name into the registry document, creating the
    /// document when it does not exist yet.
    async fn register_category(&self, category: &str) -> Result<(), StoreError> {
        let update = vec![FieldUpdate::array_union(
            "categories",
            vec![Value::String(category.to_string())],
        )];
        match self
            .store
            .patch(META_COLLECTION, CATEGORIES_DOCUMENT, update)
            .await
        {
            Err(StoreError::NotFound { .. }) => {
                let mut registry = CategoryRegistry::empty();
                registry.add(category);
                let document = serde_json::to_value(&registry)?;
                self.store
                    .put(META_COLLECTION, CATEGORIES_DOCUMENT, document)
                    .await
            }
            other => other,
        }
    }

    /// Rewrites the question's whole answer list.
    async fn replace_answers(&self, question: &Question) -> Result<(), ContentError> {
        let update = vec![FieldUpdate::set("answers", encode(question.answers())?)];
        match self
            .store
            .patch(QUESTIONS_COLLECTION, &question.id().to_string(), update)
            .await
        {
            Ok(()) => Ok(()),
            Err(StoreError::NotFound { .. }) => {
                Err(ContentError::QuestionNotFound(question.id().clone()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl std::fmt::Debug for ContentRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentRepository")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

fn encode<T: serde::Serialize + ?Sized>(value: &T) -> Result<Value, ContentError> {
    serde_json::to_value(value).map_err(|e| ContentError::Malformed(e.to_string()))
}

fn answer_error(error: DomainError, answer_id: &AnswerId) -> ContentError {
    match error.code {
        ErrorCode::AnswerNotFound => ContentError::AnswerNotFound(answer_id.clone()),
        _ => error.into(),
    }
}

/// Indexes profile display names by email, skipping profiles that do not
/// decode or have no usable name.
fn display_names_by_email(profile_docs: Vec<(String, Value)>) -> HashMap<String, String> {
    let mut names = HashMap::new();
    for (_, document) in profile_docs {
        let profile: UserProfile = match serde_json::from_value(document) {
            Ok(profile) => profile,
            Err(_) => continue,
        };
        if let Some(name) = profile.display_name() {
            names.insert(profile.email().as_str().to_string(), name);
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryBackend;
    use crate::domain::foundation::{EmailAddress, UserId};
    use crate::domain::session::SessionToken;
    use serde_json::json;

    struct Fixture {
        backend: MemoryBackend,
        sessions: Arc<SessionStore>,
        repo: ContentRepository,
    }

    fn fixture() -> Fixture {
        let backend = MemoryBackend::new();
        let sessions = Arc::new(SessionStore::new());
        let store: Arc<dyn DocumentStore> = Arc::new(backend.clone());
        let recorder = Arc::new(ActivityRecorder::new(store.clone()));
        let repo = ContentRepository::new(
            store,
            sessions.clone(),
            recorder,
            CampusPolicy::new("Example State College", "college.edu"),
        );
        Fixture {
            backend,
            sessions,
            repo,
        }
    }

    fn signed_in_fixture() -> Fixture {
        let f = fixture();
        f.sessions.set(Session::new(
            UserId::new("uid-alice").unwrap(),
            EmailAddress::new("alice@college.edu").unwrap(),
            Some("Alice Anand".to_string()),
            true,
            SessionToken::new("tok-alice"),
        ));
        f
    }

    fn ask(title: &str, category: Option<&str>) -> NewQuestion {
        NewQuestion {
            title: title.to_string(),
            details: None,
            category: category.map(str::to_string),
        }
    }

    /// A raw question document authored by someone else.
    fn bobs_question_doc(id: &QuestionId, created_at: &str) -> Value {
        json!({
            "id": id.to_string(),
            "title": "What is a B-tree?",
            "ownerId": "uid-bob",
            "authorName": "Old Bob",
            "authorEmail": "bob@college.edu",
            "createdAt": created_at,
        })
    }

    // ════════════════════════════════════════════════════════════════════════
    // Question Tests
    // ════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn create_question_requires_a_session() {
        let f = fixture();

        let result = f.repo.create_question(ask("Why?", None)).await;

        assert!(matches!(result, Err(ContentError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn create_question_persists_document_and_bumps_counter() {
        let f = signed_in_fixture();

        let question = f
            .repo
            .create_question(ask("Why does TCP retransmit?", Some("networking")))
            .await
            .unwrap();

        let stored = f
            .backend
            .document(QUESTIONS_COLLECTION, &question.id().to_string())
            .await
            .unwrap();
        assert_eq!(stored["title"], "Why does TCP retransmit?");
        assert_eq!(stored["authorName"], "Alice Anand");

        // Profile was healed and the counter bumped
        let profile = f.backend.document(USERS_COLLECTION, "uid-alice").await.unwrap();
        assert_eq!(profile["questionsAsked"], 1);

        // The category landed in the registry
        let registry = f
            .backend
            .document(META_COLLECTION, CATEGORIES_DOCUMENT)
            .await
            .unwrap();
        assert_eq!(registry["categories"], json!(["networking"]));
    }

    #[tokio::test]
    async fn create_question_with_blank_title_writes_nothing() {
        let f = signed_in_fixture();

        let result = f.repo.create_question(ask("   ", None)).await;

        assert!(result.err().map(|e| e.is_validation()).unwrap_or(false));
        assert_eq!(f.backend.collection_size(QUESTIONS_COLLECTION).await, 0);
    }

    #[tokio::test]
    async fn create_question_survives_a_registry_write_failure() {
        let f = signed_in_fixture();
        f.backend.fail_writes_to(META_COLLECTION).await;

        let question = f
            .repo
            .create_question(ask("Why does TCP retransmit?", Some("networking")))
            .await
            .unwrap();

        assert!(f
            .backend
            .document(QUESTIONS_COLLECTION, &question.id().to_string())
            .await
            .is_some());
        assert_eq!(f.backend.collection_size(META_COLLECTION).await, 0);
    }

    #[tokio::test]
    async fn fetch_questions_returns_newest_first() {
        let f = signed_in_fixture();
        let older = QuestionId::new();
        let newer = QuestionId::new();
        f.backend
            .put(
                QUESTIONS_COLLECTION,
                &older.to_string(),
                bobs_question_doc(&older, "2024-01-01T00:00:00.000000Z"),
            )
            .await
            .unwrap();
        f.backend
            .put(
                QUESTIONS_COLLECTION,
                &newer.to_string(),
                bobs_question_doc(&newer, "2024-06-01T00:00:00.000000Z"),
            )
            .await
            .unwrap();

        let questions = f.repo.fetch_questions(None).await.unwrap();

        let ids: Vec<_> = questions.iter().map(|q| q.id().clone()).collect();
        assert_eq!(ids, vec![newer, older]);
    }

    #[tokio::test]
    async fn fetch_questions_can_filter_by_category() {
        let f = signed_in_fixture();
        f.repo
            .create_question(ask("Why does TCP retransmit?", Some("networking")))
            .await
            .unwrap();
        f.repo
            .create_question(ask("What is a B-tree?", Some("databases")))
            .await
            .unwrap();

        let networking = f.repo.fetch_questions(Some("networking")).await.unwrap();

        assert_eq!(networking.len(), 1);
        assert_eq!(networking[0].title(), "Why does TCP retransmit?");
    }

    #[tokio::test]
    async fn fetch_questions_prefers_the_authors_current_profile_name() {
        let f = signed_in_fixture();
        let id = QuestionId::new();
        f.backend
            .put(
                QUESTIONS_COLLECTION,
                &id.to_string(),
                bobs_question_doc(&id, "2024-01-01T00:00:00.000000Z"),
            )
            .await
            .unwrap();
        f.backend
            .put(
                USERS_COLLECTION,
                "uid-bob",
                json!({
                    "userId": "uid-bob",
                    "email": "bob@college.edu",
                    "firstName": "Bobby",
                    "lastName": "Tables",
                    "college": { "name": "Example State College", "emailDomain": "college.edu" },
                    "createdAt": "2023-01-01T00:00:00.000000Z",
                }),
            )
            .await
            .unwrap();

        let questions = f.repo.fetch_questions(None).await.unwrap();

        assert_eq!(questions[0].author_name(), "Bobby Tables");
    }

    #[tokio::test]
    async fn fetch_questions_falls_back_to_stored_name_then_email() {
        let f = signed_in_fixture();
        let with_name = QuestionId::new();
        let nameless = QuestionId::new();
        f.backend
            .put(
                QUESTIONS_COLLECTION,
                &with_name.to_string(),
                bobs_question_doc(&with_name, "2024-02-01T00:00:00.000000Z"),
            )
            .await
            .unwrap();
        f.backend
            .put(
                QUESTIONS_COLLECTION,
                &nameless.to_string(),
                json!({
                    "id": nameless.to_string(),
                    "title": "Who am I?",
                    "ownerId": "uid-carol",
                    "authorName": "",
                    "authorEmail": "carol@college.edu",
                    "createdAt": "2024-01-01T00:00:00.000000Z",
                }),
            )
            .await
            .unwrap();

        let questions = f.repo.fetch_questions(None).await.unwrap();

        assert_eq!(questions[0].author_name(), "Old Bob");
        assert_eq!(questions[1].author_name(), "carol@college.edu");
    }

    #[tokio::test]
    async fn fetch_questions_skips_documents_that_do_not_decode() {
        let f = signed_in_fixture();
        let good = QuestionId::new();
        f.backend
            .put(
                QUESTIONS_COLLECTION,
                &good.to_string(),
                bobs_question_doc(&good, "2024-01-01T00:00:00.000000Z"),
            )
            .await
            .unwrap();
        f.backend
            .put(QUESTIONS_COLLECTION, "broken", json!({ "title": 7 }))
            .await
            .unwrap();

        let questions = f.repo.fetch_questions(None).await.unwrap();

        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].id(), &good);
    }

    #[tokio::test]
    async fn fetch_asked_questions_returns_only_mine() {
        let f = signed_in_fixture();
        f.repo
            .create_question(ask("Mine, asked first", None))
            .await
            .unwrap();
        // Separate the creation stamps so the order-by is unambiguous
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        f.repo
            .create_question(ask("Mine, asked second", None))
            .await
            .unwrap();
        let other = QuestionId::new();
        f.backend
            .put(
                QUESTIONS_COLLECTION,
                &other.to_string(),
                bobs_question_doc(&other, "2030-01-01T00:00:00.000000Z"),
            )
            .await
            .unwrap();

        let questions = f.repo.fetch_asked_questions().await.unwrap();

        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].title(), "Mine, asked second");
        assert_eq!(questions[1].title(), "Mine, asked first");
    }

    #[tokio::test]
    async fn delete_question_removes_the_document() {
        let f = signed_in_fixture();
        let question = f.repo.create_question(ask("Short-lived", None)).await.unwrap();

        f.repo.delete_question(question.id()).await.unwrap();

        assert_eq!(f.backend.collection_size(QUESTIONS_COLLECTION).await, 0);
    }

    #[tokio::test]
    async fn delete_question_by_a_non_owner_is_forbidden() {
        let f = signed_in_fixture();
        let id = QuestionId::new();
        f.backend
            .put(
                QUESTIONS_COLLECTION,
                &id.to_string(),
                bobs_question_doc(&id, "2024-01-01T00:00:00.000000Z"),
            )
            .await
            .unwrap();

        let result = f.repo.delete_question(&id).await;

        assert!(matches!(result, Err(ContentError::Forbidden(_))));
        assert_eq!(f.backend.collection_size(QUESTIONS_COLLECTION).await, 1);
    }

    #[tokio::test]
    async fn delete_missing_question_reports_not_found() {
        let f = signed_in_fixture();
        let id = QuestionId::new();

        let result = f.repo.delete_question(&id).await;

        assert!(matches!(result, Err(ContentError::QuestionNotFound(_))));
    }

    #[tokio::test]
    async fn upvote_increments_once_and_rejects_repeats() {
        let f = signed_in_fixture();
        let question = f.repo.create_question(ask("Upvotable", None)).await.unwrap();

        f.repo.upvote_question(question.id()).await.unwrap();
        let second = f.repo.upvote_question(question.id()).await;

        assert!(matches!(second, Err(ContentError::AlreadyUpvoted)));
        let stored = f
            .backend
            .document(QUESTIONS_COLLECTION, &question.id().to_string())
            .await
            .unwrap();
        assert_eq!(stored["upvotes"], 1);

        let profile = f.backend.document(USERS_COLLECTION, "uid-alice").await.unwrap();
        assert_eq!(
            profile["upvotedQuestions"],
            json!([question.id().to_string()])
        );
    }

    #[tokio::test]
    async fn upvote_missing_question_reports_not_found() {
        let f = signed_in_fixture();
        let id = QuestionId::new();

        let result = f.repo.upvote_question(&id).await;

        assert!(matches!(result, Err(ContentError::QuestionNotFound(_))));
    }

    // ════════════════════════════════════════════════════════════════════════
    // Answer Tests
    // ════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn add_answer_appends_at_the_tail_and_bumps_counter() {
        let f = signed_in_fixture();
        let question = f.repo.create_question(ask("Answerable", None)).await.unwrap();

        f.repo.add_answer(question.id(), "First answer").await.unwrap();
        f.repo.add_answer(question.id(), "Second answer").await.unwrap();

        let stored = f
            .backend
            .document(QUESTIONS_COLLECTION, &question.id().to_string())
            .await
            .unwrap();
        let answers = stored["answers"].as_array().unwrap();
        assert_eq!(answers.len(), 2);
        assert_eq!(answers[0]["text"], "First answer");
        assert_eq!(answers[1]["text"], "Second answer");

        let profile = f.backend.document(USERS_COLLECTION, "uid-alice").await.unwrap();
        assert_eq!(profile["answersGiven"], 2);
    }

    #[tokio::test]
    async fn add_answer_to_missing_question_reports_not_found() {
        let f = signed_in_fixture();
        let id = QuestionId::new();

        let result = f.repo.add_answer(&id, "Answering the void").await;

        assert!(matches!(result, Err(ContentError::QuestionNotFound(_))));
    }

    #[tokio::test]
    async fn add_answer_with_blank_text_is_rejected() {
        let f = signed_in_fixture();
        let question = f.repo.create_question(ask("Answerable", None)).await.unwrap();

        let result = f.repo.add_answer(question.id(), "   ").await;

        assert!(matches!(result, Err(ContentError::Validation(_))));
    }

    #[tokio::test]
    async fn edit_answer_rewrites_text_and_keeps_the_order() {
        let f = signed_in_fixture();
        let question = f.repo.create_question(ask("Editable", None)).await.unwrap();
        let first = f.repo.add_answer(question.id(), "First answer").await.unwrap();
        f.repo.add_answer(question.id(), "Second answer").await.unwrap();

        f.repo
            .edit_answer(question.id(), first.id(), "First answer, revised")
            .await
            .unwrap();

        let stored = f
            .backend
            .document(QUESTIONS_COLLECTION, &question.id().to_string())
            .await
            .unwrap();
        let answers = stored["answers"].as_array().unwrap();
        assert_eq!(answers[0]["text"], "First answer, revised");
        assert_eq!(answers[1]["text"], "Second answer");
    }

    #[tokio::test]
    async fn edit_answer_by_a_non_author_is_forbidden() {
        let f = signed_in_fixture();
        let id = QuestionId::new();
        let answer_id = crate::domain::foundation::AnswerId::new();
        f.backend
            .put(
                QUESTIONS_COLLECTION,
                &id.to_string(),
                json!({
                    "id": id.to_string(),
                    "title": "Someone else's thread",
                    "ownerId": "uid-bob",
                    "authorName": "Bob",
                    "authorEmail": "bob@college.edu",
                    "createdAt": "2024-01-01T00:00:00.000000Z",
                    "answers": [{
                        "id": answer_id.to_string(),
                        "authorEmail": "bob@college.edu",
                        "text": "Bob's answer",
                        "createdAt": "2024-01-02T00:00:00.000000Z",
                        "updatedAt": "2024-01-02T00:00:00.000000Z",
                    }],
                }),
            )
            .await
            .unwrap();

        let result = f.repo.edit_answer(&id, &answer_id, "Hijacked").await;

        assert!(matches!(result, Err(ContentError::Forbidden(_))));
    }

    #[tokio::test]
    async fn edit_missing_answer_reports_not_found() {
        let f = signed_in_fixture();
        let question = f.repo.create_question(ask("Editable", None)).await.unwrap();
        let ghost = crate::domain::foundation::AnswerId::new();

        let result = f.repo.edit_answer(question.id(), &ghost, "New text").await;

        assert!(matches!(result, Err(ContentError::AnswerNotFound(_))));
    }

    #[tokio::test]
    async fn delete_answer_removes_it_and_decrements_the_counter() {
        let f = signed_in_fixture();
        let question = f.repo.create_question(ask("Cleanup", None)).await.unwrap();
        let first = f.repo.add_answer(question.id(), "First answer").await.unwrap();
        f.repo.add_answer(question.id(), "Second answer").await.unwrap();

        f.repo.delete_answer(question.id(), first.id()).await.unwrap();

        let stored = f
            .backend
            .document(QUESTIONS_COLLECTION, &question.id().to_string())
            .await
            .unwrap();
        let answers = stored["answers"].as_array().unwrap();
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0]["text"], "Second answer");

        let profile = f.backend.document(USERS_COLLECTION, "uid-alice").await.unwrap();
        assert_eq!(profile["answersGiven"], 1);
    }

    #[tokio::test]
    async fn delete_answer_never_drives_the_counter_negative() {
        let f = signed_in_fixture();
        let id = QuestionId::new();
        let answer_id = crate::domain::foundation::AnswerId::new();
        // Alice's answer on a raw document, with no profile to decrement
        f.backend
            .put(
                QUESTIONS_COLLECTION,
                &id.to_string(),
                json!({
                    "id": id.to_string(),
                    "title": "Counter test",
                    "ownerId": "uid-bob",
                    "authorName": "Bob",
                    "authorEmail": "bob@college.edu",
                    "createdAt": "2024-01-01T00:00:00.000000Z",
                    "answers": [{
                        "id": answer_id.to_string(),
                        "authorEmail": "alice@college.edu",
                        "text": "Alice's answer",
                        "createdAt": "2024-01-02T00:00:00.000000Z",
                        "updatedAt": "2024-01-02T00:00:00.000000Z",
                    }],
                }),
            )
            .await
            .unwrap();

        f.repo.delete_answer(&id, &answer_id).await.unwrap();

        let profile = f.backend.document(USERS_COLLECTION, "uid-alice").await.unwrap();
        assert_eq!(profile["answersGiven"], 0);
    }

    // ════════════════════════════════════════════════════════════════════════
    // Category Tests
    // ════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn fetch_categories_is_empty_before_first_use() {
        let f = signed_in_fixture();

        let categories = f.repo.fetch_categories().await.unwrap();

        assert!(categories.is_empty());
    }

    #[tokio::test]
    async fn add_category_creates_the_registry_then_unions() {
        let f = signed_in_fixture();

        f.repo.add_category("networking").await.unwrap();
        f.repo.add_category("databases").await.unwrap();
        f.repo.add_category("networking").await.unwrap();

        let categories = f.repo.fetch_categories().await.unwrap();
        assert_eq!(categories, vec!["networking", "databases"]);
    }

    #[tokio::test]
    async fn add_category_rejects_blank_names() {
        let f = signed_in_fixture();

        let result = f.repo.add_category("  ").await;

        assert!(matches!(result, Err(ContentError::Validation(_))));
    }

    #[tokio::test]
    async fn add_category_surfaces_backend_failures() {
        let f = signed_in_fixture();
        f.backend.fail_writes_to(META_COLLECTION).await;

        let result = f.repo.add_category("networking").await;

        assert!(matches!(result, Err(ContentError::Backend(_))));
    }

    #[tokio::test]
    async fn feed_and_categories_read_without_a_session() {
        let f = fixture();

        assert!(f.repo.fetch_questions(None).await.unwrap().is_empty());
        assert!(f.repo.fetch_categories().await.unwrap().is_empty());
    }
}
