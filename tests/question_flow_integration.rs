//! Integration tests for the question and answer flows.
//!
//! These tests verify the end-to-end content path:
//! 1. A signed-in user publishes questions and the feed returns them newest first
//! 2. Other users answer, upvote, and see current author names on the feed
//! 3. Ownership rules gate deletion; counters and the category registry follow along
//!
//! Uses the in-memory backend to test the flows without external dependencies.

use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;
use serde_json::json;

use doubt_solver::adapters::memory::{MemoryBackend, MemoryPendingSignups};
use doubt_solver::application::{CampusPolicy, ContentError, DoubtSolver, NewQuestion, SignUpRequest};
use doubt_solver::ports::{DocumentStore, FieldUpdate};

// =============================================================================
// Test Infrastructure
// =============================================================================

fn service() -> (MemoryBackend, DoubtSolver) {
    let backend = MemoryBackend::new();
    let solver = DoubtSolver::new(
        Arc::new(backend.clone()),
        Arc::new(backend.clone()),
        Arc::new(MemoryPendingSignups::new()),
        CampusPolicy::new("Example State College", "college.edu"),
    );
    (backend, solver)
}

/// Registers, verifies, and logs in one user.
async fn join_as(solver: &DoubtSolver, email: &str, first: &str, last: &str) {
    solver
        .auth()
        .sign_up(SignUpRequest {
            email: email.to_string(),
            password: "hunter22".to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
        })
        .await
        .unwrap();
    solver.auth().confirm_verification().await.unwrap();
    solver.auth().login(email, "hunter22").await.unwrap();
}

fn ask(title: &str, category: Option<&str>) -> NewQuestion {
    NewQuestion {
        title: title.to_string(),
        details: None,
        category: category.map(str::to_string),
    }
}

/// Lets spawned activity writes finish before asserting on them.
async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

// =============================================================================
// Integration Tests
// =============================================================================

/// Tests that published questions come back through both feeds, newest
/// first, with details and category intact.
#[tokio::test]
async fn ask_then_fetch_roundtrip() {
    let (_, solver) = service();
    join_as(&solver, "alice@college.edu", "Alice", "Anand").await;

    solver
        .content()
        .create_question(NewQuestion {
            title: "Why does TCP retransmit?".to_string(),
            details: Some("Seen on assignment 3.".to_string()),
            category: Some("networking".to_string()),
        })
        .await
        .unwrap();
    // Separate the creation stamps so the order-by is unambiguous
    tokio::time::sleep(Duration::from_millis(2)).await;
    solver
        .content()
        .create_question(ask("What is a B-tree?", None))
        .await
        .unwrap();

    let feed = solver.content().fetch_questions(None).await.unwrap();
    assert_eq!(feed.len(), 2);
    assert_eq!(feed[0].title(), "What is a B-tree?");
    assert_eq!(feed[1].title(), "Why does TCP retransmit?");
    assert_eq!(feed[1].details(), Some("Seen on assignment 3."));
    assert_eq!(feed[1].category(), Some("networking"));
    assert_eq!(feed[1].author_name(), "Alice Anand");

    let mine = solver.content().fetch_asked_questions().await.unwrap();
    assert_eq!(mine.len(), 2);
    assert_eq!(mine[0].title(), "What is a B-tree?");
}

/// Tests that another user's answers append in order and land on their
/// own answered counter, and that the feed shows the asker's name to them.
#[tokio::test]
async fn another_user_answers_in_order() {
    let (backend, solver) = service();
    join_as(&solver, "alice@college.edu", "Alice", "Anand").await;
    let question = solver
        .content()
        .create_question(ask("Why does TCP retransmit?", None))
        .await
        .unwrap();
    solver.auth().logout().await;

    join_as(&solver, "bob@college.edu", "Bob", "Okafor").await;
    let bob_id = solver.current_session().unwrap().user_id;
    solver
        .content()
        .add_answer(question.id(), "Packet loss triggers it.")
        .await
        .unwrap();
    solver
        .content()
        .add_answer(question.id(), "Also reordering beyond dupthresh.")
        .await
        .unwrap();

    let feed = solver.content().fetch_questions(None).await.unwrap();
    assert_eq!(feed[0].author_name(), "Alice Anand");
    let answers = feed[0].answers();
    assert_eq!(answers.len(), 2);
    assert_eq!(answers[0].text(), "Packet loss triggers it.");
    assert_eq!(answers[1].text(), "Also reordering beyond dupthresh.");
    assert_eq!(answers[0].author_email().as_str(), "bob@college.edu");

    let profile = backend.document("users", bob_id.as_str()).await.unwrap();
    assert_eq!(profile["answersGiven"], 2);
}

/// Tests that upvotes count once per user and accumulate across users.
#[tokio::test]
async fn upvotes_count_once_per_user() {
    let (backend, solver) = service();
    join_as(&solver, "alice@college.edu", "Alice", "Anand").await;
    let question = solver
        .content()
        .create_question(ask("Why does TCP retransmit?", None))
        .await
        .unwrap();
    solver.auth().logout().await;

    join_as(&solver, "bob@college.edu", "Bob", "Okafor").await;
    solver.content().upvote_question(question.id()).await.unwrap();
    let repeat = solver.content().upvote_question(question.id()).await;
    assert!(matches!(repeat, Err(ContentError::AlreadyUpvoted)));
    solver.auth().logout().await;

    solver
        .auth()
        .login("alice@college.edu", "hunter22")
        .await
        .unwrap();
    solver.content().upvote_question(question.id()).await.unwrap();

    let stored = backend
        .document("questions", &question.id().to_string())
        .await
        .unwrap();
    assert_eq!(stored["upvotes"], 2);
}

/// Tests that only the owner can delete a question.
#[tokio::test]
async fn only_the_owner_deletes_a_question() {
    let (backend, solver) = service();
    join_as(&solver, "alice@college.edu", "Alice", "Anand").await;
    let question = solver
        .content()
        .create_question(ask("Why does TCP retransmit?", None))
        .await
        .unwrap();
    solver.auth().logout().await;

    join_as(&solver, "bob@college.edu", "Bob", "Okafor").await;
    let denied = solver.content().delete_question(question.id()).await;
    assert!(matches!(denied, Err(ContentError::Forbidden(_))));
    assert_eq!(backend.collection_size("questions").await, 1);
    solver.auth().logout().await;

    solver
        .auth()
        .login("alice@college.edu", "hunter22")
        .await
        .unwrap();
    solver.content().delete_question(question.id()).await.unwrap();
    assert_eq!(backend.collection_size("questions").await, 0);
}

/// Tests that the category registry accumulates first uses without
/// duplicates and that the feed filters on category.
#[tokio::test]
async fn category_registry_grows_with_first_use() {
    let (_, solver) = service();
    join_as(&solver, "alice@college.edu", "Alice", "Anand").await;

    solver
        .content()
        .create_question(ask("Why does TCP retransmit?", Some("networking")))
        .await
        .unwrap();
    solver
        .content()
        .create_question(ask("What is a B-tree?", Some("databases")))
        .await
        .unwrap();
    solver
        .content()
        .create_question(ask("What is congestion control?", Some("networking")))
        .await
        .unwrap();

    let categories = solver.content().fetch_categories().await.unwrap();
    assert_eq!(categories, vec!["networking", "databases"]);

    let networking = solver
        .content()
        .fetch_questions(Some("networking"))
        .await
        .unwrap();
    assert_eq!(networking.len(), 2);
    assert!(networking.iter().all(|q| q.category() == Some("networking")));
}

/// Tests that a profile rename shows up on questions written before the
/// rename.
#[tokio::test]
async fn renamed_author_shows_up_on_old_questions() {
    let (backend, solver) = service();
    join_as(&solver, "alice@college.edu", "Alice", "Anand").await;
    let alice_id = solver.current_session().unwrap().user_id;
    solver
        .content()
        .create_question(ask("Why does TCP retransmit?", None))
        .await
        .unwrap();

    backend
        .patch(
            "users",
            alice_id.as_str(),
            vec![FieldUpdate::set("firstName", json!("Alicia"))],
        )
        .await
        .unwrap();

    let feed = solver.content().fetch_questions(None).await.unwrap();
    assert_eq!(feed[0].author_name(), "Alicia Anand");
}

/// Tests that each recorded action lands one entry in the activity log.
#[tokio::test]
async fn activity_log_accumulates_per_action() {
    let (backend, solver) = service();
    join_as(&solver, "alice@college.edu", "Alice", "Anand").await;

    solver
        .content()
        .create_question(ask("Why does TCP retransmit?", None))
        .await
        .unwrap();
    solver
        .content()
        .create_question(ask("What is a B-tree?", None))
        .await
        .unwrap();
    settle().await;

    // One login plus two questions
    assert_eq!(backend.collection_size("activity").await, 3);
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Any accepted title survives the write, query, and decode path.
    #[test]
    fn accepted_titles_roundtrip_through_storage(raw_title in "[a-zA-Z][a-zA-Z0-9 ,?']{0,60}") {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async {
            let (_, solver) = service();
            join_as(&solver, "alice@college.edu", "Alice", "Anand").await;

            let created = solver
                .content()
                .create_question(ask(&raw_title, None))
                .await
                .unwrap();
            let fetched = solver.content().fetch_asked_questions().await.unwrap();

            assert_eq!(fetched.len(), 1);
            assert_eq!(fetched[0].title(), created.title());
            assert_eq!(fetched[0].id(), created.id());
        });
    }
}
