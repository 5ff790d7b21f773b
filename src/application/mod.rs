//! Application layer - the four components behind the facade.
//!
//! This layer orchestrates domain operations over the backend ports: the
//! `AuthGateway` owns the account lifecycle, the `ContentRepository` owns
//! questions and categories, the `SessionStore` publishes the current
//! session to both, and the `ActivityRecorder` logs actions off the
//! critical path. `DoubtSolver` wires them together.

pub mod activity_recorder;
pub mod auth_gateway;
pub mod content_repository;
pub mod facade;
pub mod policy;
pub mod session_store;

pub use activity_recorder::ActivityRecorder;
pub use auth_gateway::{AuthGateway, SignUpRequest};
pub use content_repository::{ContentError, ContentRepository, NewQuestion};
pub use facade::DoubtSolver;
pub use policy::CampusPolicy;
pub use session_store::{SessionObserver, SessionStore, SubscriberId};

/// Profile documents, keyed by provider user id.
pub(crate) const USERS_COLLECTION: &str = "users";

/// Question documents, keyed by question id.
pub(crate) const QUESTIONS_COLLECTION: &str = "questions";

/// Append-only activity log.
pub(crate) const ACTIVITY_COLLECTION: &str = "activity";

/// Singleton app metadata documents.
pub(crate) const META_COLLECTION: &str = "meta";

/// The category registry document id within `meta`.
pub(crate) const CATEGORIES_DOCUMENT: &str = "categories";
