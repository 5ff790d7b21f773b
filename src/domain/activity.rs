//! Append-only activity log records.
//!
//! One document per recorded action in the `activity` collection. Entries
//! are write-only from this crate's perspective; nothing reads them back.

use serde::{Deserialize, Serialize};

use super::foundation::{Timestamp, UserId};

/// What kind of action an activity entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Login,
    QuestionAsked,
    AnswerGiven,
    QuestionUpvoted,
    QuestionDeleted,
}

impl ActivityKind {
    /// Returns the stable tag stored in activity documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Login => "login",
            ActivityKind::QuestionAsked => "question_asked",
            ActivityKind::AnswerGiven => "answer_given",
            ActivityKind::QuestionUpvoted => "question_upvoted",
            ActivityKind::QuestionDeleted => "question_deleted",
        }
    }
}

impl std::fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One recorded user action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    /// Who performed the action.
    user_id: UserId,

    /// What happened.
    action: ActivityKind,

    /// Free-form context, e.g. a question title.
    #[serde(default)]
    detail: Option<String>,

    /// When the action happened.
    at: Timestamp,
}

impl ActivityEntry {
    /// Creates an entry stamped with the current time.
    pub fn new(user_id: UserId, action: ActivityKind, detail: Option<String>) -> Self {
        Self {
            user_id,
            action,
            detail,
            at: Timestamp::now(),
        }
    }

    /// Returns who performed the action.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns the action kind.
    pub fn action(&self) -> ActivityKind {
        self.action
    }

    /// Returns the free-form detail, if any.
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Returns when the action happened.
    pub fn at(&self) -> &Timestamp {
        &self.at
    }
}
