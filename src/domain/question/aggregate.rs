//! Question aggregate entity.
//!
//! Questions are the public content of the application. Each question is one
//! document in the `questions` collection, with its answers embedded inline
//! as an ordered sequence.
//!
//! # Ownership
//!
//! A question is owned by the user who created it; only the owner may delete
//! it. Answers inside it belong to their individual authors.

use serde::{Deserialize, Serialize};

use super::Answer;
use crate::domain::foundation::{
    AnswerId, DomainError, EmailAddress, ErrorCode, QuestionId, Timestamp, UserId,
};

/// Maximum length for a question title.
pub const MAX_TITLE_LENGTH: usize = 500;

/// Question aggregate with embedded answers.
///
/// # Invariants
///
/// - `id` matches the document id in the `questions` collection
/// - `title` is 1-500 characters after trimming
/// - `answers` keeps append order; new answers go at the tail
/// - `upvotes` only moves through the backend's atomic increment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Unique identifier for this question.
    id: QuestionId,

    /// Question title.
    title: String,

    /// Optional longer body text.
    #[serde(default)]
    details: Option<String>,

    /// Optional category tag.
    #[serde(default)]
    category: Option<String>,

    /// User who created the question.
    owner_id: UserId,

    /// Author display string captured at creation time.
    author_name: String,

    /// Author email captured at creation time.
    author_email: EmailAddress,

    /// When the question was created.
    created_at: Timestamp,

    /// Upvote counter.
    #[serde(default)]
    upvotes: u32,

    /// Embedded answers in append order.
    #[serde(default)]
    answers: Vec<Answer>,
}

impl Question {
    /// Creates a new question with no answers and zero upvotes.
    ///
    /// Blank `details` and `category` collapse to `None`.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if the title is empty or too long
    pub fn new(
        id: QuestionId,
        title: impl Into<String>,
        details: Option<String>,
        category: Option<String>,
        owner_id: UserId,
        author_name: impl Into<String>,
        author_email: EmailAddress,
    ) -> Result<Self, DomainError> {
        let title = title.into().trim().to_string();
        Self::validate_title(&title)?;

        Ok(Self {
            id,
            title,
            details: normalize_optional(details),
            category: normalize_optional(category),
            owner_id,
            author_name: author_name.into(),
            author_email,
            created_at: Timestamp::now(),
            upvotes: 0,
            answers: Vec::new(),
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the question id.
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    /// Returns the title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the body text, if any.
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Returns the category tag, if any.
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Returns the owner's user id.
    pub fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    /// Returns the author display string captured at creation.
    pub fn author_name(&self) -> &str {
        &self.author_name
    }

    /// Returns the author email captured at creation.
    pub fn author_email(&self) -> &EmailAddress {
        &self.author_email
    }

    /// Returns when the question was created.
    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    /// Returns the upvote counter.
    pub fn upvotes(&self) -> u32 {
        self.upvotes
    }

    /// Returns the answers in append order.
    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    /// Returns the number of answers.
    pub fn answer_count(&self) -> usize {
        self.answers.len()
    }

    /// Replaces the denormalized author display name.
    ///
    /// The read path refreshes this from the author's current profile so
    /// renames show up on questions written before the rename. Blank names
    /// leave the stored value in place.
    pub fn refresh_author_name(&mut self, name: impl Into<String>) {
        let name = name.into().trim().to_string();
        if !name.is_empty() {
            self.author_name = name;
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Authorization
    // ─────────────────────────────────────────────────────────────────────────

    /// Checks if the given user owns this question.
    pub fn is_owner(&self, user_id: &UserId) -> bool {
        &self.owner_id == user_id
    }

    /// Validates that the user may delete this question.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if user is not the owner
    pub fn authorize_owner(&self, user_id: &UserId) -> Result<(), DomainError> {
        if self.is_owner(user_id) {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::Forbidden,
                "Only the question's owner may do this",
            ))
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Answer mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Looks up an answer by id.
    pub fn find_answer(&self, answer_id: &AnswerId) -> Option<&Answer> {
        self.answers.iter().find(|a| a.id() == answer_id)
    }

    /// Replaces the text of one answer, refreshing its edit timestamp.
    ///
    /// # Errors
    ///
    /// - `AnswerNotFound` if the id is not in the sequence
    /// - `Forbidden` if `editor` is not the answer's author
    /// - `ValidationFailed` if the new text is blank
    pub fn edit_answer(
        &mut self,
        answer_id: &AnswerId,
        editor: &EmailAddress,
        text: impl Into<String>,
    ) -> Result<(), DomainError> {
        let answer = self
            .answers
            .iter_mut()
            .find(|a| a.id() == answer_id)
            .ok_or_else(|| {
                DomainError::new(ErrorCode::AnswerNotFound, "Answer not found on this question")
            })?;

        if !answer.is_author(editor) {
            return Err(DomainError::new(
                ErrorCode::Forbidden,
                "Only the answer's author may edit it",
            ));
        }

        answer.edit(text)?;
        Ok(())
    }

    /// Removes one answer, returning the removed record.
    ///
    /// # Errors
    ///
    /// - `AnswerNotFound` if the id is not in the sequence
    /// - `Forbidden` if `editor` is not the answer's author
    pub fn remove_answer(
        &mut self,
        answer_id: &AnswerId,
        editor: &EmailAddress,
    ) -> Result<Answer, DomainError> {
        let position = self
            .answers
            .iter()
            .position(|a| a.id() == answer_id)
            .ok_or_else(|| {
                DomainError::new(ErrorCode::AnswerNotFound, "Answer not found on this question")
            })?;

        if !self.answers[position].is_author(editor) {
            return Err(DomainError::new(
                ErrorCode::Forbidden,
                "Only the answer's author may delete it",
            ));
        }

        Ok(self.answers.remove(position))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Private helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Validates the question title.
    fn validate_title(title: &str) -> Result<(), DomainError> {
        if title.is_empty() {
            return Err(DomainError::validation("title", "Title cannot be empty"));
        }
        if title.len() > MAX_TITLE_LENGTH {
            return Err(DomainError::validation(
                "title",
                format!("Title must be {} characters or less", MAX_TITLE_LENGTH),
            ));
        }
        Ok(())
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
