//! Answer entity, embedded inside its question.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AnswerId, EmailAddress, Timestamp, ValidationError};

/// One answer inside a question's answer sequence.
///
/// Never separately addressable in the document store; the whole sequence is
/// rewritten on edit and delete. The generated id makes a single answer
/// addressable even when two answers share author and text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    /// Stable id assigned when the answer is appended.
    id: AnswerId,

    /// Email of the account that wrote the answer.
    author_email: EmailAddress,

    /// Answer body.
    text: String,

    /// When the answer was appended.
    created_at: Timestamp,

    /// When the answer was last edited; equals `created_at` until then.
    updated_at: Timestamp,
}

impl Answer {
    /// Creates a new answer with a fresh id and timestamps.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the text is blank
    pub fn new(author_email: EmailAddress, text: impl Into<String>) -> Result<Self, ValidationError> {
        let text = text.into().trim().to_string();
        if text.is_empty() {
            return Err(ValidationError::empty_field("answer_text"));
        }

        let now = Timestamp::now();
        Ok(Self {
            id: AnswerId::new(),
            author_email,
            text,
            created_at: now,
            updated_at: now,
        })
    }

    /// Returns the answer id.
    pub fn id(&self) -> &AnswerId {
        &self.id
    }

    /// Returns the author's email.
    pub fn author_email(&self) -> &EmailAddress {
        &self.author_email
    }

    /// Returns the answer body.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns when the answer was appended.
    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    /// Returns when the answer was last edited.
    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    /// Checks whether the given email wrote this answer.
    pub fn is_author(&self, email: &EmailAddress) -> bool {
        &self.author_email == email
    }

    /// Replaces the answer body and refreshes the edit timestamp.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the new text is blank
    pub fn edit(&mut self, text: impl Into<String>) -> Result<(), ValidationError> {
        let text = text.into().trim().to_string();
        if text.is_empty() {
            return Err(ValidationError::empty_field("answer_text"));
        }

        self.text = text;
        self.updated_at = Timestamp::now();
        Ok(())
    }
}
