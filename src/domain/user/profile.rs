//! User profile record.
//!
//! One document per account in the `users` collection, keyed by the
//! provider-issued user id. Created at sign-up, self-healed with a default
//! document if a later operation finds it missing.
//!
//! # Mutation model
//!
//! Profiles are read back as typed records but mutated through field patches
//! (set, increment, set-union), matching the hosted backend's partial-update
//! contract. This struct therefore carries validated constructors and read
//! behavior, not in-place mutators.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    EmailAddress, QuestionId, Timestamp, UserId, ValidationError,
};

/// Role assigned to every new account.
pub const DEFAULT_ROLE: &str = "student";

fn default_role() -> String {
    DEFAULT_ROLE.to_string()
}

/// College affiliation recorded on every profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollegeAffiliation {
    /// Institution name, e.g. "State College".
    name: String,

    /// Email domain the institution issues addresses under.
    email_domain: String,
}

impl CollegeAffiliation {
    /// Creates a new affiliation record.
    pub fn new(name: impl Into<String>, email_domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email_domain: email_domain.into(),
        }
    }

    /// Returns the institution name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the institutional email domain.
    pub fn email_domain(&self) -> &str {
        &self.email_domain
    }
}

/// User profile record.
///
/// # Invariants
///
/// - `user_id` matches the document id in the `users` collection
/// - `upvoted_questions` contains no duplicates (set-union writes)
/// - counters never go below zero
///
/// Fields written by older clients may be absent; counters, flags, and the
/// membership set decode to empty/zero defaults rather than failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Provider-issued account id.
    user_id: UserId,

    /// Given name from the sign-up form (may be empty on healed documents).
    #[serde(default)]
    first_name: String,

    /// Family name from the sign-up form (may be empty on healed documents).
    #[serde(default)]
    last_name: String,

    /// Email the account was registered with.
    email: EmailAddress,

    /// Whether the email has been confirmed.
    #[serde(default)]
    verified: bool,

    /// Role tag, currently always "student".
    #[serde(default = "default_role")]
    role: String,

    /// Institutional affiliation.
    college: CollegeAffiliation,

    /// Number of questions this user has created.
    #[serde(default)]
    questions_asked: u32,

    /// Number of answers this user has written, minus deletions.
    #[serde(default)]
    answers_given: u32,

    /// Question ids this user has upvoted.
    #[serde(default)]
    upvoted_questions: Vec<QuestionId>,

    /// When the profile document was first written.
    created_at: Timestamp,

    /// Last successful login, if any.
    #[serde(default)]
    last_login: Option<Timestamp>,

    /// Last recorded activity, if any.
    #[serde(default)]
    last_active: Option<Timestamp>,
}

impl UserProfile {
    /// Creates the initial unverified profile written at sign-up.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if either name is blank
    pub fn new(
        user_id: UserId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: EmailAddress,
        college: CollegeAffiliation,
    ) -> Result<Self, ValidationError> {
        let first_name = first_name.into().trim().to_string();
        let last_name = last_name.into().trim().to_string();
        if first_name.is_empty() {
            return Err(ValidationError::empty_field("first_name"));
        }
        if last_name.is_empty() {
            return Err(ValidationError::empty_field("last_name"));
        }

        Ok(Self {
            user_id,
            first_name,
            last_name,
            email,
            verified: false,
            role: default_role(),
            college,
            questions_asked: 0,
            answers_given: 0,
            upvoted_questions: Vec::new(),
            created_at: Timestamp::now(),
            last_login: None,
            last_active: None,
        })
    }

    /// Creates the default document used to self-heal a missing profile.
    ///
    /// Names are left empty; display falls back to the email address.
    pub fn default_for(user_id: UserId, email: EmailAddress, college: CollegeAffiliation) -> Self {
        Self {
            user_id,
            first_name: String::new(),
            last_name: String::new(),
            email,
            verified: false,
            role: default_role(),
            college,
            questions_asked: 0,
            answers_given: 0,
            upvoted_questions: Vec::new(),
            created_at: Timestamp::now(),
            last_login: None,
            last_active: None,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the account id.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns the given name.
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    /// Returns the family name.
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// Returns the registered email.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Returns whether the email has been confirmed.
    pub fn verified(&self) -> bool {
        self.verified
    }

    /// Returns the role tag.
    pub fn role(&self) -> &str {
        &self.role
    }

    /// Returns the institutional affiliation.
    pub fn college(&self) -> &CollegeAffiliation {
        &self.college
    }

    /// Returns how many questions this user has created.
    pub fn questions_asked(&self) -> u32 {
        self.questions_asked
    }

    /// Returns how many answers this user currently has.
    pub fn answers_given(&self) -> u32 {
        self.answers_given
    }

    /// Returns the upvote membership set.
    pub fn upvoted_questions(&self) -> &[QuestionId] {
        &self.upvoted_questions
    }

    /// Returns when the profile was created.
    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    /// Returns the last login time, if any.
    pub fn last_login(&self) -> Option<&Timestamp> {
        self.last_login.as_ref()
    }

    /// Returns the last recorded activity time, if any.
    pub fn last_active(&self) -> Option<&Timestamp> {
        self.last_active.as_ref()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Behavior
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the composed display name, or None when both names are empty.
    pub fn display_name(&self) -> Option<String> {
        let name = format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string();
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }

    /// Checks whether this user has already upvoted the given question.
    pub fn has_upvoted(&self, question_id: &QuestionId) -> bool {
        self.upvoted_questions.contains(question_id)
    }
}
