//! Email address value object.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Validated email address, stored lowercased.
///
/// Lowercasing happens at construction so that authorship and membership
/// comparisons never depend on the casing a user typed at login.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a new EmailAddress, validating basic shape.
    ///
    /// Accepts `local@domain` where both parts are non-empty and the domain
    /// contains at least one dot. Full RFC validation is the identity
    /// provider's job.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into().trim().to_lowercase();
        if value.is_empty() {
            return Err(ValidationError::empty_field("email"));
        }
        let (local, domain) = value
            .split_once('@')
            .ok_or_else(|| ValidationError::invalid_format("email", "missing @ symbol"))?;
        if local.is_empty() {
            return Err(ValidationError::invalid_format("email", "empty local part"));
        }
        if domain.is_empty() || !domain.contains('.') || domain.contains('@') {
            return Err(ValidationError::invalid_format("email", "invalid domain"));
        }
        Ok(Self(value))
    }

    /// Returns the full address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the domain part (everything after the `@`).
    pub fn domain(&self) -> &str {
        // Constructor guarantees exactly one '@' with a non-empty tail.
        self.0.split_once('@').map(|(_, d)| d).unwrap_or("")
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EmailAddress {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
