//! Category registry document.
//!
//! A single document (`meta/categories`) holding every distinct category
//! string ever used on a question. Updated opportunistically when a question
//! introduces a new category; never pruned.

use serde::{Deserialize, Serialize};

/// The deduplicated set of known categories.
///
/// Stored as an array because the backend's set-union append keeps it
/// duplicate-free on the wire; order is insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRegistry {
    #[serde(default)]
    categories: Vec<String>,
}

impl CategoryRegistry {
    /// Creates an empty registry.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the categories in insertion order.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Checks whether a category is already registered.
    pub fn contains(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }

    /// Adds a category, returning false when it was already present.
    pub fn add(&mut self, category: impl Into<String>) -> bool {
        let category = category.into();
        if self.contains(&category) {
            return false;
        }
        self.categories.push(category);
        true
    }

    /// Returns the number of registered categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Returns true when no categories are registered.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
