//! Document store port for the hosted backend's persistence contract.
//!
//! Documents live in named collections keyed by string ids and are plain
//! JSON objects on the wire. The contract deliberately mirrors what the
//! hosted service offers: whole-document reads and writes, field-level
//! patches with atomic increment and set-union append, and queries with at
//! most one equality filter and one order-by field. There are no
//! transactions; multi-document operations are sequential writes.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors surfaced by document store implementations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The addressed document does not exist.
    #[error("Document {collection}/{id} not found")]
    NotFound { collection: String, id: String },

    /// A document could not be encoded or decoded.
    #[error("Document serialization failed: {0}")]
    Serialization(String),

    /// The backend is unreachable or failing.
    #[error("Document store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Creates a not found error.
    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Creates a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// Creates an unavailable error with a message.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Returns true if the addressed document was missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// Returns true if this is a transient error that may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// One field-level mutation inside a patch.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    /// Overwrite a single field.
    Set { field: String, value: Value },

    /// Atomically add `delta` to a numeric field, treating absent as 0.
    Increment { field: String, delta: i64 },

    /// Atomically append values absent from an array field, treating absent
    /// as empty. Presence is JSON equality.
    ArrayUnion { field: String, values: Vec<Value> },
}

impl FieldUpdate {
    /// Creates a field overwrite.
    pub fn set(field: impl Into<String>, value: Value) -> Self {
        Self::Set {
            field: field.into(),
            value,
        }
    }

    /// Creates an atomic increment.
    pub fn increment(field: impl Into<String>, delta: i64) -> Self {
        Self::Increment {
            field: field.into(),
            delta,
        }
    }

    /// Creates an atomic set-union append.
    pub fn array_union(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self::ArrayUnion {
            field: field.into(),
            values,
        }
    }
}

/// Sort direction for a query's order-by field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// A collection query: at most one equality filter, one order-by.
#[derive(Debug, Clone)]
pub struct Query {
    /// Collection to search.
    pub collection: String,

    /// Optional equality filter on a top-level field.
    pub filter: Option<(String, Value)>,

    /// Optional order-by on a top-level field.
    pub order_by: Option<(String, Direction)>,
}

impl Query {
    /// Creates an unfiltered query over a collection.
    pub fn collection(name: impl Into<String>) -> Self {
        Self {
            collection: name.into(),
            filter: None,
            order_by: None,
        }
    }

    /// Restricts results to documents whose `field` equals `value`.
    pub fn where_eq(mut self, field: impl Into<String>, value: Value) -> Self {
        self.filter = Some((field.into(), value));
        self
    }

    /// Orders results by `field`, descending.
    pub fn order_by_desc(mut self, field: impl Into<String>) -> Self {
        self.order_by = Some((field.into(), Direction::Descending));
        self
    }

    /// Orders results by `field`, ascending.
    pub fn order_by_asc(mut self, field: impl Into<String>) -> Self {
        self.order_by = Some((field.into(), Direction::Ascending));
        self
    }
}

/// Document persistence operations against the hosted backend.
///
/// # Contract
///
/// Implementations must:
/// - Return `Ok(None)` from `get` for a missing document, never an error
/// - Treat `put` as create-or-replace and `delete` as idempotent
/// - Return `StoreError::NotFound` from `patch` when the document is missing
/// - Generate the id and return it from `create`
/// - Return `StoreError::Unavailable` for transient failures
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Reads one document, `None` when absent.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;

    /// Creates or replaces one document.
    async fn put(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError>;

    /// Creates a document under a generated id, returning the id.
    async fn create(&self, collection: &str, document: Value) -> Result<String, StoreError>;

    /// Applies field updates to an existing document.
    async fn patch(
        &self,
        collection: &str,
        id: &str,
        updates: Vec<FieldUpdate>,
    ) -> Result<(), StoreError>;

    /// Deletes one document; succeeds when already absent.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// Runs a filtered/ordered query, returning (id, document) pairs.
    async fn query(&self, query: Query) -> Result<Vec<(String, Value)>, StoreError>;
}
