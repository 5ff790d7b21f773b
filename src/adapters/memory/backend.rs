//! In-Memory Backend Adapter
//!
//! Emulates the hosted identity-and-document service in process memory,
//! with the same observable semantics as the REST adapter: provider error
//! codes, sign-in lockout, atomic field patches, and filtered/ordered
//! queries. Useful for testing and development.
//!
//! Failure injection switches let tests exercise the error paths that a
//! live backend only produces under outages.

use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::foundation::{EmailAddress, UserId};
use crate::domain::session::SessionToken;
use crate::ports::{
    Direction, DocumentStore, FieldUpdate, IdentityError, IdentityProvider, Password,
    ProviderSession, Query, StoreError,
};

/// Consecutive failed sign-ins after which the emulator rate limits.
pub const MAX_FAILED_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone)]
struct AccountRecord {
    user_id: String,
    password: String,
    email_verified: bool,
    disabled: bool,
    failed_attempts: u32,
}

/// In-memory emulation of both hosted backend ports.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    /// Credential records keyed by email.
    accounts: Arc<RwLock<HashMap<String, AccountRecord>>>,

    /// Live session tokens, mapped to the owning email.
    tokens: Arc<RwLock<HashMap<String, String>>>,

    /// Document collections: collection name -> id -> document.
    collections: Arc<RwLock<HashMap<String, HashMap<String, Value>>>>,

    /// Addresses verification emails were dispatched to.
    verification_emails: Arc<RwLock<Vec<String>>>,

    /// When set, every identity operation fails with this error.
    identity_failure: Arc<RwLock<Option<IdentityError>>>,

    /// Collections whose writes fail with `StoreError::Unavailable`.
    failing_collections: Arc<RwLock<HashSet<String>>>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a credential directly, bypassing the sign-up flow.
    ///
    /// Returns the generated provider user id. No profile document is
    /// written, so this is the way to stage an account whose profile is
    /// missing or managed elsewhere.
    pub async fn register_account(&self, email: &str, password: &str) -> String {
        let user_id = Uuid::new_v4().to_string();
        self.accounts.write().await.insert(
            email.to_lowercase(),
            AccountRecord {
                user_id: user_id.clone(),
                password: password.to_string(),
                email_verified: false,
                disabled: false,
                failed_attempts: 0,
            },
        );
        user_id
    }

    /// Makes every identity operation fail with the given error.
    pub async fn fail_identity_with(&self, error: IdentityError) {
        *self.identity_failure.write().await = Some(error);
    }

    /// Makes writes to one collection fail with `StoreError::Unavailable`.
    pub async fn fail_writes_to(&self, collection: &str) {
        self.failing_collections
            .write()
            .await
            .insert(collection.to_string());
    }

    /// Clears all injected failures.
    pub async fn reset_failures(&self) {
        *self.identity_failure.write().await = None;
        self.failing_collections.write().await.clear();
    }

    /// Marks an account's email as verified, as if the link were clicked.
    pub async fn verify_email(&self, email: &str) {
        if let Some(account) = self.accounts.write().await.get_mut(&email.to_lowercase()) {
            account.email_verified = true;
        }
    }

    /// Administratively disables an account.
    pub async fn disable_account(&self, email: &str) {
        if let Some(account) = self.accounts.write().await.get_mut(&email.to_lowercase()) {
            account.disabled = true;
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Test inspection helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns one document, if present.
    pub async fn document(&self, collection: &str, id: &str) -> Option<Value> {
        self.collections
            .read()
            .await
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned()
    }

    /// Returns the number of documents in a collection.
    pub async fn collection_size(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map(|docs| docs.len())
            .unwrap_or(0)
    }

    /// Returns the number of registered credentials.
    pub async fn account_count(&self) -> usize {
        self.accounts.read().await.len()
    }

    /// Returns the number of live session tokens.
    pub async fn token_count(&self) -> usize {
        self.tokens.read().await.len()
    }

    /// Checks whether a verification email was dispatched to an address.
    pub async fn verification_sent_to(&self, email: &str) -> bool {
        self.verification_emails
            .read()
            .await
            .iter()
            .any(|sent| sent == &email.to_lowercase())
    }

    /// Clears all stored data (useful for tests).
    pub async fn clear(&self) {
        self.accounts.write().await.clear();
        self.tokens.write().await.clear();
        self.collections.write().await.clear();
        self.verification_emails.write().await.clear();
        self.reset_failures().await;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Private helpers
    // ─────────────────────────────────────────────────────────────────────────

    async fn check_identity_failure(&self) -> Result<(), IdentityError> {
        match &*self.identity_failure.read().await {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    async fn check_write_allowed(&self, collection: &str) -> Result<(), StoreError> {
        if self.failing_collections.read().await.contains(collection) {
            return Err(StoreError::unavailable(format!(
                "injected write failure for '{}'",
                collection
            )));
        }
        Ok(())
    }

    async fn issue_token(&self, email: &str) -> SessionToken {
        let raw = Uuid::new_v4().to_string();
        self.tokens
            .write()
            .await
            .insert(raw.clone(), email.to_string());
        SessionToken::new(raw)
    }
}

#[async_trait]
impl IdentityProvider for MemoryBackend {
    async fn sign_up(
        &self,
        email: &EmailAddress,
        password: &Password,
    ) -> Result<ProviderSession, IdentityError> {
        self.check_identity_failure().await?;

        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(email.as_str()) {
            return Err(IdentityError::EmailInUse);
        }

        let user_id = Uuid::new_v4().to_string();
        accounts.insert(
            email.as_str().to_string(),
            AccountRecord {
                user_id: user_id.clone(),
                password: password.expose().to_string(),
                email_verified: false,
                disabled: false,
                failed_attempts: 0,
            },
        );
        drop(accounts);

        let token = self.issue_token(email.as_str()).await;
        Ok(ProviderSession {
            user_id: UserId::new(user_id)
                .map_err(|e| IdentityError::unavailable(e.to_string()))?,
            token,
            email_verified: false,
        })
    }

    async fn sign_in(
        &self,
        email: &EmailAddress,
        password: &Password,
    ) -> Result<ProviderSession, IdentityError> {
        self.check_identity_failure().await?;

        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(email.as_str())
            .ok_or(IdentityError::InvalidCredentials)?;

        if account.disabled {
            return Err(IdentityError::AccountDisabled);
        }
        if account.failed_attempts >= MAX_FAILED_ATTEMPTS {
            return Err(IdentityError::TooManyAttempts);
        }
        if account.password != password.expose() {
            account.failed_attempts += 1;
            return Err(IdentityError::InvalidCredentials);
        }

        account.failed_attempts = 0;
        let user_id = account.user_id.clone();
        let email_verified = account.email_verified;
        drop(accounts);

        let token = self.issue_token(email.as_str()).await;
        Ok(ProviderSession {
            user_id: UserId::new(user_id)
                .map_err(|e| IdentityError::unavailable(e.to_string()))?,
            token,
            email_verified,
        })
    }

    async fn sign_out(&self, token: &SessionToken) -> Result<(), IdentityError> {
        self.check_identity_failure().await?;

        self.tokens.write().await.remove(token.expose());
        Ok(())
    }

    async fn send_verification_email(&self, token: &SessionToken) -> Result<(), IdentityError> {
        self.check_identity_failure().await?;

        let email = self
            .tokens
            .read()
            .await
            .get(token.expose())
            .cloned()
            .ok_or(IdentityError::TokenRejected)?;

        self.verification_emails.write().await.push(email);
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryBackend {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn put(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError> {
        self.check_write_allowed(collection).await?;
        if !document.is_object() {
            return Err(StoreError::serialization("document must be a JSON object"));
        }

        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), document);
        Ok(())
    }

    async fn create(&self, collection: &str, document: Value) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        self.put(collection, &id, document).await?;
        Ok(id)
    }

    async fn patch(
        &self,
        collection: &str,
        id: &str,
        updates: Vec<FieldUpdate>,
    ) -> Result<(), StoreError> {
        self.check_write_allowed(collection).await?;

        let mut collections = self.collections.write().await;
        let document = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        let fields = document
            .as_object_mut()
            .ok_or_else(|| StoreError::serialization("document must be a JSON object"))?;

        for update in updates {
            match update {
                FieldUpdate::Set { field, value } => {
                    fields.insert(field, value);
                }
                FieldUpdate::Increment { field, delta } => {
                    let current = fields.get(&field).and_then(Value::as_i64).unwrap_or(0);
                    fields.insert(field, Value::from(current + delta));
                }
                FieldUpdate::ArrayUnion { field, values } => {
                    let entry = fields
                        .entry(field)
                        .or_insert_with(|| Value::Array(Vec::new()));
                    let array = entry.as_array_mut().ok_or_else(|| {
                        StoreError::serialization("set-union target is not an array")
                    })?;
                    for value in values {
                        if !array.contains(&value) {
                            array.push(value);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.check_write_allowed(collection).await?;

        if let Some(docs) = self.collections.write().await.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn query(&self, query: Query) -> Result<Vec<(String, Value)>, StoreError> {
        let collections = self.collections.read().await;
        let docs = match collections.get(&query.collection) {
            Some(docs) => docs,
            None => return Ok(Vec::new()),
        };

        let mut results: Vec<(String, Value)> = docs
            .iter()
            .filter(|(_, doc)| match &query.filter {
                Some((field, value)) => doc.get(field) == Some(value),
                None => true,
            })
            .map(|(id, doc)| (id.clone(), doc.clone()))
            .collect();

        if let Some((field, direction)) = &query.order_by {
            results.sort_by(|(_, a), (_, b)| {
                let ordering = compare_fields(a.get(field), b.get(field));
                match direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                }
            });
        }

        Ok(results)
    }
}

/// Field comparison for order-by: strings lexicographic (RFC 3339 timestamps
/// sort correctly this way), numbers numeric, missing fields first.
fn compare_fields(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}
