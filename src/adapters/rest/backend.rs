//! REST adapter for the hosted identity and document service.
//!
//! This adapter implements the `IdentityProvider` and `DocumentStore` ports
//! against the service's REST dialect:
//!
//! 1. Identity operations POST to `{base}/v1/accounts:{operation}`
//! 2. Documents live under `{base}/v1/projects/{project}/documents/{collection}/{id}`
//! 3. Field patches and queries POST structured JSON bodies
//! 4. Provider error codes in the response envelope map to port errors
//!
//! Every request carries the project API key as a query parameter. The key
//! is held as a `SecretString` and never appears in `Debug` output.
//!
//! # Example
//!
//! ```ignore
//! use doubt_solver::adapters::rest::{RestBackend, RestBackendConfig};
//!
//! let config = RestBackendConfig::new(
//!     "https://backend.example.com",
//!     "doubtsolver-prod",
//!     api_key,
//! );
//! let backend = RestBackend::new(config);
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::foundation::{EmailAddress, UserId};
use crate::domain::session::SessionToken;
use crate::ports::{
    Direction, DocumentStore, FieldUpdate, IdentityError, IdentityProvider, Password,
    ProviderSession, Query, StoreError,
};

/// Configuration for the REST backend adapter.
#[derive(Clone)]
pub struct RestBackendConfig {
    /// Service origin (e.g., "https://backend.example.com").
    pub base_url: String,

    /// Project whose accounts and documents this deployment uses.
    pub project_id: String,

    /// API key sent with every request.
    pub api_key: SecretString,

    /// Optional request timeout. Defaults to 10 seconds.
    pub request_timeout: Option<Duration>,
}

impl RestBackendConfig {
    /// Create a new configuration with required fields.
    pub fn new(
        base_url: impl Into<String>,
        project_id: impl Into<String>,
        api_key: SecretString,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            project_id: project_id.into(),
            api_key,
            request_timeout: None,
        }
    }

    /// Set a custom request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// URL for an identity operation such as `signUp`.
    fn identity_url(&self, operation: &str) -> String {
        format!(
            "{}/v1/accounts:{}",
            self.base_url.trim_end_matches('/'),
            operation
        )
    }

    /// URL for a document collection.
    fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}/v1/projects/{}/documents/{}",
            self.base_url.trim_end_matches('/'),
            self.project_id,
            collection
        )
    }

    /// URL for a single document.
    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}", self.collection_url(collection), id)
    }

    /// URL for a structured query over a collection.
    fn query_url(&self, collection: &str) -> String {
        format!("{}:query", self.collection_url(collection))
    }
}

impl std::fmt::Debug for RestBackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestBackendConfig")
            .field("base_url", &self.base_url)
            .field("project_id", &self.project_id)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

/// Request body for credential-based identity operations.
#[derive(Debug, Serialize)]
struct CredentialsBody<'a> {
    email: &'a str,
    password: &'a str,
}

/// Request body for token-based identity operations.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenBody<'a> {
    id_token: &'a str,
}

/// Successful response from `signUp` and `signInWithPassword`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionBody {
    user_id: String,
    id_token: String,
    #[serde(default)]
    email_verified: bool,
}

/// Error envelope returned by every endpoint on failure.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Response from creating a document with a generated id.
#[derive(Debug, Deserialize)]
struct CreatedBody {
    id: String,
}

/// One field operation inside a PATCH body.
#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
enum UpdateOp {
    Set { field: String, value: Value },
    Increment { field: String, delta: i64 },
    ArrayUnion { field: String, values: Vec<Value> },
}

impl From<FieldUpdate> for UpdateOp {
    fn from(update: FieldUpdate) -> Self {
        match update {
            FieldUpdate::Set { field, value } => UpdateOp::Set { field, value },
            FieldUpdate::Increment { field, delta } => UpdateOp::Increment { field, delta },
            FieldUpdate::ArrayUnion { field, values } => UpdateOp::ArrayUnion { field, values },
        }
    }
}

#[derive(Debug, Serialize)]
struct PatchBody {
    updates: Vec<UpdateOp>,
}

/// Structured query body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<FilterBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    order_by: Option<OrderBody>,
}

#[derive(Debug, Serialize)]
struct FilterBody {
    field: String,
    equals: Value,
}

#[derive(Debug, Serialize)]
struct OrderBody {
    field: String,
    direction: &'static str,
}

impl QueryBody {
    fn from_query(query: &Query) -> Self {
        Self {
            filter: query.filter.clone().map(|(field, equals)| FilterBody {
                field,
                equals,
            }),
            order_by: query.order_by.clone().map(|(field, direction)| OrderBody {
                field,
                direction: match direction {
                    Direction::Ascending => "ASCENDING",
                    Direction::Descending => "DESCENDING",
                },
            }),
        }
    }
}

/// Query response: matching documents with their ids.
#[derive(Debug, Deserialize)]
struct QueryResults {
    #[serde(default)]
    documents: Vec<QueryHit>,
}

#[derive(Debug, Deserialize)]
struct QueryHit {
    id: String,
    document: Value,
}

// ─────────────────────────────────────────────────────────────────────────────
// Error mapping
// ─────────────────────────────────────────────────────────────────────────────

/// Maps a provider error code to a port error.
fn map_identity_code(code: &str) -> IdentityError {
    match code {
        "EMAIL_EXISTS" => IdentityError::EmailInUse,
        "INVALID_PASSWORD" | "EMAIL_NOT_FOUND" | "INVALID_LOGIN_CREDENTIALS" => {
            IdentityError::InvalidCredentials
        }
        "USER_DISABLED" => IdentityError::AccountDisabled,
        "INVALID_ID_TOKEN" | "TOKEN_EXPIRED" => IdentityError::TokenRejected,
        code if code.starts_with("TOO_MANY_ATTEMPTS") => IdentityError::TooManyAttempts,
        other => IdentityError::unavailable(format!("identity endpoint rejected request: {}", other)),
    }
}

/// REST implementation of the hosted backend ports.
///
/// This is the production implementation of `IdentityProvider` and
/// `DocumentStore`.
pub struct RestBackend {
    config: RestBackendConfig,
    http_client: reqwest::Client,
}

impl RestBackend {
    /// Create a new REST backend.
    ///
    /// Builds the HTTP client eagerly; no network traffic happens until the
    /// first operation.
    pub fn new(config: RestBackendConfig) -> Self {
        let timeout = config.request_timeout.unwrap_or(Duration::from_secs(10));
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            http_client,
        }
    }

    fn keyed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.query(&[("key", self.config.api_key.expose_secret().as_str())])
    }

    async fn identity_post<B: Serialize>(
        &self,
        operation: &str,
        body: &B,
    ) -> Result<reqwest::Response, IdentityError> {
        let url = self.config.identity_url(operation);

        tracing::debug!("Calling identity operation {}", operation);

        self.keyed(self.http_client.post(&url))
            .json(body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Identity request failed: {}", e);
                IdentityError::unavailable(format!("identity request failed: {}", e))
            })
    }

    /// Extracts the provider error code from a failed identity response.
    async fn identity_error(response: reqwest::Response) -> IdentityError {
        let status = response.status();
        match response.json::<ErrorEnvelope>().await {
            Ok(envelope) => map_identity_code(&envelope.error.message),
            Err(_) => {
                tracing::error!("Identity endpoint returned {} without an error body", status);
                IdentityError::unavailable(format!("identity endpoint returned {}", status))
            }
        }
    }

    async fn read_session(response: reqwest::Response) -> Result<ProviderSession, IdentityError> {
        let body: SessionBody = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse identity response: {}", e);
            IdentityError::unavailable(format!("malformed identity response: {}", e))
        })?;

        let user_id = UserId::new(&body.user_id).map_err(|_| {
            tracing::warn!("Identity response carried an empty user id");
            IdentityError::unavailable("identity response carried an empty user id")
        })?;

        Ok(ProviderSession {
            user_id,
            token: SessionToken::new(body.id_token),
            email_verified: body.email_verified,
        })
    }

    async fn send_document_request(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, StoreError> {
        self.keyed(request).send().await.map_err(|e| {
            tracing::error!("Document request failed: {}", e);
            StoreError::unavailable(format!("document request failed: {}", e))
        })
    }

    /// Extracts a failure message from a failed document response.
    async fn store_error(response: reqwest::Response) -> StoreError {
        let status = response.status();
        let message = match response.json::<ErrorEnvelope>().await {
            Ok(envelope) => envelope.error.message,
            Err(_) => status.to_string(),
        };
        tracing::error!("Document endpoint returned {}: {}", status, message);
        StoreError::unavailable(format!("document endpoint returned {}: {}", status, message))
    }
}

#[async_trait]
impl IdentityProvider for RestBackend {
    async fn sign_up(
        &self,
        email: &EmailAddress,
        password: &Password,
    ) -> Result<ProviderSession, IdentityError> {
        let body = CredentialsBody {
            email: email.as_str(),
            password: password.expose(),
        };
        let response = self.identity_post("signUp", &body).await?;

        if !response.status().is_success() {
            return Err(Self::identity_error(response).await);
        }
        Self::read_session(response).await
    }

    async fn sign_in(
        &self,
        email: &EmailAddress,
        password: &Password,
    ) -> Result<ProviderSession, IdentityError> {
        let body = CredentialsBody {
            email: email.as_str(),
            password: password.expose(),
        };
        let response = self.identity_post("signInWithPassword", &body).await?;

        if !response.status().is_success() {
            return Err(Self::identity_error(response).await);
        }
        Self::read_session(response).await
    }

    async fn sign_out(&self, token: &SessionToken) -> Result<(), IdentityError> {
        let body = TokenBody {
            id_token: token.expose(),
        };
        let response = self.identity_post("signOut", &body).await?;

        if !response.status().is_success() {
            return Err(Self::identity_error(response).await);
        }
        Ok(())
    }

    async fn send_verification_email(&self, token: &SessionToken) -> Result<(), IdentityError> {
        let body = TokenBody {
            id_token: token.expose(),
        };
        let response = self.identity_post("sendVerificationEmail", &body).await?;

        if !response.status().is_success() {
            return Err(Self::identity_error(response).await);
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for RestBackend {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let url = self.config.document_url(collection, id);
        let response = self
            .send_document_request(self.http_client.get(&url))
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let document = response.json().await.map_err(|e| {
                    StoreError::serialization(format!("malformed document body: {}", e))
                })?;
                Ok(Some(document))
            }
            _ => Err(Self::store_error(response).await),
        }
    }

    async fn put(&self, collection: &str, id: &str, document: Value) -> Result<(), StoreError> {
        let url = self.config.document_url(collection, id);
        let response = self
            .send_document_request(self.http_client.put(&url).json(&document))
            .await?;

        if !response.status().is_success() {
            return Err(Self::store_error(response).await);
        }
        Ok(())
    }

    async fn create(&self, collection: &str, document: Value) -> Result<String, StoreError> {
        let url = self.config.collection_url(collection);
        let response = self
            .send_document_request(self.http_client.post(&url).json(&document))
            .await?;

        if !response.status().is_success() {
            return Err(Self::store_error(response).await);
        }

        let created: CreatedBody = response.json().await.map_err(|e| {
            StoreError::serialization(format!("malformed create response: {}", e))
        })?;
        Ok(created.id)
    }

    async fn patch(
        &self,
        collection: &str,
        id: &str,
        updates: Vec<FieldUpdate>,
    ) -> Result<(), StoreError> {
        let url = self.config.document_url(collection, id);
        let body = PatchBody {
            updates: updates.into_iter().map(UpdateOp::from).collect(),
        };
        let response = self
            .send_document_request(self.http_client.patch(&url).json(&body))
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(StoreError::not_found(collection, id)),
            status if status.is_success() => Ok(()),
            _ => Err(Self::store_error(response).await),
        }
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let url = self.config.document_url(collection, id);
        let response = self
            .send_document_request(self.http_client.delete(&url))
            .await?;

        // Deleting an absent document is a no-op, not an error.
        match response.status() {
            StatusCode::NOT_FOUND => Ok(()),
            status if status.is_success() => Ok(()),
            _ => Err(Self::store_error(response).await),
        }
    }

    async fn query(&self, query: Query) -> Result<Vec<(String, Value)>, StoreError> {
        let url = self.config.query_url(&query.collection);
        let body = QueryBody::from_query(&query);
        let response = self
            .send_document_request(self.http_client.post(&url).json(&body))
            .await?;

        if !response.status().is_success() {
            return Err(Self::store_error(response).await);
        }

        let results: QueryResults = response.json().await.map_err(|e| {
            StoreError::serialization(format!("malformed query response: {}", e))
        })?;
        Ok(results
            .documents
            .into_iter()
            .map(|hit| (hit.id, hit.document))
            .collect())
    }
}

impl std::fmt::Debug for RestBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestBackend")
            .field("base_url", &self.config.base_url)
            .field("project_id", &self.config.project_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_config() -> RestBackendConfig {
        RestBackendConfig::new(
            "https://backend.example.com",
            "doubtsolver-test",
            SecretString::new("test-api-key".to_string()),
        )
    }

    // ════════════════════════════════════════════════════════════════════════
    // Configuration Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn config_builds_identity_urls() {
        let config = test_config();
        assert_eq!(
            config.identity_url("signUp"),
            "https://backend.example.com/v1/accounts:signUp"
        );
    }

    #[test]
    fn config_handles_trailing_slash() {
        let config = RestBackendConfig::new(
            "https://backend.example.com/",
            "doubtsolver-test",
            SecretString::new("k".to_string()),
        );
        assert_eq!(
            config.document_url("questions", "q-1"),
            "https://backend.example.com/v1/projects/doubtsolver-test/documents/questions/q-1"
        );
    }

    #[test]
    fn config_builds_query_url() {
        let config = test_config();
        assert_eq!(
            config.query_url("questions"),
            "https://backend.example.com/v1/projects/doubtsolver-test/documents/questions:query"
        );
    }

    #[test]
    fn config_with_custom_timeout() {
        let config = test_config().with_timeout(Duration::from_secs(3));
        assert_eq!(config.request_timeout, Some(Duration::from_secs(3)));
    }

    #[test]
    fn debug_output_hides_api_key() {
        let backend = RestBackend::new(test_config());
        let rendered = format!("{:?}", backend);
        assert!(!rendered.contains("test-api-key"));
    }

    // ════════════════════════════════════════════════════════════════════════
    // Error Mapping Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn identity_codes_map_to_port_errors() {
        assert!(matches!(
            map_identity_code("EMAIL_EXISTS"),
            IdentityError::EmailInUse
        ));
        assert!(matches!(
            map_identity_code("INVALID_PASSWORD"),
            IdentityError::InvalidCredentials
        ));
        assert!(matches!(
            map_identity_code("EMAIL_NOT_FOUND"),
            IdentityError::InvalidCredentials
        ));
        assert!(matches!(
            map_identity_code("USER_DISABLED"),
            IdentityError::AccountDisabled
        ));
        assert!(matches!(
            map_identity_code("TOO_MANY_ATTEMPTS_TRY_LATER"),
            IdentityError::TooManyAttempts
        ));
        assert!(matches!(
            map_identity_code("INVALID_ID_TOKEN"),
            IdentityError::TokenRejected
        ));
    }

    #[test]
    fn unknown_identity_code_maps_to_unavailable() {
        let error = map_identity_code("SOMETHING_NEW");
        assert!(matches!(error, IdentityError::Unavailable(_)));
    }

    #[test]
    fn error_envelope_parses() {
        let envelope: ErrorEnvelope =
            serde_json::from_value(json!({ "error": { "message": "EMAIL_EXISTS" } })).unwrap();
        assert_eq!(envelope.error.message, "EMAIL_EXISTS");
    }

    // ════════════════════════════════════════════════════════════════════════
    // Wire Format Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn session_body_parses_with_defaulted_verified_flag() {
        let body: SessionBody = serde_json::from_value(json!({
            "userId": "uid-123",
            "idToken": "tok-abc"
        }))
        .unwrap();

        assert_eq!(body.user_id, "uid-123");
        assert!(!body.email_verified);
    }

    #[test]
    fn patch_body_serializes_tagged_operations() {
        let body = PatchBody {
            updates: vec![
                UpdateOp::from(FieldUpdate::set("verified", json!(true))),
                UpdateOp::from(FieldUpdate::increment("upvotes", 1)),
                UpdateOp::from(FieldUpdate::array_union("categories", vec![json!("dbms")])),
            ],
        };

        let rendered = serde_json::to_value(&body).unwrap();
        assert_eq!(
            rendered,
            json!({
                "updates": [
                    { "op": "set", "field": "verified", "value": true },
                    { "op": "increment", "field": "upvotes", "delta": 1 },
                    { "op": "arrayUnion", "field": "categories", "values": ["dbms"] }
                ]
            })
        );
    }

    #[test]
    fn query_body_serializes_filter_and_order() {
        let query = Query::collection("questions")
            .where_eq("ownerId", json!("uid-123"))
            .order_by_desc("createdAt");

        let rendered = serde_json::to_value(QueryBody::from_query(&query)).unwrap();
        assert_eq!(
            rendered,
            json!({
                "filter": { "field": "ownerId", "equals": "uid-123" },
                "orderBy": { "field": "createdAt", "direction": "DESCENDING" }
            })
        );
    }

    #[test]
    fn query_body_omits_absent_clauses() {
        let query = Query::collection("questions");
        let rendered = serde_json::to_value(QueryBody::from_query(&query)).unwrap();
        assert_eq!(rendered, json!({}));
    }

    #[test]
    fn query_results_parse_with_missing_documents_field() {
        let results: QueryResults = serde_json::from_value(json!({})).unwrap();
        assert!(results.documents.is_empty());

        let results: QueryResults = serde_json::from_value(json!({
            "documents": [ { "id": "q-1", "document": { "title": "Why?" } } ]
        }))
        .unwrap();
        assert_eq!(results.documents.len(), 1);
        assert_eq!(results.documents[0].id, "q-1");
    }

    // ════════════════════════════════════════════════════════════════════════
    // Type Safety Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn rest_backend_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RestBackend>();
    }

    // ════════════════════════════════════════════════════════════════════════
    // Integration Tests (require network, marked ignore)
    // ════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    #[ignore = "Requires a live backend project"]
    async fn integration_test_document_roundtrip() {
        // Set DOUBTSOLVER__BACKEND__BASE_URL and DOUBTSOLVER__BACKEND__API_KEY
        // to run against a real project.
        let base_url = std::env::var("DOUBTSOLVER__BACKEND__BASE_URL")
            .unwrap_or_else(|_| "https://backend.example.com".to_string());
        let api_key = std::env::var("DOUBTSOLVER__BACKEND__API_KEY").unwrap_or_default();

        let config = RestBackendConfig::new(base_url, "doubtsolver-test", SecretString::new(api_key));
        let backend = RestBackend::new(config);

        backend
            .put("questions", "smoke-test", json!({ "title": "smoke" }))
            .await
            .unwrap();
        let fetched = backend.get("questions", "smoke-test").await.unwrap();
        assert_eq!(fetched, Some(json!({ "title": "smoke" })));

        backend.delete("questions", "smoke-test").await.unwrap();
    }
}
