//! Hosted backend configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use crate::adapters::rest::RestBackendConfig;

use super::error::ValidationError;
use super::Environment;

/// Hosted backend configuration (identity + documents)
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Service origin, e.g. "https://backend.example.com"
    pub base_url: String,

    /// Project whose accounts and documents this deployment uses
    pub project_id: String,

    /// API key sent with every request
    pub api_key: SecretString,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl BackendConfig {
    /// Get the request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Build the REST adapter configuration
    pub fn rest_config(&self) -> RestBackendConfig {
        RestBackendConfig::new(
            self.base_url.clone(),
            self.project_id.clone(),
            self.api_key.clone(),
        )
        .with_timeout(self.request_timeout())
    }

    /// Validate backend configuration
    ///
    /// In production, requires HTTPS for the base URL.
    /// In development, allows localhost with HTTP/HTTPS.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.base_url.is_empty() {
            return Err(ValidationError::MissingRequired("BACKEND_BASE_URL"));
        }
        if self.project_id.is_empty() {
            return Err(ValidationError::MissingRequired("BACKEND_PROJECT_ID"));
        }
        if self.api_key.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("BACKEND_API_KEY"));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidBaseUrl);
        }

        // In production, require HTTPS
        if *environment == Environment::Production && !self.base_url.starts_with("https://") {
            return Err(ValidationError::BaseUrlMustBeHttps);
        }

        if self.request_timeout_secs == 0 || self.request_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }

        Ok(())
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            project_id: String::new(),
            api_key: SecretString::new(String::new()),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_request_timeout() -> u64 {
    10
}
