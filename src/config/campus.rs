//! Campus configuration

use serde::Deserialize;

use crate::application::CampusPolicy;

use super::error::ValidationError;

/// Campus configuration (institution identity and email domain)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CampusConfig {
    /// Institution name, e.g. "State College"
    pub institution_name: String,

    /// Email domain sign-ups must use, e.g. "college.edu"
    pub email_domain: String,
}

impl CampusConfig {
    /// Build the sign-up policy for this campus
    pub fn policy(&self) -> CampusPolicy {
        CampusPolicy::new(&self.institution_name, &self.email_domain)
    }

    /// Validate campus configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.institution_name.is_empty() {
            return Err(ValidationError::MissingRequired("CAMPUS_INSTITUTION_NAME"));
        }
        if self.email_domain.is_empty() {
            return Err(ValidationError::MissingRequired("CAMPUS_EMAIL_DOMAIN"));
        }

        // A domain, not an address or a pattern
        let domain = self.email_domain.trim();
        if domain.contains('@') || domain.contains(char::is_whitespace) || !domain.contains('.') {
            return Err(ValidationError::InvalidEmailDomain);
        }

        Ok(())
    }
}
