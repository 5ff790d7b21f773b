//! Campus policy - which accounts this deployment accepts.

use crate::domain::foundation::EmailAddress;
use crate::domain::user::CollegeAffiliation;

/// Institution policy for one deployment.
///
/// Sign-ups are restricted to a single email domain, and every profile is
/// stamped with the institution's affiliation record.
#[derive(Debug, Clone)]
pub struct CampusPolicy {
    institution: String,
    email_domain: String,
}

impl CampusPolicy {
    pub fn new(institution: impl Into<String>, email_domain: impl Into<String>) -> Self {
        Self {
            institution: institution.into(),
            email_domain: email_domain.into().trim().to_lowercase(),
        }
    }

    /// Returns the institution's display name.
    pub fn institution(&self) -> &str {
        &self.institution
    }

    /// Returns the accepted email domain.
    pub fn email_domain(&self) -> &str {
        &self.email_domain
    }

    /// Checks whether an address belongs to the campus domain.
    pub fn allows(&self, email: &EmailAddress) -> bool {
        email.domain() == self.email_domain
    }

    /// The affiliation record stamped onto new profiles.
    pub fn college(&self) -> CollegeAffiliation {
        CollegeAffiliation::new(self.institution.clone(), self.email_domain.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_addresses_on_the_campus_domain() {
        let policy = CampusPolicy::new("Example State College", "college.edu");

        assert!(policy.allows(&EmailAddress::new("alice@college.edu").unwrap()));
        assert!(!policy.allows(&EmailAddress::new("alice@other.edu").unwrap()));
    }

    #[test]
    fn domain_comparison_is_case_insensitive() {
        let policy = CampusPolicy::new("Example State College", "College.EDU");

        assert!(policy.allows(&EmailAddress::new("Alice@COLLEGE.edu").unwrap()));
    }

    #[test]
    fn college_record_carries_institution_and_domain() {
        let policy = CampusPolicy::new("Example State College", "college.edu");
        let college = policy.college();

        assert_eq!(college.name(), "Example State College");
        assert_eq!(college.email_domain(), "college.edu");
    }
}
