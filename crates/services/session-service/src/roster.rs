//! Admin allow-list. The sole source of authorization.

use dashmap::DashSet;
use tracing::debug;

use domain::{normalize_email, UserRole, DEFAULT_ADMIN_EMAILS};

/// Set of lower-cased admin emails. Grows when users are promoted.
#[derive(Debug, Default)]
pub struct AdminRoster {
    emails: DashSet<String>,
}

impl AdminRoster {
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let roster = Self::default();
        for email in emails {
            roster.grant(email.as_ref());
        }
        roster
    }

    /// Compiled-in admin emails plus `extra`
    pub fn with_defaults<S: AsRef<str>>(extra: &[S]) -> Self {
        let roster = Self::new(DEFAULT_ADMIN_EMAILS);
        for email in extra {
            roster.grant(email.as_ref());
        }
        roster
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        let email = normalize_email(email);
        if email.is_empty() {
            return false;
        }
        let is_admin = self.emails.contains(&email);
        debug!(email = %email, is_admin, "Admin check");
        is_admin
    }

    /// Role derived from the allow-list
    pub fn role_for(&self, email: &str) -> UserRole {
        if self.is_admin_email(email) {
            UserRole::Admin
        } else {
            UserRole::User
        }
    }

    /// Add an email. Returns false if it was already present.
    pub fn grant(&self, email: &str) -> bool {
        let email = normalize_email(email);
        if email.is_empty() {
            return false;
        }
        self.emails.insert(email)
    }

    /// Sorted snapshot of the allow-list
    pub fn emails(&self) -> Vec<String> {
        let mut emails: Vec<String> = self.emails.iter().map(|e| e.key().clone()).collect();
        emails.sort();
        emails
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_include_demo_account() {
        let roster = AdminRoster::with_defaults::<&str>(&[]);
        assert_eq!(roster.role_for("demo@email.com"), UserRole::Admin);
        assert_eq!(roster.role_for("Demo@Email.com "), UserRole::Admin);
        assert_eq!(roster.role_for("random@x.com"), UserRole::User);
        assert_eq!(roster.emails().len(), DEFAULT_ADMIN_EMAILS.len());
    }

    #[test]
    fn test_grant_is_idempotent() {
        let roster = AdminRoster::with_defaults(&["ops@x.com"]);
        assert!(roster.is_admin_email("ops@x.com"));
        assert!(roster.grant("new@x.com"));
        assert!(!roster.grant("NEW@x.com"));
        assert!(!roster.grant("   "));
        assert!(!roster.is_admin_email(""));
    }
}
