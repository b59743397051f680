use std::fmt::{Display, Formatter};

use atrium_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Validated, lowercase email address used as the membership key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// Performs basic structural validation: non-empty, contains exactly one `@`,
    /// local part and domain are non-empty, domain contains at least one `.`.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let normalized = value.trim().to_lowercase();

        if normalized.is_empty() {
            return Err(AppError::Validation(
                "email address must not be empty".to_owned(),
            ));
        }

        let Some((local, domain)) = normalized.split_once('@') else {
            return Err(AppError::Validation(format!(
                "email address '{normalized}' must contain an '@'"
            )));
        };

        if domain.contains('@') {
            return Err(AppError::Validation(format!(
                "email address '{normalized}' must contain exactly one '@'"
            )));
        }

        if local.is_empty() {
            return Err(AppError::Validation(
                "email local part must not be empty".to_owned(),
            ));
        }

        if domain.is_empty() || !domain.contains('.') {
            return Err(AppError::Validation(
                "email domain must contain at least one '.'".to_owned(),
            ));
        }

        if normalized.len() > 254 {
            return Err(AppError::Validation(
                "email address must not exceed 254 characters".to_owned(),
            ));
        }

        Ok(Self(normalized))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns whether a raw, unvalidated email refers to this address.
    #[must_use]
    pub fn matches(&self, raw: &str) -> bool {
        Self::new(raw).is_ok_and(|other| other == *self)
    }
}

impl Display for EmailAddress {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::EmailAddress;

    #[test]
    fn valid_email_is_normalized() {
        let email = EmailAddress::new("  A@X.com ");
        assert_eq!(
            email.unwrap_or_else(|_| panic!("test")).as_str(),
            "a@x.com"
        );
    }

    #[test]
    fn email_without_at_is_rejected() {
        assert!(EmailAddress::new("noatsign").is_err());
    }

    #[test]
    fn email_with_two_at_signs_is_rejected() {
        assert!(EmailAddress::new("a@b@x.com").is_err());
    }

    #[test]
    fn email_without_domain_dot_is_rejected() {
        assert!(EmailAddress::new("user@nodot").is_err());
    }

    #[test]
    fn empty_email_is_rejected() {
        assert!(EmailAddress::new("").is_err());
    }

    #[test]
    fn matches_ignores_case() {
        let email = EmailAddress::new("a@x.com").unwrap_or_else(|_| panic!("test"));
        assert!(email.matches("A@X.COM"));
        assert!(!email.matches("b@x.com"));
    }

    #[test]
    fn matches_normalizes_non_ascii_local_part() {
        let email = EmailAddress::new("Ärzte@x.com").unwrap_or_else(|_| panic!("test"));
        assert_eq!(email.as_str(), "ärzte@x.com");
        assert!(email.matches("Ärzte@x.com"));
        assert!(email.matches(" ÄRZTE@X.COM "));
        assert!(!email.matches("arzte@x.com"));
    }
}
