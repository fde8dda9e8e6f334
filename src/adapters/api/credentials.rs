//! Bitstamp Account Credentials
//!
//! The v1 private endpoints take the account identifier and secret as
//! plain form fields. Without credentials the client stays read-only.

use std::fmt;

/// Account identifier and secret for private endpoints.
#[derive(Clone)]
pub struct Credentials {
    /// Bitstamp customer id.
    user: String,
    /// Account secret (never logged).
    password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }

    /// Credentials from optional config values.
    ///
    /// Both parts must be present and non-empty; anything else means an
    /// unauthenticated client.
    pub fn from_parts(user: Option<&str>, password: Option<&str>) -> Option<Self> {
        match (user, password) {
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => Some(Self::new(u, p)),
            _ => None,
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    /// Form fields to prepend to every private request.
    pub fn form_fields(&self) -> [(&'static str, &str); 2] {
        [("user", self.user.as_str()), ("password", self.password.as_str())]
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts_requires_both() {
        assert!(Credentials::from_parts(Some("12345"), Some("secret")).is_some());
        assert!(Credentials::from_parts(Some("12345"), None).is_none());
        assert!(Credentials::from_parts(None, Some("secret")).is_none());
        assert!(Credentials::from_parts(Some(""), Some("secret")).is_none());
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials::new("12345", "hunter2");
        let printed = format!("{creds:?}");
        assert!(printed.contains("12345"));
        assert!(!printed.contains("hunter2"));
    }
}
