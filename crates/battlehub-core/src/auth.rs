use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::session::SessionRecord;

/// Login form payload. Either a username or a phone number identifies the account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub username_or_phone: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username_or_phone: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username_or_phone: username_or_phone.into(),
            password: password.into(),
        }
    }

    /// Both fields must be non-blank before a request is sent.
    pub fn is_complete(&self) -> bool {
        !self.username_or_phone.trim().is_empty() && !self.password.is_empty()
    }
}

/// Contract for anything that can exchange credentials for a session (REST backend, stub).
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Short name used for logging.
    fn name(&self) -> &'static str;

    /// Verify credentials and return the session the server issued.
    async fn authenticate(&self, credentials: &Credentials) -> Result<SessionRecord>;
}

/// Authenticator with a single fixed account; useful for tests and offline smoke checks.
pub struct StaticAuthenticator {
    password: String,
    record: SessionRecord,
}

impl StaticAuthenticator {
    pub fn new(password: impl Into<String>, record: SessionRecord) -> Self {
        Self {
            password: password.into(),
            record,
        }
    }
}

#[async_trait]
impl Authenticator for StaticAuthenticator {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<SessionRecord> {
        if credentials.username_or_phone != self.record.username
            || credentials.password != self.password
        {
            bail!("invalid credentials");
        }
        Ok(self.record.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Role;

    fn authenticator() -> StaticAuthenticator {
        StaticAuthenticator::new(
            "hunter2",
            SessionRecord::new("tok", "u1", "raju", Role::User),
        )
    }

    #[tokio::test]
    async fn static_authenticator_accepts_matching_credentials() {
        let record = authenticator()
            .authenticate(&Credentials::new("raju", "hunter2"))
            .await
            .expect("credentials should match");

        assert_eq!(record.user_id, "u1");
        assert_eq!(record.role, Role::User);
    }

    #[tokio::test]
    async fn static_authenticator_rejects_wrong_password() {
        let err = authenticator()
            .authenticate(&Credentials::new("raju", "nope"))
            .await
            .expect_err("wrong password must fail");
        assert_eq!(err.to_string(), "invalid credentials");
    }

    #[test]
    fn blank_credentials_are_incomplete() {
        assert!(!Credentials::new("  ", "pw").is_complete());
        assert!(!Credentials::new("raju", "").is_complete());
        assert!(Credentials::new("raju", "pw").is_complete());
    }
}
