//! Authentication domain models.
//!
//! These are internal domain models, distinct from the HTTP request/response
//! types in `storefront_api`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// JWT claims embedded in access tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the account email (standard JWT `sub` claim).
    #[serde(default)]
    pub sub: String,
    /// Expiry (unix timestamp).
    pub exp: i64,
    /// Issued at (unix timestamp).
    #[serde(default)]
    pub iat: i64,
    /// Any additional claims.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Stored (subject, verifier) pair used by the login flow.
#[derive(Clone)]
pub struct CredentialRecord {
    pub subject: String,
    /// bcrypt hash; never the plaintext.
    pub password_hash: String,
}

impl std::fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("subject", &self.subject)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

/// An authenticated identity: the token subject plus the account it resolved to.
#[derive(Debug, Clone, PartialEq)]
pub struct Principal<A> {
    pub subject: String,
    pub account: A,
}

impl<A> Principal<A> {
    pub fn into_account(self) -> A {
        self.account
    }
}
