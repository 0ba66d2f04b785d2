//! Identity resolution and the password login flow.
//!
//! [`resolve`] is the single gate in front of every protected operation: it
//! turns a bearer token into a [`Principal`] or fails with
//! [`AuthError::Unauthorized`]. The backing store is reached only through the
//! narrow [`SubjectLookup`] / [`CredentialLookup`] capabilities.

use async_trait::async_trait;
use tracing::debug;

use super::AuthError;
use super::jwt::TokenCodec;
use super::password::{MAX_PASSWORD_BYTES, PasswordHasher};
use crate::models::auth::{CredentialRecord, Principal};

/// Point lookup of an account by its unique subject (email).
#[async_trait]
pub trait SubjectLookup: Send + Sync {
    type Account: Send;

    async fn lookup(&self, subject: &str) -> Result<Option<Self::Account>, AuthError>;
}

/// Point lookup of the stored credential for a subject.
#[async_trait]
pub trait CredentialLookup: Send + Sync {
    async fn find_credentials(&self, subject: &str)
    -> Result<Option<CredentialRecord>, AuthError>;
}

/// Extract the raw token from an `Authorization` header value.
///
/// The scheme is matched case-insensitively; anything but `Bearer <token>` is
/// rejected.
pub fn bearer_token(header: &str) -> Result<&str, AuthError> {
    let (scheme, token) = header.trim().split_once(' ').ok_or(AuthError::Unauthorized)?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::Unauthorized);
    }
    Ok(token)
}

/// Resolve a bearer token to the account it names.
///
/// Decode failures, empty subjects and unknown subjects all become
/// `Unauthorized`. Store failures propagate unchanged.
pub async fn resolve<L>(
    token: &str,
    codec: &TokenCodec,
    lookup: &L,
) -> Result<Principal<L::Account>, AuthError>
where
    L: SubjectLookup + ?Sized,
{
    let claims = codec.decode(token).map_err(|e| {
        debug!("token rejected: {e}");
        AuthError::Unauthorized
    })?;

    if claims.sub.is_empty() {
        debug!("token rejected: empty subject");
        return Err(AuthError::Unauthorized);
    }

    match lookup.lookup(&claims.sub).await? {
        Some(account) => Ok(Principal {
            subject: claims.sub,
            account,
        }),
        None => {
            debug!(subject = %claims.sub, "token rejected: unknown subject");
            Err(AuthError::Unauthorized)
        }
    }
}

/// Check a subject/password pair and issue an access token with the codec's
/// default TTL.
///
/// Unknown subject and wrong password fail identically with
/// [`AuthError::CredentialError`].
pub async fn login<C>(
    subject: &str,
    password: &str,
    hasher: PasswordHasher,
    codec: &TokenCodec,
    credentials: &C,
) -> Result<String, AuthError>
where
    C: CredentialLookup + ?Sized,
{
    if subject.is_empty() || password.len() > MAX_PASSWORD_BYTES {
        return Err(AuthError::CredentialError);
    }

    let record = credentials.find_credentials(subject).await?;

    // Unknown subjects still pay for one verify so timing matches a wrong password.
    let password = password.to_string();
    let (record, matched) = tokio::task::spawn_blocking(move || match record {
        Some(record) => {
            let matched = hasher.verify(&password, &record.password_hash);
            (Some(record), matched)
        }
        None => {
            hasher.verify_dummy(&password);
            (None, false)
        }
    })
    .await
    .map_err(|e| AuthError::Internal(format!("verify task: {e}")))?;

    match record {
        Some(record) if matched => codec.issue_default(&record.subject),
        _ => {
            debug!(subject, "login rejected");
            Err(AuthError::CredentialError)
        }
    }
}
