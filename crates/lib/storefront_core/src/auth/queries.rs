//! Auth-related database queries and the PostgreSQL-backed lookups.

use async_trait::async_trait;
use sqlx::PgPool;

use super::AuthError;
use super::resolver::{CredentialLookup, SubjectLookup};
use crate::models::auth::CredentialRecord;
use crate::models::user::Account;
use crate::users;

/// Fetch the stored credential for an email.
pub async fn find_credentials_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<CredentialRecord>, AuthError> {
    let row = sqlx::query_as::<_, (String, String)>(
        "SELECT email, password_hash FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|(subject, password_hash)| CredentialRecord {
        subject,
        password_hash,
    }))
}

/// Subject and credential lookups over the `users` table.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubjectLookup for PgUserStore {
    type Account = Account;

    async fn lookup(&self, subject: &str) -> Result<Option<Account>, AuthError> {
        Ok(users::get_account_by_email(&self.pool, subject).await?)
    }
}

#[async_trait]
impl CredentialLookup for PgUserStore {
    async fn find_credentials(
        &self,
        subject: &str,
    ) -> Result<Option<CredentialRecord>, AuthError> {
        find_credentials_by_email(&self.pool, subject).await
    }
}
