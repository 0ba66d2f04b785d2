//! API server configuration.

use chrono::Duration;
use storefront_core::auth::AuthError;
use storefront_core::auth::jwt::{
    DEFAULT_ACCESS_TOKEN_TTL_MINUTES, DEFAULT_ALGORITHM, TokenCodec, parse_algorithm,
    resolve_jwt_secret,
};
use storefront_core::auth::password::{DEFAULT_COST, PasswordHasher};

/// Configuration for the API server.
#[derive(Clone)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:8000").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub pg_connection_url: String,
    /// JWT signing secret.
    pub jwt_secret: String,
    /// JWT algorithm identifier (`HS256`, `HS384` or `HS512`).
    pub jwt_algorithm: String,
    /// Access token lifetime in minutes.
    pub access_token_ttl_minutes: i64,
    /// bcrypt work factor.
    pub bcrypt_cost: u32,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("bind_addr", &self.bind_addr)
            .field("pg_connection_url", &self.pg_connection_url)
            .field("jwt_secret", &"<redacted>")
            .field("jwt_algorithm", &self.jwt_algorithm)
            .field("access_token_ttl_minutes", &self.access_token_ttl_minutes)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                       | Default                                  |
    /// |--------------------------------|------------------------------------------|
    /// | `BIND_ADDR`                    | `127.0.0.1:8000`                         |
    /// | `DATABASE_URL`                 | `postgres://localhost:5432/storefront`   |
    /// | `JWT_SECRET` / `AUTH_SECRET`   | generated & persisted to file            |
    /// | `JWT_ALGORITHM`                | `HS256`                                  |
    /// | `ACCESS_TOKEN_EXPIRE_MINUTES`  | `60`                                     |
    /// | `BCRYPT_COST`                  | `12`                                     |
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8000".into()),
            pg_connection_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost:5432/storefront".into()),
            jwt_secret: resolve_jwt_secret(),
            jwt_algorithm: std::env::var("JWT_ALGORITHM")
                .unwrap_or_else(|_| DEFAULT_ALGORITHM.into()),
            access_token_ttl_minutes: std::env::var("ACCESS_TOKEN_EXPIRE_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_ACCESS_TOKEN_TTL_MINUTES),
            bcrypt_cost: std::env::var("BCRYPT_COST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_COST),
        }
    }

    /// Build the token codec described by this configuration.
    pub fn token_codec(&self) -> Result<TokenCodec, AuthError> {
        if self.access_token_ttl_minutes <= 0 {
            return Err(AuthError::ValidationError(
                "access token lifetime must be positive".into(),
            ));
        }
        let ttl = Duration::try_minutes(self.access_token_ttl_minutes).ok_or_else(|| {
            AuthError::ValidationError("access token lifetime is out of range".into())
        })?;
        let algorithm = parse_algorithm(&self.jwt_algorithm)?;
        Ok(TokenCodec::new(self.jwt_secret.as_bytes(), algorithm)?.with_default_ttl(ttl))
    }

    pub fn password_hasher(&self) -> PasswordHasher {
        PasswordHasher::new(self.bcrypt_cost)
    }
}
