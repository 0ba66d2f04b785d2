//! JWT token generation and verification.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
#[cfg(test)]
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Duration, Utc};
pub use jsonwebtoken::Algorithm;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use serde_json::{Map, Value};
use tracing::{info, warn};

use super::AuthError;
use crate::models::auth::TokenClaims;

/// Default access token lifetime: 60 minutes.
pub const DEFAULT_ACCESS_TOKEN_TTL_MINUTES: i64 = 60;

/// Default signing algorithm identifier.
pub const DEFAULT_ALGORITHM: &str = "HS256";

/// Source of "now" for issuing and expiring tokens.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Used to exercise expiry.
#[cfg(test)]
#[derive(Debug)]
pub struct ManualClock {
    secs: AtomicI64,
}

#[cfg(test)]
impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            secs: AtomicI64::new(start.timestamp()),
        }
    }

    /// Move the clock forward (or backward, for a negative duration).
    pub fn advance(&self, by: Duration) {
        self.secs.fetch_add(by.num_seconds(), Ordering::SeqCst);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.secs.load(Ordering::SeqCst), 0).unwrap_or_default()
    }
}

/// Parse a signing algorithm identifier. Only the HMAC family is accepted
/// because the key is a shared secret.
pub fn parse_algorithm(name: &str) -> Result<Algorithm, AuthError> {
    let algorithm = Algorithm::from_str(name.trim())
        .map_err(|_| AuthError::ValidationError(format!("unknown JWT algorithm '{name}'")))?;
    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        other => Err(AuthError::ValidationError(format!(
            "JWT algorithm {other:?} is not supported with a shared secret"
        ))),
    }
}

/// Signs and verifies access tokens with a process-wide secret.
///
/// Keys, algorithm and TTL are fixed at construction; the codec holds no
/// mutable state and is shared across requests behind an `Arc`.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &self.algorithm)
            .field("default_ttl", &self.default_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Create a codec for an HMAC algorithm and a non-empty secret.
    pub fn new(secret: &[u8], algorithm: Algorithm) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::ValidationError("JWT secret must not be empty".into()));
        }
        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(AuthError::ValidationError(format!(
                "JWT algorithm {algorithm:?} is not supported with a shared secret"
            )));
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            algorithm,
            default_ttl: Duration::minutes(DEFAULT_ACCESS_TOKEN_TTL_MINUTES),
            clock: Arc::new(SystemClock),
        })
    }

    /// HS256 codec with the default TTL.
    pub fn hs256(secret: &[u8]) -> Result<Self, AuthError> {
        Self::new(secret, Algorithm::HS256)
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Issue a token for `subject` that expires `ttl` from now.
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<String, AuthError> {
        self.issue_with_claims(subject, ttl, Map::new())
    }

    /// Issue a token using the codec's default TTL.
    pub fn issue_default(&self, subject: &str) -> Result<String, AuthError> {
        self.issue(subject, self.default_ttl)
    }

    /// Issue a token carrying additional claims next to `sub`/`iat`/`exp`.
    /// Extra claims cannot override the registered ones.
    pub fn issue_with_claims(
        &self,
        subject: &str,
        ttl: Duration,
        mut extra: Map<String, Value>,
    ) -> Result<String, AuthError> {
        if subject.is_empty() {
            return Err(AuthError::ValidationError("token subject must not be empty".into()));
        }
        for reserved in ["sub", "iat", "exp"] {
            extra.remove(reserved);
        }
        let now = self.clock.now();
        let exp = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::ValidationError("token lifetime is out of range".into()))?;
        let claims = TokenClaims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            extra,
        };
        encode(&Header::new(self.algorithm), &claims, &self.encoding)
            .map_err(|e| AuthError::Internal(format!("jwt encode: {e}")))
    }

    /// Verify signature, algorithm and expiry, returning the claims on success.
    ///
    /// A token is expired once `exp <= now`; there is no leeway.
    pub fn decode(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let mut validation = Validation::new(self.algorithm);
        // Expiry is checked against the codec's clock below.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let claims = decode::<TokenClaims>(token, &self.decoding, &validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?
            .claims;

        if claims.exp <= self.clock.now().timestamp() {
            return Err(AuthError::InvalidToken("token expired".into()));
        }
        Ok(claims)
    }
}

/// Resolve the JWT secret: env var `JWT_SECRET` → `AUTH_SECRET` → persisted file.
pub fn resolve_jwt_secret() -> String {
    if let Ok(secret) = std::env::var("JWT_SECRET")
        && !secret.is_empty()
    {
        return secret;
    }
    if let Ok(secret) = std::env::var("AUTH_SECRET")
        && !secret.is_empty()
    {
        return secret;
    }
    let secret_path = jwt_secret_path();
    match load_or_generate_secret(&secret_path) {
        Ok(secret) => secret,
        Err(e) => {
            warn!(path = %secret_path.display(), "could not persist JWT secret: {e}");
            generate_secret()
        }
    }
}

/// Read a persisted secret, or generate one and write it to `path`.
pub fn load_or_generate_secret(path: &Path) -> std::io::Result<String> {
    if let Ok(existing) = std::fs::read_to_string(path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return Ok(trimmed.to_string());
        }
    }
    let secret = generate_secret();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, &secret)?;
    info!(path = %path.display(), "generated new JWT secret");
    Ok(secret)
}

/// 64 random alphanumeric characters.
fn generate_secret() -> String {
    rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

/// Path to the persisted JWT secret file.
fn jwt_secret_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("storefront")
        .join("jwt-secret")
}
