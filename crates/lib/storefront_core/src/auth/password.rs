//! Password hashing via bcrypt.

use tracing::warn;

use super::AuthError;

/// bcrypt only considers the first 72 bytes of its input.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Default bcrypt cost factor.
pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

/// Lowest cost bcrypt accepts.
pub const MIN_COST: u32 = 4;

/// Highest cost bcrypt accepts.
pub const MAX_COST: u32 = 31;

/// One-way password hasher with a tunable work factor.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl PasswordHasher {
    /// Create a hasher with the given bcrypt cost (clamped to bcrypt's 4..=31).
    pub fn new(cost: u32) -> Self {
        Self {
            cost: cost.clamp(MIN_COST, MAX_COST),
        }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a password with a fresh random salt.
    ///
    /// Passwords longer than [`MAX_PASSWORD_BYTES`] are rejected before any
    /// hashing work is done.
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        check_length(password)?;
        bcrypt::hash(password, self.cost)
            .map_err(|e| AuthError::Internal(format!("bcrypt hash: {e}")))
    }

    /// Verify a password against a stored bcrypt hash.
    ///
    /// A mismatch and a malformed hash both return `false`.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        match bcrypt::verify(password, hash) {
            Ok(matched) => matched,
            Err(e) => {
                warn!("bcrypt verify rejected stored hash: {e}");
                false
            }
        }
    }

    /// Well-formed verifier at this hasher's cost that no password matches.
    pub fn dummy_hash(&self) -> String {
        format!("$2b${:02}${}", self.cost, ".".repeat(53))
    }

    /// Spend one verify's worth of work against [`Self::dummy_hash`].
    ///
    /// Login runs this for unknown subjects so they cost the same as a wrong
    /// password.
    pub fn verify_dummy(&self, password: &str) {
        let _ = bcrypt::verify(password, &self.dummy_hash());
    }
}

/// Reject passwords bcrypt would silently truncate.
pub fn check_length(password: &str) -> Result<(), AuthError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AuthError::ValidationError(format!(
            "Password exceeds bcrypt's {MAX_PASSWORD_BYTES}-byte limit"
        )));
    }
    Ok(())
}
