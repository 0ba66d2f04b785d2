//! Authentication service: login and registration flows delegating to
//! `storefront_core::auth`.

use sqlx::PgPool;
use storefront_core::auth::jwt::TokenCodec;
use storefront_core::auth::password::{PasswordHasher, check_length};
use storefront_core::auth::queries::PgUserStore;
use storefront_core::auth::resolver;
use storefront_core::models::user::{NewUser, User};
use storefront_core::users;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::{TokenResponse, UserPost};

/// Hash a password off the async runtime.
///
/// The byte-length limit is checked first so oversized input never reaches
/// a blocking thread.
pub async fn hash_password(hasher: PasswordHasher, password: &str) -> AppResult<String> {
    check_length(password)?;
    let password = password.to_string();
    tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| AppError::Internal(format!("hash task: {e}")))?
        .map_err(AppError::from)
}

/// Authenticate with email + password.
pub async fn login(
    pool: &PgPool,
    email: &str,
    password: &str,
    hasher: PasswordHasher,
    codec: &TokenCodec,
) -> AppResult<TokenResponse> {
    let store = PgUserStore::new(pool.clone());
    let token = resolver::login(email, password, hasher, codec, &store).await?;
    info!(email, "user logged in");
    Ok(TokenResponse::bearer(token))
}

/// Reject a name or email already used by another user.
pub async fn ensure_unique(pool: &PgPool, body: &UserPost, except: Option<i64>) -> AppResult<()> {
    if users::name_exists(pool, &body.name, except).await? {
        return Err(AppError::Validation("User already exists".into()));
    }
    if users::email_exists(pool, &body.email, except).await? {
        return Err(AppError::Validation("Email already exists".into()));
    }
    Ok(())
}

/// Register a new user account.
pub async fn register(pool: &PgPool, body: &UserPost, hasher: PasswordHasher) -> AppResult<User> {
    let password_hash = hash_password(hasher, &body.password).await?;

    ensure_unique(pool, body, None).await?;

    let user = users::create_user(
        pool,
        &NewUser {
            name: body.name.clone(),
            email: body.email.clone(),
            password_hash,
        },
    )
    .await?;

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok(user)
}
