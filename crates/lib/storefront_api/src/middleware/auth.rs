//! Authentication middleware: Bearer token extraction and identity resolution.

use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use storefront_core::auth::AuthError;
use storefront_core::auth::queries::PgUserStore;
use storefront_core::auth::resolver::{bearer_token, resolve};
use storefront_core::models::user::Account;

use crate::AppState;
use crate::error::{AppError, AppResult};

/// The resolved account, stored in request extensions for protected handlers.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Account);

impl AuthenticatedUser {
    pub fn id(&self) -> i64 {
        self.0.id()
    }

    /// Fail with 403 unless this user is `user_id`.
    pub fn ensure_owner(&self, user_id: i64) -> AppResult<()> {
        if self.id() != user_id {
            return Err(AppError::Forbidden(
                "Not allowed to act on behalf of another user".into(),
            ));
        }
        Ok(())
    }
}

/// Axum middleware: extracts `Authorization: Bearer <token>`, resolves it to
/// an account, and injects `AuthenticatedUser` into request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::Unauthorized)?;

    let token = bearer_token(header)?;

    let store = PgUserStore::new(state.pool.clone());
    let principal = resolve(token, &state.codec, &store).await?;

    request
        .extensions_mut()
        .insert(AuthenticatedUser(principal.into_account()));

    Ok(next.run(request).await)
}
