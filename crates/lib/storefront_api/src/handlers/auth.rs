//! Authentication request handlers.

use axum::extract::State;
use axum::extract::rejection::FormRejection;
use axum::{Form, Json};

use crate::AppState;
use crate::error::AppResult;
use crate::models::{LoginForm, TokenResponse};
use crate::services::auth;

/// `POST /auth/login`: exchange email + password for a bearer token.
pub async fn login_handler(
    State(state): State<AppState>,
    body: Result<Form<LoginForm>, FormRejection>,
) -> AppResult<Json<TokenResponse>> {
    let Form(body) = body?;
    let resp = auth::login(
        &state.pool,
        &body.username,
        &body.password,
        state.hasher,
        &state.codec,
    )
    .await?;
    Ok(Json(resp))
}
