//! User request handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use storefront_core::users;
use validator::Validate;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{MessageResponse, UserGet, UserPost, UserResponse};
use crate::services::{auth, users as user_service};

/// `GET /users`: list users with their purchases.
pub async fn list_users_handler(State(state): State<AppState>) -> AppResult<Json<Vec<UserGet>>> {
    let accounts = users::list_accounts(&state.pool).await?;
    Ok(Json(accounts.into_iter().map(UserGet::from).collect()))
}

/// `POST /users`: register a new user.
pub async fn create_user_handler(
    State(state): State<AppState>,
    body: Result<Json<UserPost>, JsonRejection>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let Json(body) = body?;
    body.validate()?;
    let user = auth::register(&state.pool, &body, state.hasher).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// `GET /users/me`: the authenticated user.
pub async fn me_handler(Extension(user): Extension<AuthenticatedUser>) -> Json<UserGet> {
    Json(user.0.into())
}

/// `PUT /users/{user_id}`: replace the caller's profile and password.
pub async fn update_user_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(user_id): Path<i64>,
    body: Result<Json<UserPost>, JsonRejection>,
) -> AppResult<Json<UserResponse>> {
    let Json(body) = body?;
    body.validate()?;
    let user =
        user_service::update_user(&state.pool, &caller, user_id, &body, state.hasher).await?;
    Ok(Json(user.into()))
}

/// `DELETE /users/{user_id}`: delete the caller's account.
pub async fn delete_user_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(user_id): Path<i64>,
) -> AppResult<Json<MessageResponse>> {
    let name = user_service::delete_user(&state.pool, &caller, user_id).await?;
    Ok(Json(MessageResponse::new(format!("User '{name}' was deleted"))))
}

/// `PUT /users/{user_id}/{item_id}`: buy an item.
pub async fn purchase_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path((user_id, item_id)): Path<(i64, i64)>,
) -> AppResult<Json<UserGet>> {
    let account = user_service::purchase(&state.pool, &caller, user_id, item_id).await?;
    Ok(Json(account.into()))
}

/// `DELETE /users/{user_id}/{item_id}`: give an item back.
pub async fn remove_purchase_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path((user_id, item_id)): Path<(i64, i64)>,
) -> AppResult<Json<MessageResponse>> {
    let (item, user) =
        user_service::remove_purchase(&state.pool, &caller, user_id, item_id).await?;
    Ok(Json(MessageResponse::new(format!(
        "Item '{item}' was removed from user '{user}'"
    ))))
}
