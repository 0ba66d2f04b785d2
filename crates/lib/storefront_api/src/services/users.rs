//! User and purchase operations.

use sqlx::PgPool;
use storefront_core::auth::password::PasswordHasher;
use storefront_core::models::user::{Account, NewUser, User};
use storefront_core::{items, users};
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::UserPost;
use crate::services::auth::{ensure_unique, hash_password};

fn user_not_found() -> AppError {
    AppError::NotFound("User not found".into())
}

fn item_not_found() -> AppError {
    AppError::NotFound("Item not found".into())
}

/// Replace the caller's name, email and password.
///
/// Changing the email invalidates every token issued for the old one.
pub async fn update_user(
    pool: &PgPool,
    caller: &AuthenticatedUser,
    user_id: i64,
    body: &UserPost,
    hasher: PasswordHasher,
) -> AppResult<User> {
    caller.ensure_owner(user_id)?;
    let password_hash = hash_password(hasher, &body.password).await?;

    users::get_user(pool, user_id).await?.ok_or_else(user_not_found)?;
    ensure_unique(pool, body, Some(user_id)).await?;

    let user = users::update_user(
        pool,
        user_id,
        &NewUser {
            name: body.name.clone(),
            email: body.email.clone(),
            password_hash,
        },
    )
    .await?
    .ok_or_else(user_not_found)?;

    info!(user_id, "user updated");
    Ok(user)
}

/// Delete the caller's account, returning the deleted user's name.
pub async fn delete_user(
    pool: &PgPool,
    caller: &AuthenticatedUser,
    user_id: i64,
) -> AppResult<String> {
    caller.ensure_owner(user_id)?;
    let user = users::get_user(pool, user_id).await?.ok_or_else(user_not_found)?;
    if !users::delete_user(pool, user_id).await? {
        return Err(user_not_found());
    }
    info!(user_id, "user deleted");
    Ok(user.name)
}

/// Record that the caller bought an item.
pub async fn purchase(
    pool: &PgPool,
    caller: &AuthenticatedUser,
    user_id: i64,
    item_id: i64,
) -> AppResult<Account> {
    caller.ensure_owner(user_id)?;
    users::get_user(pool, user_id).await?.ok_or_else(user_not_found)?;
    items::get_item(pool, item_id).await?.ok_or_else(item_not_found)?;

    if !users::add_purchase(pool, user_id, item_id).await? {
        return Err(AppError::Validation("User already owns this item".into()));
    }
    info!(user_id, item_id, "item purchased");

    users::get_account(pool, user_id).await?.ok_or_else(user_not_found)
}

/// Undo a purchase, returning `(item name, user name)`.
pub async fn remove_purchase(
    pool: &PgPool,
    caller: &AuthenticatedUser,
    user_id: i64,
    item_id: i64,
) -> AppResult<(String, String)> {
    caller.ensure_owner(user_id)?;
    let user = users::get_user(pool, user_id).await?.ok_or_else(user_not_found)?;
    let item = items::get_item(pool, item_id).await?.ok_or_else(item_not_found)?;

    if !users::remove_purchase(pool, user_id, item_id).await? {
        return Err(AppError::Validation("User does not own this item".into()));
    }
    info!(user_id, item_id, "purchase removed");

    Ok((item.name, user.name))
}
