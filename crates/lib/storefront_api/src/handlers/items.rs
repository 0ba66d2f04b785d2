//! Item request handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use storefront_core::items;
use tracing::debug;
use validator::Validate;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{
    ItemGet, ItemOwner, ItemPost, ItemUpdate, MessageResponse, PriceAverageResponse,
};
use crate::services::items as item_service;

/// `GET /items`: list items.
pub async fn list_items_handler(State(state): State<AppState>) -> AppResult<Json<Vec<ItemGet>>> {
    let items = items::list_items(&state.pool).await?;
    Ok(Json(items.into_iter().map(ItemGet::from).collect()))
}

/// `GET /items/price_avg`: mean item price.
pub async fn price_average_handler(
    State(state): State<AppState>,
) -> AppResult<Json<PriceAverageResponse>> {
    let price_avg = item_service::price_average(&state.pool).await?;
    Ok(Json(PriceAverageResponse { price_avg }))
}

/// `POST /items`: create an item.
pub async fn create_item_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    body: Result<Json<ItemPost>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ItemGet>)> {
    let Json(body) = body?;
    body.validate()?;
    debug!(user_id = caller.id(), "creating item");
    let item = item_service::create_item(&state.pool, &body.into()).await?;
    Ok((StatusCode::CREATED, Json(item.into())))
}

/// `GET /items/{item_id}`: fetch one item.
pub async fn get_item_handler(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
) -> AppResult<Json<ItemGet>> {
    let item = item_service::get_item(&state.pool, item_id).await?;
    Ok(Json(item.into()))
}

/// `GET /items/show_owner/{item_id}`: users who bought an item.
pub async fn show_owner_handler(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
) -> AppResult<Json<Vec<ItemOwner>>> {
    item_service::get_item(&state.pool, item_id).await?;
    let owners = items::list_owners(&state.pool, item_id).await?;
    Ok(Json(owners.into_iter().map(ItemOwner::from).collect()))
}

/// `PUT /items/{item_id}`: partially update an item.
pub async fn update_item_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(item_id): Path<i64>,
    body: Result<Json<ItemUpdate>, JsonRejection>,
) -> AppResult<Json<ItemGet>> {
    let Json(body) = body?;
    body.validate()?;
    debug!(user_id = caller.id(), item_id, "updating item");
    let item = item_service::update_item(&state.pool, item_id, &body.into()).await?;
    Ok(Json(item.into()))
}

/// `DELETE /items/{item_id}`: delete an item.
pub async fn delete_item_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Path(item_id): Path<i64>,
) -> AppResult<Json<MessageResponse>> {
    debug!(user_id = caller.id(), item_id, "deleting item");
    let item = item_service::delete_item(&state.pool, item_id).await?;
    Ok(Json(MessageResponse::new(format!(
        "Item '{}' deleted successfully",
        item.name
    ))))
}
