//! Item operations.

use sqlx::PgPool;
use storefront_core::items;
use storefront_core::models::item::{Item, ItemChanges, NewItem};
use tracing::info;

use crate::error::{AppError, AppResult};

fn item_not_found() -> AppError {
    AppError::NotFound("Item not found".into())
}

pub async fn get_item(pool: &PgPool, item_id: i64) -> AppResult<Item> {
    items::get_item(pool, item_id).await?.ok_or_else(item_not_found)
}

pub async fn create_item(pool: &PgPool, item: &NewItem) -> AppResult<Item> {
    if items::name_exists(pool, &item.name, None).await? {
        return Err(AppError::Validation("Item already exists".into()));
    }
    let item = items::create_item(pool, item).await?;
    info!(item_id = item.id, name = %item.name, "item created");
    Ok(item)
}

pub async fn update_item(pool: &PgPool, item_id: i64, changes: &ItemChanges) -> AppResult<Item> {
    if let Some(name) = &changes.name
        && items::name_exists(pool, name, Some(item_id)).await?
    {
        return Err(AppError::Validation("Item already exists".into()));
    }
    let item = items::update_item(pool, item_id, changes)
        .await?
        .ok_or_else(item_not_found)?;
    info!(item_id, "item updated");
    Ok(item)
}

pub async fn delete_item(pool: &PgPool, item_id: i64) -> AppResult<Item> {
    let item = items::delete_item(pool, item_id)
        .await?
        .ok_or_else(item_not_found)?;
    info!(item_id, "item deleted");
    Ok(item)
}

/// Mean price rounded to cents; `0.0` when there are no items.
pub async fn price_average(pool: &PgPool) -> AppResult<f64> {
    Ok(items::price_average(pool)
        .await?
        .map(items::round_price)
        .unwrap_or(0.0))
}
