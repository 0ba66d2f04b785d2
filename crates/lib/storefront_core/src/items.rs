//! Item persistence.

use sqlx::PgPool;

use crate::models::item::{Item, ItemChanges, NewItem};
use crate::models::user::User;

/// List all items.
pub async fn list_items(pool: &PgPool) -> Result<Vec<Item>, sqlx::Error> {
    sqlx::query_as::<_, Item>("SELECT id, name, description, price FROM items ORDER BY id")
        .fetch_all(pool)
        .await
}

/// Fetch an item by ID.
pub async fn get_item(pool: &PgPool, item_id: i64) -> Result<Option<Item>, sqlx::Error> {
    sqlx::query_as::<_, Item>("SELECT id, name, description, price FROM items WHERE id = $1")
        .bind(item_id)
        .fetch_optional(pool)
        .await
}

/// Check whether an item name is taken, optionally ignoring one item.
pub async fn name_exists(
    pool: &PgPool,
    name: &str,
    except: Option<i64>,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM items WHERE name = $1 AND ($2::bigint IS NULL OR id <> $2))",
    )
    .bind(name)
    .bind(except)
    .fetch_one(pool)
    .await
}

/// Insert a new item.
pub async fn create_item(pool: &PgPool, item: &NewItem) -> Result<Item, sqlx::Error> {
    sqlx::query_as::<_, Item>(
        r#"
        INSERT INTO items (name, description, price)
        VALUES ($1, $2, $3)
        RETURNING id, name, description, price
        "#,
    )
    .bind(&item.name)
    .bind(&item.description)
    .bind(item.price)
    .fetch_one(pool)
    .await
}

/// Apply a partial update. Unset fields keep their current value.
pub async fn update_item(
    pool: &PgPool,
    item_id: i64,
    changes: &ItemChanges,
) -> Result<Option<Item>, sqlx::Error> {
    sqlx::query_as::<_, Item>(
        r#"
        UPDATE items
        SET name = COALESCE($1, name),
            description = COALESCE($2, description),
            price = COALESCE($3, price)
        WHERE id = $4
        RETURNING id, name, description, price
        "#,
    )
    .bind(changes.name.as_deref())
    .bind(changes.description.as_deref())
    .bind(changes.price)
    .bind(item_id)
    .fetch_optional(pool)
    .await
}

/// Delete an item. Purchases cascade. Returns the deleted item.
pub async fn delete_item(pool: &PgPool, item_id: i64) -> Result<Option<Item>, sqlx::Error> {
    sqlx::query_as::<_, Item>(
        "DELETE FROM items WHERE id = $1 RETURNING id, name, description, price",
    )
    .bind(item_id)
    .fetch_optional(pool)
    .await
}

/// Average price over all items, `None` when there are no items.
pub async fn price_average(pool: &PgPool) -> Result<Option<f64>, sqlx::Error> {
    sqlx::query_scalar::<_, Option<f64>>("SELECT AVG(price) FROM items")
        .fetch_one(pool)
        .await
}

/// Users who bought an item.
pub async fn list_owners(pool: &PgPool, item_id: i64) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT u.id, u.name, u.email
        FROM user_items ui
        JOIN users u ON u.id = ui.user_id
        WHERE ui.item_id = $1
        ORDER BY u.id
        "#,
    )
    .bind(item_id)
    .fetch_all(pool)
    .await
}

/// Round to two decimal places, the precision prices are reported at.
pub fn round_price(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
