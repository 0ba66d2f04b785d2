//! User and purchase persistence.

use std::collections::HashMap;

use sqlx::PgPool;

use crate::models::item::Item;
use crate::models::user::{Account, NewUser, User};

/// Row joining a purchase to its item.
#[derive(Debug, sqlx::FromRow)]
struct PurchaseRow {
    user_id: i64,
    id: i64,
    name: String,
    description: String,
    price: f64,
}

impl PurchaseRow {
    fn into_parts(self) -> (i64, Item) {
        (
            self.user_id,
            Item {
                id: self.id,
                name: self.name,
                description: self.description,
                price: self.price,
            },
        )
    }
}

/// Items bought by one user, in purchase order.
pub async fn items_bought(pool: &PgPool, user_id: i64) -> Result<Vec<Item>, sqlx::Error> {
    sqlx::query_as::<_, Item>(
        r#"
        SELECT i.id, i.name, i.description, i.price
        FROM user_items ui
        JOIN items i ON i.id = ui.item_id
        WHERE ui.user_id = $1
        ORDER BY ui.created_at, i.id
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

async fn with_items(pool: &PgPool, user: User) -> Result<Account, sqlx::Error> {
    let items_bought = items_bought(pool, user.id).await?;
    Ok(Account { user, items_bought })
}

/// List every user together with their purchases.
pub async fn list_accounts(pool: &PgPool) -> Result<Vec<Account>, sqlx::Error> {
    let users = sqlx::query_as::<_, User>("SELECT id, name, email FROM users ORDER BY id")
        .fetch_all(pool)
        .await?;

    let purchases = sqlx::query_as::<_, PurchaseRow>(
        r#"
        SELECT ui.user_id, i.id, i.name, i.description, i.price
        FROM user_items ui
        JOIN items i ON i.id = ui.item_id
        ORDER BY ui.created_at, i.id
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut by_user: HashMap<i64, Vec<Item>> = HashMap::new();
    for (user_id, item) in purchases.into_iter().map(PurchaseRow::into_parts) {
        by_user.entry(user_id).or_default().push(item);
    }

    Ok(users
        .into_iter()
        .map(|user| {
            let items_bought = by_user.remove(&user.id).unwrap_or_default();
            Account { user, items_bought }
        })
        .collect())
}

/// Fetch a user by ID.
pub async fn get_user(pool: &PgPool, user_id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT id, name, email FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Fetch a user and their purchases by ID.
pub async fn get_account(pool: &PgPool, user_id: i64) -> Result<Option<Account>, sqlx::Error> {
    match get_user(pool, user_id).await? {
        Some(user) => Ok(Some(with_items(pool, user).await?)),
        None => Ok(None),
    }
}

/// Fetch a user and their purchases by email.
pub async fn get_account_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<Account>, sqlx::Error> {
    let user = sqlx::query_as::<_, User>("SELECT id, name, email FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    match user {
        Some(user) => Ok(Some(with_items(pool, user).await?)),
        None => Ok(None),
    }
}

/// Check whether a user name is taken, optionally ignoring one user.
pub async fn name_exists(
    pool: &PgPool,
    name: &str,
    except: Option<i64>,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE name = $1 AND ($2::bigint IS NULL OR id <> $2))",
    )
    .bind(name)
    .bind(except)
    .fetch_one(pool)
    .await
}

/// Check whether an email is registered, optionally ignoring one user.
pub async fn email_exists(
    pool: &PgPool,
    email: &str,
    except: Option<i64>,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND ($2::bigint IS NULL OR id <> $2))",
    )
    .bind(email)
    .bind(except)
    .fetch_one(pool)
    .await
}

/// Insert a new user.
pub async fn create_user(pool: &PgPool, user: &NewUser) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (name, email, password_hash)
        VALUES ($1, $2, $3)
        RETURNING id, name, email
        "#,
    )
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .fetch_one(pool)
    .await
}

/// Replace a user's name, email and password hash.
pub async fn update_user(
    pool: &PgPool,
    user_id: i64,
    user: &NewUser,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET name = $1, email = $2, password_hash = $3, updated_at = now()
        WHERE id = $4
        RETURNING id, name, email
        "#,
    )
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Delete a user. Purchases cascade. Returns whether a row was removed.
pub async fn delete_user(pool: &PgPool, user_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Record a purchase. Returns `false` if the user already owns the item.
pub async fn add_purchase(pool: &PgPool, user_id: i64, item_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO user_items (user_id, item_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(user_id)
    .bind(item_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Remove a purchase. Returns `false` if the user did not own the item.
pub async fn remove_purchase(
    pool: &PgPool,
    user_id: i64,
    item_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM user_items WHERE user_id = $1 AND item_id = $2")
        .bind(user_id)
        .bind(item_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
