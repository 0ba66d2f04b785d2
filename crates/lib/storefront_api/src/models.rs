//! Request and response bodies.

use serde::{Deserialize, Serialize};
use storefront_core::models::item::{Item, ItemChanges, NewItem};
use storefront_core::models::user::{Account, User};
use validator::Validate;

/// Error body returned by every failing request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Plain `{"message": ...}` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// OAuth2 password-flow login form. `username` carries the email.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// Registration and full user replacement body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserPost {
    #[validate(length(min = 3, max = 25))]
    pub name: String,
    #[validate(email, length(min = 3, max = 50))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Public view of a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
        }
    }
}

/// A user with their purchases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserGet {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub items_bought: Vec<ItemGet>,
}

impl From<Account> for UserGet {
    fn from(a: Account) -> Self {
        Self {
            id: a.user.id,
            name: a.user.name,
            email: a.user.email,
            items_bought: a.items_bought.into_iter().map(ItemGet::from).collect(),
        }
    }
}

/// Item creation body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ItemPost {
    #[validate(length(min = 2, max = 21))]
    pub name: String,
    #[validate(length(min = 6, max = 100))]
    pub description: String,
    #[validate(range(exclusive_min = 0.0, max = 1000.0))]
    pub price: f64,
}

impl From<ItemPost> for NewItem {
    fn from(p: ItemPost) -> Self {
        Self {
            name: p.name,
            description: p.description,
            price: p.price,
        }
    }
}

/// Partial item update body; omitted fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ItemUpdate {
    #[validate(length(min = 2, max = 21))]
    pub name: Option<String>,
    #[validate(length(min = 6, max = 100))]
    pub description: Option<String>,
    #[validate(range(exclusive_min = 0.0, max = 1000.0))]
    pub price: Option<f64>,
}

impl From<ItemUpdate> for ItemChanges {
    fn from(u: ItemUpdate) -> Self {
        Self {
            name: u.name,
            description: u.description,
            price: u.price,
        }
    }
}

/// Public view of an item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemGet {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
}

impl From<Item> for ItemGet {
    fn from(i: Item) -> Self {
        Self {
            id: i.id,
            name: i.name,
            description: i.description,
            price: i.price,
        }
    }
}

/// Owner of an item, as listed by `show_owner`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemOwner {
    pub name: String,
    pub email: String,
}

impl From<User> for ItemOwner {
    fn from(u: User) -> Self {
        Self {
            name: u.name,
            email: u.email,
        }
    }
}

/// `GET /items/price_avg` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceAverageResponse {
    pub price_avg: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str, email: &str, password: &str) -> UserPost {
        UserPost {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn user_post_rules() {
        assert!(user("alice", "alice@example.com", "s3cret!").validate().is_ok());
        assert!(user("al", "alice@example.com", "pw").validate().is_err());
        assert!(user(&"a".repeat(26), "alice@example.com", "pw").validate().is_err());
        assert!(user("alice", "not-an-email", "pw").validate().is_err());
        assert!(user("alice", "alice@example.com", "").validate().is_err());
    }

    #[test]
    fn item_post_rules() {
        let ok = ItemPost {
            name: "Lamp".into(),
            description: "A desk lamp".into(),
            price: 1000.0,
        };
        assert!(ok.validate().is_ok());

        let free = ItemPost { price: 0.0, ..ok.clone() };
        assert!(free.validate().is_err());

        let pricey = ItemPost { price: 1000.01, ..ok.clone() };
        assert!(pricey.validate().is_err());

        let short = ItemPost {
            description: "tiny".into(),
            ..ok
        };
        assert!(short.validate().is_err());
    }

    #[test]
    fn item_update_checks_only_present_fields() {
        assert!(ItemUpdate::default().validate().is_ok());
        let update = ItemUpdate {
            price: Some(-1.0),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn token_response_shape() {
        let json = serde_json::to_value(TokenResponse::bearer("abc".into())).unwrap();
        assert_eq!(json, serde_json::json!({"access_token": "abc", "token_type": "bearer"}));
    }
}
