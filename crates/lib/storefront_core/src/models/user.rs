//! User domain models.

use serde::{Deserialize, Serialize};

use super::item::Item;

/// Domain user, without its credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// A user together with the items they have bought.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(flatten)]
    pub user: User,
    pub items_bought: Vec<Item>,
}

impl Account {
    pub fn id(&self) -> i64 {
        self.user.id
    }

    pub fn owns(&self, item_id: i64) -> bool {
        self.items_bought.iter().any(|i| i.id == item_id)
    }
}

/// Fields for a new user. `password_hash` is already a bcrypt verifier.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}
