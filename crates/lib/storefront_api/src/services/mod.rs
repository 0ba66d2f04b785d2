//! Business rules between handlers and `storefront_core` queries.

pub mod auth;
pub mod items;
pub mod users;
