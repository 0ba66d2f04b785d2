//! # storefront_core
//!
//! Core domain logic for Storefront: password hashing, access tokens,
//! identity resolution, and user/item persistence.

pub mod auth;
pub mod items;
pub mod migrate;
pub mod models;
pub mod users;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
