//! # storefront_api
//!
//! HTTP API library for Storefront.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use sqlx::PgPool;
use storefront_core::auth::AuthError;
use storefront_core::auth::jwt::TokenCodec;
use storefront_core::auth::password::PasswordHasher;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{auth, hello, items, users};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool.
    pub pool: PgPool,
    /// API configuration.
    pub config: ApiConfig,
    /// Access token signer/verifier, built once from `config`.
    pub codec: Arc<TokenCodec>,
    /// Password hasher with the configured work factor.
    pub hasher: PasswordHasher,
}

impl AppState {
    /// Build state from configuration. Fails if the signing settings are invalid.
    pub fn new(pool: PgPool, config: ApiConfig) -> Result<Self, AuthError> {
        let codec = Arc::new(config.token_codec()?);
        let hasher = config.password_hasher();
        Ok(Self {
            pool,
            config,
            codec,
            hasher,
        })
    }
}

/// Run embedded database migrations.
///
/// Delegates to `storefront_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    storefront_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let public = Router::new()
        .route("/", get(hello::hello_world))
        .route("/auth/login", post(auth::login_handler))
        .route(
            "/users",
            get(users::list_users_handler).post(users::create_user_handler),
        )
        .route("/items", get(items::list_items_handler))
        .route("/items/price_avg", get(items::price_average_handler))
        .route("/items/show_owner/{item_id}", get(items::show_owner_handler))
        .route("/items/{item_id}", get(items::get_item_handler));

    // Protected routes (require auth)
    let protected = Router::new()
        .route("/users/me", get(users::me_handler))
        .route(
            "/users/{user_id}",
            put(users::update_user_handler).delete(users::delete_user_handler),
        )
        .route(
            "/users/{user_id}/{item_id}",
            put(users::purchase_handler).delete(users::remove_purchase_handler),
        )
        .route("/items", post(items::create_item_handler))
        .route(
            "/items/{item_id}",
            put(items::update_item_handler).delete(items::delete_item_handler),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use sqlx::postgres::PgPoolOptions;

    use super::*;

    fn config() -> ApiConfig {
        ApiConfig {
            bind_addr: "127.0.0.1:0".into(),
            pg_connection_url: "postgres://localhost:5432/storefront".into(),
            jwt_secret: "test-secret".into(),
            jwt_algorithm: "HS256".into(),
            access_token_ttl_minutes: 60,
            bcrypt_cost: 4,
        }
    }

    #[tokio::test]
    async fn state_rejects_bad_algorithm() {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost:5432/storefront")
            .unwrap();
        let mut bad = config();
        bad.jwt_algorithm = "none".into();
        assert!(AppState::new(pool.clone(), bad).is_err());
        assert!(AppState::new(pool, config()).is_ok());
    }

    #[tokio::test]
    async fn state_exposes_the_settings_it_was_built_from() {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost:5432/storefront")
            .unwrap();
        let state = AppState::new(pool, config()).unwrap();
        assert_eq!(state.config.bind_addr, "127.0.0.1:0");
        assert_eq!(state.config.jwt_algorithm, "HS256");
        assert_eq!(
            state.codec.default_ttl(),
            chrono::Duration::minutes(state.config.access_token_ttl_minutes)
        );
        assert_eq!(state.hasher.cost(), state.config.bcrypt_cost);
    }

    #[tokio::test]
    async fn router_builds_without_route_conflicts() {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost:5432/storefront")
            .unwrap();
        let _ = router(AppState::new(pool, config()).unwrap());
    }
}
