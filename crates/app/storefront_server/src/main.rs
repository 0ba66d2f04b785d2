//! Storefront API server binary.

use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use storefront_api::config::ApiConfig;
use storefront_core::auth::jwt::{
    DEFAULT_ACCESS_TOKEN_TTL_MINUTES, DEFAULT_ALGORITHM, resolve_jwt_secret,
};
use storefront_core::auth::password::DEFAULT_COST;
use tracing::info;

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "storefront_server", about = "Storefront API server")]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:8000")]
    bind_addr: String,

    /// PostgreSQL connection URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://localhost:5432/storefront"
    )]
    database_url: String,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,

    /// Seconds to wait for a pooled connection before failing the request.
    #[arg(long, default_value_t = 30)]
    acquire_timeout_secs: u64,

    /// JWT signing algorithm (HS256, HS384 or HS512).
    #[arg(long, env = "JWT_ALGORITHM", default_value = DEFAULT_ALGORITHM)]
    jwt_algorithm: String,

    /// Access token lifetime in minutes.
    #[arg(long, env = "ACCESS_TOKEN_EXPIRE_MINUTES", default_value_t = DEFAULT_ACCESS_TOKEN_TTL_MINUTES)]
    access_token_expire_minutes: i64,

    /// bcrypt work factor.
    #[arg(long, env = "BCRYPT_COST", default_value_t = DEFAULT_COST)]
    bcrypt_cost: u32,

    /// Skip running embedded migrations at startup.
    #[arg(long, default_value_t = false)]
    no_migrate: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(
                    "info,storefront_api=debug,storefront_core=debug,tower_http=info",
                )
            }),
        )
        .init();

    let args = Args::parse();

    info!(
        version = storefront_core::version(),
        bind_addr = %args.bind_addr,
        "starting storefront_server"
    );
    info!(max_connections = args.max_connections, "configuring connection pool");

    let pool = PgPoolOptions::new()
        .max_connections(args.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(args.acquire_timeout_secs))
        .connect(&args.database_url)
        .await?;

    if args.no_migrate {
        info!("skipping database migrations");
    } else {
        info!("running database migrations");
        storefront_api::migrate(&pool).await?;
    }

    let config = ApiConfig {
        bind_addr: args.bind_addr,
        pg_connection_url: args.database_url,
        jwt_secret: resolve_jwt_secret(),
        jwt_algorithm: args.jwt_algorithm,
        access_token_ttl_minutes: args.access_token_expire_minutes,
        bcrypt_cost: args.bcrypt_cost,
    };

    let state = storefront_api::AppState::new(pool, config)?;
    info!(
        algorithm = %state.config.jwt_algorithm,
        ttl_minutes = state.config.access_token_ttl_minutes,
        bcrypt_cost = state.hasher.cost(),
        "auth configured"
    );

    let listener = tokio::net::TcpListener::bind(&state.config.bind_addr).await?;
    let app = storefront_api::router(state);
    let local_addr = listener.local_addr()?;
    info!(addr = %local_addr, "REST API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    Ok(())
}
