use anyhow::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod error;
mod middleware;
mod models;
mod password;
mod rate_limiter;
mod repositories;
mod routes;
mod service;
mod validation;

use common::{
    cache::{RedisConfig, RedisPool},
    database::{DatabaseConfig, init_pool},
    session::{SessionConfig, SessionStore},
    settings::ServerSettings,
};
use sqlx::PgPool;
use tokio::net::TcpListener;

use crate::{
    rate_limiter::{LoginThrottle, ThrottleConfig},
    repositories::PgAccountRepository,
    service::AccountService,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub sessions: SessionStore,
    pub accounts: AccountService<PgAccountRepository>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting authentication service");

    let settings = ServerSettings::load("AUTH", 3000)?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    // Initialize Redis-backed sessions
    let redis_pool = RedisPool::new(&RedisConfig::from_env()?)?;
    let sessions = SessionStore::new(redis_pool, SessionConfig::from_env());

    let accounts = AccountService::new(
        PgAccountRepository::new(pool.clone()),
        LoginThrottle::new(ThrottleConfig::default()),
    );

    let app_state = AppState {
        db_pool: pool,
        sessions,
        accounts,
    };

    let app = routes::create_router(app_state);

    let address = settings.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("Authentication service listening on {}", address);

    axum::serve(listener, app).await?;

    Ok(())
}
