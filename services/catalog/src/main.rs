use anyhow::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod error;
mod invariants;
mod middleware;
mod models;
mod repositories;
mod routes;
mod service;
mod slug;
mod state;
mod validation;

use common::{
    cache::{RedisConfig, RedisPool},
    database::{DatabaseConfig, init_pool},
    session::{SessionConfig, SessionStore},
    settings::ServerSettings,
};
use tokio::net::TcpListener;

use crate::{repositories::PgMovieRepository, service::CatalogService, state::AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting catalog service");

    let settings = ServerSettings::load("CATALOG", 3001)?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    // Sessions are issued by the auth service; this service only reads them
    let redis_pool = RedisPool::new(&RedisConfig::from_env()?)?;
    let sessions = SessionStore::new(redis_pool, SessionConfig::from_env());

    let app_state = AppState {
        db_pool: pool.clone(),
        sessions,
        catalog: CatalogService::new(PgMovieRepository::new(pool)),
    };

    let app = routes::create_router(app_state);

    let address = settings.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("Catalog service listening on {}", address);

    axum::serve(listener, app).await?;

    Ok(())
}
