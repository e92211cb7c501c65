//! Common library for the movie catalog backend
//!
//! This crate provides shared functionality used by the auth and catalog
//! services: database connectivity, the Redis-backed session store, roles,
//! error types, validation helpers, and listener settings.
//!
//! ```rust,no_run
//! use common::cache::{RedisConfig, RedisPool};
//! use common::database::{DatabaseConfig, health_check, init_pool};
//! use common::session::{SessionConfig, SessionStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = init_pool(&DatabaseConfig::from_env()?).await?;
//!     assert!(health_check(&pool).await?);
//!
//!     let redis = RedisPool::new(&RedisConfig::from_env()?)?;
//!     let sessions = SessionStore::new(redis, SessionConfig::from_env());
//!     assert!(sessions.health_check().await?);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod database;
pub mod error;
pub mod role;
pub mod session;
pub mod settings;
pub mod validation;

pub use role::Role;
