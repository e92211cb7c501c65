//! Session management using Redis
//!
//! A successful login creates a random session id, stores the signed-in
//! account's identity under `session:{sid}` and hands the id to the client in
//! an HttpOnly cookie. Every service resolves that cookie through the same
//! store, so the catalog service sees sessions issued by the auth service.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use rand::{Rng, distributions::Alphanumeric};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::{cache::RedisPool, role::Role};

const SESSION_ID_LEN: usize = 64;

/// Errors raised while reading or writing sessions
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session store error: {0}")]
    Store(#[from] anyhow::Error),

    #[error("Corrupt session payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Session cookie and lifetime settings
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Name of the cookie carrying the session id
    pub cookie_name: String,
    /// Idle lifetime of a session in seconds
    pub ttl_seconds: u64,
    /// Whether the cookie is marked `Secure`
    pub secure_cookie: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "MOVIE_SESSION".to_string(),
            ttl_seconds: 86_400,
            secure_cookie: false,
        }
    }
}

impl SessionConfig {
    /// Create a new SessionConfig from environment variables
    ///
    /// # Environment Variables
    /// - `SESSION_COOKIE_NAME`: cookie name (default: "MOVIE_SESSION")
    /// - `SESSION_TTL_SECONDS`: idle lifetime (default: 86400)
    /// - `SESSION_COOKIE_SECURE`: "true" to mark the cookie Secure (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let cookie_name = std::env::var("SESSION_COOKIE_NAME").unwrap_or(defaults.cookie_name);

        let ttl_seconds = std::env::var("SESSION_TTL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.ttl_seconds);

        let secure_cookie = std::env::var("SESSION_COOKIE_SECURE")
            .map(|s| s.eq_ignore_ascii_case("true"))
            .unwrap_or(defaults.secure_cookie);

        Self {
            cookie_name,
            ttl_seconds,
            secure_cookie,
        }
    }
}

/// Identity stored for a signed-in account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
    pub issued_at: DateTime<Utc>,
}

impl SessionData {
    pub fn new(user_id: Uuid, username: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            username: username.into(),
            role,
            issued_at: Utc::now(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Redis-backed session store
#[derive(Clone)]
pub struct SessionStore {
    redis_pool: RedisPool,
    config: SessionConfig,
}

impl SessionStore {
    pub fn new(redis_pool: RedisPool, config: SessionConfig) -> Self {
        Self { redis_pool, config }
    }

    /// Persist a new session and return its id
    pub async fn create(&self, data: &SessionData) -> Result<String, SessionError> {
        let session_id = generate_session_id();
        let payload = serde_json::to_string(data)?;

        self.redis_pool
            .set_with_ttl(&session_key(&session_id), &payload, self.config.ttl_seconds)
            .await?;

        info!("Created session for user: {}", data.user_id);
        Ok(session_id)
    }

    /// Load a live session, sliding its expiry forward
    pub async fn load(&self, session_id: &str) -> Result<Option<SessionData>, SessionError> {
        let payload = self
            .redis_pool
            .get_and_refresh(&session_key(session_id), self.config.ttl_seconds)
            .await?;

        match payload {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    /// Drop a session
    pub async fn destroy(&self, session_id: &str) -> Result<(), SessionError> {
        self.redis_pool.delete(&session_key(session_id)).await?;
        Ok(())
    }

    /// Resolve the session referenced by the request cookies, if any
    pub async fn resolve(&self, jar: &CookieJar) -> Result<Option<SessionData>, SessionError> {
        match self.session_id(jar) {
            Some(session_id) => self.load(&session_id).await,
            None => Ok(None),
        }
    }

    /// Session id carried by the request cookies
    pub fn session_id(&self, jar: &CookieJar) -> Option<String> {
        jar.get(&self.config.cookie_name)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
    }

    /// Cookie handing `session_id` to the client
    pub fn session_cookie(&self, session_id: String) -> Cookie<'static> {
        Cookie::build((self.config.cookie_name.clone(), session_id))
            .path("/")
            .http_only(true)
            .secure(self.config.secure_cookie)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::seconds(
                i64::try_from(self.config.ttl_seconds).unwrap_or(i64::MAX),
            ))
            .build()
    }

    /// Cookie that clears the session cookie on the client
    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((self.config.cookie_name.clone(), ""))
            .path("/")
            .build()
    }

    /// Check if the backing store is reachable
    pub async fn health_check(&self) -> anyhow::Result<bool> {
        self.redis_pool.health_check().await
    }
}

fn session_key(session_id: &str) -> String {
    format!("session:{}", session_id)
}

fn generate_session_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_ID_LEN)
        .map(char::from)
        .collect()
}
