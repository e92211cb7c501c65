//! Account service routes

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, patch, post, put},
};
use axum_extra::extract::CookieJar;
use common::session::SessionData;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    AppState,
    error::AuthError,
    middleware::require_session,
    models::{
        AccountResponse, ChangePasswordRequest, LoginRequest, RegisterRequest,
        UpdateEmailRequest, UpdateProfileRequest,
    },
};

/// Create the router for the account service
pub fn create_router(state: AppState) -> Router {
    let session_routes = Router::new()
        .route("/api/auth/me", get(me))
        .route("/api/accounts/:id/profile", patch(update_profile))
        .route("/api/accounts/:id/email", put(update_email))
        .route("/api/accounts/:id/password", put(change_password))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .merge(session_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = common::database::health_check(&state.db_pool)
        .await
        .unwrap_or(false);
    let sessions = state.sessions.health_check().await.unwrap_or_else(|e| {
        warn!("Session store health check failed: {}", e);
        false
    });

    let status = if database && sessions {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if status == StatusCode::OK { "ok" } else { "degraded" },
            "service": "auth-service",
            "database": database,
            "sessions": sessions,
        })),
    )
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let account = state.accounts.register(payload).await?;

    Ok((StatusCode::CREATED, Json(account)))
}

/// Check credentials and open a session
///
/// A session already carried by the request is dropped first.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let account = state.accounts.authenticate(payload).await?;

    if let Some(previous) = state.sessions.session_id(&jar) {
        state.sessions.destroy(&previous).await?;
    }

    let session = SessionData::new(account.id, account.username.clone(), account.role);
    let session_id = state.sessions.create(&session).await?;
    let jar = jar.add(state.sessions.session_cookie(session_id));

    Ok((jar, Json(AccountResponse::from(account))))
}

/// Drop the session; succeeds whether or not one exists
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AuthError> {
    if let Some(session_id) = state.sessions.session_id(&jar) {
        state.sessions.destroy(&session_id).await?;
        info!("Session closed");
    }

    let jar = jar.remove(state.sessions.removal_cookie());

    Ok((jar, Json(json!({"message": "Logged out successfully"}))))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(actor): Extension<SessionData>,
) -> Result<impl IntoResponse, AuthError> {
    Ok(Json(state.accounts.current(&actor).await?))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(actor): Extension<SessionData>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AuthError> {
    Ok(Json(state.accounts.update_profile(&actor, id, payload).await?))
}

pub async fn update_email(
    State(state): State<AppState>,
    Extension(actor): Extension<SessionData>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEmailRequest>,
) -> Result<impl IntoResponse, AuthError> {
    Ok(Json(state.accounts.update_email(&actor, id, payload).await?))
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(actor): Extension<SessionData>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AuthError> {
    state.accounts.change_password(&actor, id, payload).await?;

    Ok(StatusCode::NO_CONTENT)
}
