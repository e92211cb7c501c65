//! Catalog service routes

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use common::session::SessionData;
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use crate::{
    error::CatalogError,
    middleware::require_session,
    models::{MovieFilter, MovieQuery, MovieRequest},
    state::AppState,
};

/// Create the router for the catalog service
pub fn create_router(state: AppState) -> Router {
    let session_routes = Router::new()
        .route("/api/movies/:slug/like", post(like_movie))
        .route("/api/admin/movies", post(create_movie))
        .route("/api/admin/movies/:id", put(update_movie).delete(deactivate_movie))
        .route("/api/admin/movies/:id/activate", post(activate_movie))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/movies", get(list_movies))
        .route("/api/movies/:slug", get(get_movie))
        .route("/api/movies/:slug/view", post(view_movie))
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
            "service": "catalog-service",
            "database": database,
            "sessions": sessions,
        })),
    )
}

/// List or search active movies
pub async fn list_movies(
    State(state): State<AppState>,
    Query(query): Query<MovieQuery>,
) -> Result<impl IntoResponse, CatalogError> {
    let filter = query.filter();
    let page = query.page_request();

    let listing = if filter == MovieFilter::default() {
        state.catalog.list(page).await?
    } else {
        state.catalog.search(&filter, page).await?
    };

    Ok(Json(listing))
}

pub async fn get_movie(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, CatalogError> {
    Ok(Json(state.catalog.get_by_slug(&slug).await?))
}

pub async fn view_movie(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, CatalogError> {
    Ok(Json(state.catalog.record_view(&slug).await?))
}

pub async fn like_movie(
    State(state): State<AppState>,
    Extension(actor): Extension<SessionData>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, CatalogError> {
    Ok(Json(state.catalog.record_like(&actor, &slug).await?))
}

pub async fn create_movie(
    State(state): State<AppState>,
    Extension(actor): Extension<SessionData>,
    Json(payload): Json<MovieRequest>,
) -> Result<impl IntoResponse, CatalogError> {
    let movie = state.catalog.create(&actor, payload).await?;

    Ok((StatusCode::CREATED, Json(movie)))
}

pub async fn update_movie(
    State(state): State<AppState>,
    Extension(actor): Extension<SessionData>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MovieRequest>,
) -> Result<impl IntoResponse, CatalogError> {
    Ok(Json(state.catalog.update(&actor, id, payload).await?))
}

/// Soft delete
pub async fn deactivate_movie(
    State(state): State<AppState>,
    Extension(actor): Extension<SessionData>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, CatalogError> {
    state.catalog.deactivate(&actor, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn activate_movie(
    State(state): State<AppState>,
    Extension(actor): Extension<SessionData>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, CatalogError> {
    Ok(Json(state.catalog.activate(&actor, id).await?))
}
