//! Session resolution for protected catalog routes

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use axum_extra::extract::CookieJar;

use crate::{error::CatalogError, state::AppState};

/// Require a live session cookie
///
/// The resolved `SessionData` is placed in the request extensions for
/// handlers to pass on explicitly.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, CatalogError> {
    let session = state
        .sessions
        .resolve(&jar)
        .await?
        .ok_or(CatalogError::Unauthorized)?;

    req.extensions_mut().insert(session);

    Ok(next.run(req).await)
}
