//! Session middleware for account routes

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use axum_extra::extract::CookieJar;
use tracing::info;

use crate::{AppState, error::AuthError};

/// Resolve the session cookie and expose the `SessionData` to handlers
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let Some(session) = state.sessions.resolve(&jar).await? else {
        info!("Rejecting {} without a live session", req.uri().path());
        return Err(AuthError::Unauthorized);
    };

    req.extensions_mut().insert(session);

    Ok(next.run(req).await)
}
