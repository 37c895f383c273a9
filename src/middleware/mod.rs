use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;

use crate::{
    AppState,
    error::{AppError, Result},
    models::AdminSession,
    utils::{extractors, jwt},
};

pub const SESSION_COOKIE: &str = "admin_session";

pub fn resolve_session(jar: &CookieJar, secret: &str) -> Result<AdminSession> {
    let cookie = jar
        .get(SESSION_COOKIE)
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

    let claims = jwt::verify_token(cookie.value(), secret)?;

    extractors::session_from_claims(&claims)
}

/// Guards `/admin/*`: resolves the session cookie into an [`AdminSession`]
/// extension or sends the browser to the login page.
pub async fn require_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    match resolve_session(&jar, &state.sessions.jwt_secret) {
        Ok(session) => {
            req.extensions_mut().insert(session);
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!("Rejected admin request to {}: {}", req.uri().path(), e);
            Redirect::to("/login").into_response()
        }
    }
}
