use std::sync::LazyLock;

use axum::{
    Form,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};

use crate::{
    AppState,
    error::{AppError, Result},
    middleware::{SESSION_COOKIE, resolve_session},
    models::{Admin, LoginRequest},
    utils::{
        flash::{Flash, FlashQuery},
        jwt, views,
    },
};

pub async fn login_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(flash): Query<FlashQuery>,
) -> Response {
    if resolve_session(&jar, &state.sessions.jwt_secret).is_ok() {
        return Redirect::to("/admin/products").into_response();
    }

    Html(views::login_page(flash.into_flash().as_ref())).into_response()
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(payload): Form<LoginRequest>,
) -> Response {
    let admin = match authenticate(&state, &payload).await {
        Ok(admin) => admin,
        Err(e) => {
            e.log("log in");
            return Flash::error("Invalid login credentials")
                .redirect("/login")
                .into_response();
        }
    };

    let token = match jwt::generate_token(
        admin.id,
        &admin.email,
        &state.sessions.jwt_secret,
        state.sessions.ttl_hours,
    ) {
        Ok(token) => token,
        Err(e) => {
            e.log("issue session");
            return Flash::error(e.user_message())
                .redirect("/login")
                .into_response();
        }
    };

    tracing::info!(admin_id = admin.id, "Admin logged in");

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    (jar.add(cookie), Redirect::to("/admin/products")).into_response()
}

/// Hash checked against when the email is unknown, so both paths pay for one bcrypt run.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| bcrypt::hash("catalog-admin-dummy-password", bcrypt::DEFAULT_COST).ok());

async fn authenticate(state: &AppState, payload: &LoginRequest) -> Result<Admin> {
    let admin = state.admins.find_by_email(payload.email.trim()).await?;

    let is_valid = verify_password(
        &payload.password,
        admin.as_ref().map(|admin| admin.password.as_str()),
    )?;

    match admin {
        Some(admin) if is_valid => Ok(admin),
        _ => Err(AppError::Unauthorized(
            "Invalid email or password".to_string(),
        )),
    }
}

fn verify_password(password: &str, stored_hash: Option<&str>) -> Result<bool> {
    let Some(hash) = stored_hash else {
        if let Some(dummy) = DUMMY_HASH.as_deref() {
            let _ = bcrypt::verify(password, dummy);
        }
        return Ok(false);
    };

    bcrypt::verify(password, hash)
        .map_err(|e| AppError::InternalError(format!("Password verification failed: {}", e)))
}

pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/"));

    (jar, Redirect::to("/login"))
}
