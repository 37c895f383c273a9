mod admin;
mod health;
mod login;

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{get, post},
};

use crate::{AppState, middleware::require_admin};

pub fn create_router(state: &AppState) -> Router<AppState> {
    let admin = Router::new()
        .route(
            "/products",
            get(admin::list_products).post(admin::create_product),
        )
        .route("/products/new", get(admin::add_product_form))
        .route("/products/{id}", post(admin::update_product))
        .route("/products/{id}/edit", get(admin::edit_product_form))
        .route("/products/{id}/delete", post(admin::delete_product))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .route("/", get(|| async { Redirect::to("/admin/products") }))
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/login", get(login::login_page).post(login::login))
        .route("/logout", post(login::logout))
        .nest("/admin", admin)
}
