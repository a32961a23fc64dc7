//! API route definitions
//!
//! Routes are grouped by guard. Each group carries its own `route_layer`, so
//! a path registered in two groups (GET in one, POST in another) is checked
//! against the guard of the method that matched.

use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::routing::post;
use axum::Router;

use super::auth::reject_login;
use super::auth::require_login;
use super::auth::AccessPolicy;
use super::handlers;
use super::handlers::AppState;
use crate::models::Role;

/// Create the API router
pub fn api_routes(state: AppState) -> Router {
    let policy = |roles: &'static [Role]| AccessPolicy::new(state.sessions.clone(), roles);

    let public = Router::new()
        .route("/ok", get(handlers::ok).post(handlers::ok))
        .route("/vr", get(handlers::verify_redirect));

    let anonymous = Router::new()
        .route("/initiateSignUp", post(handlers::initiate_signup))
        .route("/signup", post(handlers::signup))
        .route("/login", post(handlers::login))
        .route("/forgotPassword", post(handlers::forgot_password))
        .route("/resetPassword", post(handlers::reset_password))
        .route_layer(from_fn_with_state(state.sessions.clone(), reject_login));

    let members = Router::new()
        .route("/login-ok", get(handlers::login_ok).post(handlers::login_ok))
        .route("/logout", get(handlers::logout))
        .route("/editprofile", post(handlers::edit_profile))
        .route("/post", get(handlers::get_post))
        .route("/feed", post(handlers::feed))
        .route("/product", get(handlers::get_product))
        .route("/sale", get(handlers::get_sale))
        .route("/sales", get(handlers::get_sales))
        .route("/order", get(handlers::get_order).post(handlers::create_order))
        .route("/orders", get(handlers::get_orders))
        .route("/address", get(handlers::get_address).post(handlers::add_address))
        .route("/editAddress", post(handlers::edit_address))
        .route("/addresses", get(handlers::get_addresses))
        .route("/feedback", post(handlers::feedback))
        .route("/checkDelivery", get(handlers::check_delivery))
        .route("/placeOrder", post(handlers::place_order))
        .route("/status", get(handlers::get_status))
        .route("/fbtoken", post(handlers::update_push_token))
        .route("/payment-initiate", post(handlers::initiate_payment))
        .route("/cache", get(handlers::get_cache_urls))
        .route_layer(from_fn_with_state(policy(Role::ALL), require_login));

    let staff = Router::new()
        .route("/post", post(handlers::create_post))
        .route("/postlink", post(handlers::create_post_link))
        .route("/product", post(handlers::add_product))
        .route("/sale", post(handlers::add_sale))
        .route_layer(from_fn_with_state(policy(Role::STAFF), require_login));

    let admin = Router::new()
        .route("/cache", post(handlers::update_cache_urls))
        .route("/posts", get(handlers::get_posts))
        .route("/deletePost", post(handlers::delete_post))
        .route_layer(from_fn_with_state(policy(Role::ADMIN), require_login));

    public
        .merge(anonymous)
        .merge(members)
        .merge(staff)
        .merge(admin)
        .with_state(state)
}
