//! HTTP surface: route registration and shared application state.
//!
//! Authorization is declared here, at registration time. Route groups carry
//! an [`AllowedRoles`] allow-list; the auth middleware resolves the caller
//! once per request and the role middleware checks it against the group's
//! list. Handlers never re-check roles.

pub mod auth;
pub mod cart;
pub mod category;
pub mod dashboard;
pub mod health;
pub mod menu;
pub mod orders;
pub mod users;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use sqlx::SqlitePool;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::config::Config;
use crate::middleware::{require_auth, require_roles, AllowedRoles};
use crate::models::Role;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
}

const CUSTOMER_ONLY: AllowedRoles = AllowedRoles(&[Role::Customer]);
const STAFF_AND_ADMIN: AllowedRoles = AllowedRoles(&[Role::Admin, Role::Staff]);
const ADMIN_ONLY: AllowedRoles = AllowedRoles(&[Role::Admin]);

/// Build the full application router
pub fn router(state: AppState) -> Router {
    // Cart and checkout belong to customers alone; staff accounts order
    // nothing.
    let customer = Router::new()
        .route("/api/cart", get(cart::get_cart).delete(cart::clear_cart))
        .route("/api/cart/items", post(cart::add_item))
        .route(
            "/api/cart/items/{menu_item_id}",
            put(cart::update_item).delete(cart::remove_item),
        )
        .route("/api/orders/checkout", post(orders::checkout))
        .route("/api/orders/my-orders", get(orders::my_orders))
        .route("/api/orders/{id}/cancel", post(orders::cancel_order))
        .route_layer(from_fn_with_state(CUSTOMER_ONLY, require_roles));

    let staff = Router::new()
        .route("/api/orders/admin/search", get(orders::search_orders))
        .route("/api/orders/{id}/status", put(orders::update_status))
        .route("/api/admin/categories", post(category::create_category))
        .route(
            "/api/admin/categories/{id}",
            put(category::update_category).delete(category::delete_category),
        )
        .route("/api/admin/menu", post(menu::create_menu_item))
        .route(
            "/api/admin/menu/{id}",
            put(menu::update_menu_item).delete(menu::delete_menu_item),
        )
        .route(
            "/api/admin/menu/{id}/availability",
            put(menu::set_availability),
        )
        .route("/api/admin/menu/{id}/image", post(menu::upload_menu_image))
        .route_layer(from_fn_with_state(STAFF_AND_ADMIN, require_roles));

    let admin = Router::new()
        .route("/api/admin/users", get(users::list_users))
        .route("/api/admin/users/{id}/role", put(users::set_role))
        .route("/api/admin/users/{id}/enabled", put(users::set_enabled))
        .route("/api/admin/dashboard", get(dashboard::dashboard))
        .route_layer(from_fn_with_state(ADMIN_ONLY, require_roles));

    // Any authenticated caller, no role list declared
    let shared = Router::new()
        .route("/api/auth/logout-all", post(auth::logout_all))
        .route(
            "/api/users/profile",
            get(users::get_profile).put(users::update_profile),
        )
        .route("/api/users/profile/image", post(users::upload_profile_image))
        .route("/api/users/password", put(users::change_password))
        .route("/api/categories", get(category::list_categories))
        .route("/api/categories/{id}", get(category::get_category))
        .route("/api/menu", get(menu::list_menu_items))
        .route("/api/menu/{id}", get(menu::get_menu_item))
        .route("/api/orders/{id}", get(orders::get_order));

    let protected = customer
        .merge(staff)
        .merge(admin)
        .merge(shared)
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let public = Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/logout", post(auth::logout));

    let probes = Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .with_state(state.pool.clone());

    Router::new()
        .merge(protected)
        .merge(public)
        .with_state(state.clone())
        .merge(probes)
        .nest_service("/uploads", ServeDir::new(&state.config.upload.dir))
        .layer(TraceLayer::new_for_http())
}
