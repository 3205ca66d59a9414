//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Product catalog
//! GET  /health                 - Health check
//!
//! # Products
//! GET  /products/{id}          - Product detail
//!
//! # Cart (requires auth)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add one unit of a product (merge-on-add)
//! POST /cart/remove            - Remove a line
//! POST /cart/checkout          - Place an order from the cart
//!
//! # Orders (requires auth)
//! GET  /orders                 - Order history
//! GET  /orders/{id}/invoice    - PDF invoice (streamed, archived on disk)
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action
//! GET  /auth/register          - Register page
//! POST /auth/register          - Register action
//! POST /auth/logout            - Logout action
//! GET  /auth/forgot-password   - Request a reset link
//! POST /auth/forgot-password   - Send the reset link
//! GET  /auth/reset-password    - Reset form (token in query)
//! POST /auth/reset-password    - Set the new password
//!
//! # Listings (requires auth; owner-scoped)
//! GET  /listings               - Own products
//! GET  /listings/new           - New product form
//! POST /listings               - Create product (multipart, with image)
//! GET  /listings/{id}/edit     - Edit form
//! POST /listings/{id}          - Update product (multipart, image optional)
//! POST /listings/{id}/delete   - Delete product and its image
//! ```

pub mod auth;
pub mod cart;
pub mod listings;
pub mod orders;
pub mod shop;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
        .route(
            "/forgot-password",
            get(auth::forgot_password_page).post(auth::forgot_password),
        )
        .route(
            "/reset-password",
            get(auth::reset_password_page).post(auth::reset_password),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
        .route("/checkout", post(cart::checkout))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}/invoice", get(orders::invoice))
}

/// Create the listing management routes router.
pub fn listing_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(listings::index).post(listings::create))
        .route("/new", get(listings::new_form))
        .route("/{id}", post(listings::update))
        .route("/{id}/edit", get(listings::edit_form))
        .route("/{id}/delete", post(listings::delete))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Catalog
        .route("/", get(shop::home))
        .route("/products/{id}", get(shop::show))
        // Cart
        .nest("/cart", cart_routes())
        // Orders
        .nest("/orders", order_routes())
        // Auth
        .nest("/auth", auth_routes())
        // Listing management
        .nest("/listings", listing_routes())
}
