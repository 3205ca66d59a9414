//! Cart route handlers.
//!
//! Carts are per-user and require a login; there is no guest cart. Adding a
//! product that is already in the cart bumps its quantity (merge-on-add)
//! rather than creating a second line.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;

use cartwheel_core::ProductId;

use crate::db::RepositoryError;
use crate::db::carts::CartRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::cart::{CartLine, cart_total};
use crate::services::checkout::{CheckoutError, CheckoutService};
use crate::state::AppState;

/// Form data naming a product.
#[derive(Debug, Deserialize)]
pub struct ProductForm {
    pub product_id: i32,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/index.html")]
pub struct CartTemplate {
    pub authenticated: bool,
    pub lines: Vec<CartLine>,
    pub total: Decimal,
    pub error: Option<String>,
}

/// Query parameters for error display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
}

/// Display the cart.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    axum::extract::Query(query): axum::extract::Query<MessageQuery>,
) -> Result<CartTemplate> {
    let lines = CartRepository::new(state.pool())
        .lines_for_user(user.id)
        .await?;
    let total = cart_total(&lines);

    Ok(CartTemplate {
        authenticated: true,
        lines,
        total,
        error: query.error.map(|code| match code.as_str() {
            "empty" => "Your cart is empty.".to_string(),
            _ => "Something went wrong. Please try again.".to_string(),
        }),
    })
}

/// Add one unit of a product to the cart.
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<ProductForm>,
) -> Response {
    let product_id = ProductId::new(form.product_id);

    match CartRepository::new(state.pool()).add(user.id, product_id).await {
        Ok(()) => Redirect::to("/cart").into_response(),
        Err(RepositoryError::NotFound) => Redirect::to("/").into_response(),
        Err(e) => crate::error::AppError::from(e).into_response(),
    }
}

/// Remove a product's line from the cart.
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<ProductForm>,
) -> Result<Redirect> {
    CartRepository::new(state.pool())
        .remove(user.id, ProductId::new(form.product_id))
        .await?;

    Ok(Redirect::to("/cart"))
}

/// Place an order from the cart.
///
/// On success the cart is cleared atomically with the order insert and the
/// user lands on their order history.
pub async fn checkout(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Response {
    match CheckoutService::new(state.pool()).place_order(&user).await {
        Ok(_order) => Redirect::to("/orders").into_response(),
        Err(CheckoutError::EmptyCart) => Redirect::to("/cart?error=empty").into_response(),
        Err(e) => crate::error::AppError::from(e).into_response(),
    }
}
