//! Checkout service.
//!
//! Turns a cart into an order. The heavy lifting (row locks, snapshotting,
//! the atomic insert-and-clear) lives in
//! [`OrderRepository::place_from_cart`]; this service adds the domain rule
//! that an empty cart cannot be checked out.

use sqlx::PgPool;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::db::orders::OrderRepository;
use crate::models::Order;
use crate::models::session::CurrentUser;

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart has no lines; there is nothing to order.
    #[error("cannot check out an empty cart")]
    EmptyCart,

    /// Database operation failed.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Checkout service.
pub struct CheckoutService<'a> {
    orders: OrderRepository<'a>,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            orders: OrderRepository::new(pool),
        }
    }

    /// Place an order from the user's current cart.
    ///
    /// On success the cart is empty and the returned order carries a
    /// snapshot of every line as it was priced at this moment. Later edits
    /// to the products do not reach into the order.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` if the cart has no lines.
    /// Returns `CheckoutError::Repository` if the transaction fails; in that
    /// case the cart is left exactly as it was.
    pub async fn place_order(&self, user: &CurrentUser) -> Result<Order, CheckoutError> {
        let order = self
            .orders
            .place_from_cart(user.id, &user.email)
            .await?
            .ok_or(CheckoutError::EmptyCart)?;

        tracing::info!(
            order_id = %order.id,
            user_id = %user.id,
            total = %order.total(),
            "order placed"
        );

        Ok(order)
    }
}
