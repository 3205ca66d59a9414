//! Order repository for database operations.
//!
//! Orders are written once by the checkout service and never mutated; this
//! repository only reads them back. The line snapshots live in a JSONB
//! column and are deserialized into [`OrderLine`] values.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use cartwheel_core::{Email, OrderId, UserId};

use super::RepositoryError;
use crate::models::order::{Order, OrderLine};
use crate::models::product::{Product, ProductSnapshot};

/// Raw row for a cart line locked during checkout.
#[derive(sqlx::FromRow)]
struct CheckoutLineRow {
    #[sqlx(flatten)]
    product: Product,
    quantity: i32,
}

/// Raw row for the `orders` table.
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: i32,
    email: String,
    lines: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self) -> Result<Order, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        let lines: Vec<OrderLine> = serde_json::from_value(self.lines).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order lines for order {}: {e}", self.id))
        })?;

        Ok(Order {
            id: OrderId::new(self.id),
            user_id: UserId::new(self.user_id),
            email,
            lines,
            created_at: self.created_at,
        })
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an order by its ID.
    ///
    /// Visibility is NOT checked here; callers must compare the order's
    /// `user_id` against the requester before exposing it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored snapshot is invalid.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, email, lines, created_at
            FROM orders
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(OrderRow::into_order).transpose()
    }

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, email, lines, created_at
            FROM orders
            WHERE user_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(OrderRow::into_order).collect()
    }

    /// Convert the user's cart into an order, atomically.
    ///
    /// In one transaction: the cart lines are read with `FOR UPDATE` row
    /// locks (serializing concurrent checkouts by the same user), each
    /// product is snapshotted into an [`OrderLine`], the order row is
    /// inserted, and the cart is cleared. Either all of it happens or none
    /// of it does.
    ///
    /// Returns `None` without writing anything if the cart is empty.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; the
    /// transaction is rolled back and the cart is left untouched.
    pub async fn place_from_cart(
        &self,
        user_id: UserId,
        email: &Email,
    ) -> Result<Option<Order>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Lock only the cart rows; locking the joined product rows would
        // serialize checkouts across unrelated users.
        let rows = sqlx::query_as::<_, CheckoutLineRow>(
            r"
            SELECT p.id, p.title, p.price, p.description, p.image_path,
                   p.owner_id, p.created_at, p.updated_at,
                   ci.quantity
            FROM cart_items ci
            JOIN products p ON p.id = ci.product_id
            WHERE ci.user_id = $1
            ORDER BY ci.added_at ASC
            FOR UPDATE OF ci
            ",
        )
        .bind(user_id.as_i32())
        .fetch_all(&mut *tx)
        .await?;

        if rows.is_empty() {
            return Ok(None);
        }

        let lines = rows
            .into_iter()
            .map(|row| {
                let quantity = super::cart_quantity(row.quantity).ok_or_else(|| {
                    RepositoryError::DataCorruption(format!(
                        "non-positive cart quantity {} for product {}",
                        row.quantity, row.product.id
                    ))
                })?;

                Ok(OrderLine {
                    product: ProductSnapshot::from(&row.product),
                    quantity,
                })
            })
            .collect::<Result<Vec<_>, RepositoryError>>()?;

        let lines_json = serde_json::to_value(&lines).map_err(|e| {
            RepositoryError::DataCorruption(format!("failed to serialize order lines: {e}"))
        })?;

        let row = sqlx::query_as::<_, OrderRow>(
            r"
            INSERT INTO orders (user_id, email, lines)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, email, lines, created_at
            ",
        )
        .bind(user_id.as_i32())
        .bind(email.as_ref())
        .bind(lines_json)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r"
            DELETE FROM cart_items
            WHERE user_id = $1
            ",
        )
        .bind(user_id.as_i32())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        row.into_order().map(Some)
    }
}
