//! Cart repository for database operations.
//!
//! A cart is the set of `cart_items` rows for one user. The primary key
//! `(user_id, product_id)` plus the upsert in [`CartRepository::add`] gives
//! merge-on-add semantics: adding a product already in the cart increments
//! its quantity instead of creating a second line.

use sqlx::PgPool;

use cartwheel_core::{ProductId, UserId};

use super::RepositoryError;
use crate::models::cart::CartLine;
use crate::models::product::Product;

/// Raw row for a cart line joined with its product.
#[derive(sqlx::FromRow)]
struct CartLineRow {
    #[sqlx(flatten)]
    product: Product,
    quantity: i32,
}

impl CartLineRow {
    fn into_line(self) -> Result<CartLine, RepositoryError> {
        let quantity = super::cart_quantity(self.quantity).ok_or_else(|| {
            RepositoryError::DataCorruption(format!(
                "non-positive cart quantity {} for product {}",
                self.quantity, self.product.id
            ))
        })?;

        Ok(CartLine {
            product: self.product,
            quantity,
        })
    }
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the user's populated cart lines, joined with live products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lines_for_user(&self, user_id: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            r"
            SELECT p.id, p.title, p.price, p.description, p.image_path,
                   p.owner_id, p.created_at, p.updated_at,
                   ci.quantity
            FROM cart_items ci
            JOIN products p ON p.id = ci.product_id
            WHERE ci.user_id = $1
            ORDER BY ci.added_at ASC
            ",
        )
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(CartLineRow::into_line).collect()
    }

    /// Add one unit of a product to the cart (merge-on-add).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add(&self, user_id: UserId, product_id: ProductId) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO cart_items (user_id, product_id, quantity)
            VALUES ($1, $2, 1)
            ON CONFLICT (user_id, product_id)
            DO UPDATE SET quantity = cart_items.quantity + 1
            ",
        )
        .bind(user_id.as_i32())
        .bind(product_id.as_i32())
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::Database(e)
        })?;

        Ok(())
    }

    /// Remove a product's line from the cart entirely.
    ///
    /// Removing a product that isn't in the cart is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn remove(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            DELETE FROM cart_items
            WHERE user_id = $1 AND product_id = $2
            ",
        )
        .bind(user_id.as_i32())
        .bind(product_id.as_i32())
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
