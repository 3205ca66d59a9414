//! Product repository for database operations.
//!
//! Mutations are owner-scoped at the SQL level: updates and deletes filter
//! on `owner_id`, so a non-owner can never touch someone else's product even
//! if a handler forgets to check.

use sqlx::PgPool;

use cartwheel_core::{Price, ProductId, UserId};

use super::RepositoryError;
use crate::models::product::Product;

/// Fields for creating a new product.
#[derive(Debug)]
pub struct NewProduct<'a> {
    pub title: &'a str,
    pub price: Price,
    pub description: &'a str,
    pub image_path: &'a str,
    pub owner_id: UserId,
}

/// Fields for updating an existing product.
///
/// `image_path` is `None` when the image is kept unchanged.
#[derive(Debug)]
pub struct ProductChanges<'a> {
    pub title: &'a str,
    pub price: Price,
    pub description: &'a str,
    pub image_path: Option<&'a str>,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List the whole catalog, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(
            r"
            SELECT id, title, price, description, image_path, owner_id, created_at, updated_at
            FROM products
            ORDER BY created_at DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// List the products owned by one user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(
            r"
            SELECT id, title, price, description, image_path, owner_id, created_at, updated_at
            FROM products
            WHERE owner_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(owner_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            r"
            SELECT id, title, price, description, image_path, owner_id, created_at, updated_at
            FROM products
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// Create a new product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, new: NewProduct<'_>) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            r"
            INSERT INTO products (title, price, description, image_path, owner_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, price, description, image_path, owner_id, created_at, updated_at
            ",
        )
        .bind(new.title)
        .bind(new.price)
        .bind(new.description)
        .bind(new.image_path)
        .bind(new.owner_id)
        .fetch_one(self.pool)
        .await?;

        Ok(product)
    }

    /// Update a product, scoped to its owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product matches the
    /// (id, owner) pair - either it doesn't exist or the caller doesn't own it.
    pub async fn update(
        &self,
        id: ProductId,
        owner_id: UserId,
        changes: ProductChanges<'_>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE products
            SET title = $1,
                price = $2,
                description = $3,
                image_path = COALESCE($4, image_path),
                updated_at = now()
            WHERE id = $5 AND owner_id = $6
            ",
        )
        .bind(changes.title)
        .bind(changes.price)
        .bind(changes.description)
        .bind(changes.image_path)
        .bind(id.as_i32())
        .bind(owner_id.as_i32())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete a product, scoped to its owner.
    ///
    /// Cart lines referencing the product are removed by the foreign key.
    ///
    /// # Returns
    ///
    /// The deleted product's image path, or `None` if no product matched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(
        &self,
        id: ProductId,
        owner_id: UserId,
    ) -> Result<Option<String>, RepositoryError> {
        let image_path = sqlx::query_scalar::<_, String>(
            r"
            DELETE FROM products
            WHERE id = $1 AND owner_id = $2
            RETURNING image_path
            ",
        )
        .bind(id.as_i32())
        .bind(owner_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(image_path)
    }
}
