//! Product domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cartwheel_core::{Price, ProductId, UserId};

/// A catalog product (domain type).
///
/// Each product is owned by the user who created it; only the owner may edit
/// or delete it.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Unit price.
    pub price: Price,
    /// Long-form description.
    pub description: String,
    /// Path of the stored image, relative to the data directory.
    pub image_path: String,
    /// User who owns (created) this product.
    pub owner_id: UserId,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A value copy of a product's fields, taken at checkout time.
///
/// Orders embed snapshots rather than references so that later edits or
/// deletions of the product never change order history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    /// ID of the product the snapshot was taken from.
    pub id: ProductId,
    /// Title at checkout time.
    pub title: String,
    /// Unit price at checkout time.
    pub price: Price,
    /// Description at checkout time.
    pub description: String,
}

impl From<&Product> for ProductSnapshot {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            title: product.title.clone(),
            price: product.price,
            description: product.description.clone(),
        }
    }
}
