//! User domain types.

use chrono::{DateTime, Utc};

use cartwheel_core::{Email, UserId};

/// A storefront user (domain type).
///
/// The password hash and reset-token fields never leave the repository
/// layer; handlers and services only ever see this type.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}
