//! Domain models for the storefront.
//!
//! These types represent validated domain objects separate from raw
//! database rows and template view types.

pub mod cart;
pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use cart::CartLine;
pub use order::{Order, OrderLine};
pub use product::{Product, ProductSnapshot};
pub use session::{CurrentUser, session_keys};
pub use user::User;
