//! Order domain types.
//!
//! An order is a frozen snapshot of a completed checkout. The embedded
//! product data is a value copy taken at checkout time; nothing in this
//! module holds a live reference to the catalog.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cartwheel_core::{Email, OrderId, UserId};

use super::product::ProductSnapshot;

/// One line of an order: a product snapshot and the purchased quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Copy of the product fields at checkout time.
    pub product: ProductSnapshot,
    /// Units purchased; always >= 1.
    pub quantity: u32,
}

impl OrderLine {
    /// Exact line total (`quantity x unit price at checkout`).
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.product.price.line_total(self.quantity)
    }
}

/// An immutable record of a completed checkout.
#[derive(Debug, Clone)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Purchaser's user ID; only this user may view the order.
    pub user_id: UserId,
    /// Purchaser's email at checkout time.
    pub email: Email,
    /// Snapshot lines; non-empty at creation.
    pub lines: Vec<OrderLine>,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Exact total price over all lines.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(OrderLine::total).sum()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cartwheel_core::{Price, ProductId};

    use super::*;

    fn line(title: &str, price: &str, quantity: u32) -> OrderLine {
        OrderLine {
            product: ProductSnapshot {
                id: ProductId::new(1),
                title: title.to_string(),
                price: Price::parse(price).unwrap(),
                description: String::new(),
            },
            quantity,
        }
    }

    #[test]
    fn test_order_total_exact() {
        let order = Order {
            id: OrderId::new(1),
            user_id: cartwheel_core::UserId::new(1),
            email: Email::parse("buyer@example.com").unwrap(),
            lines: vec![line("Widget", "9.99", 2), line("Gadget", "5.00", 1)],
            created_at: Utc::now(),
        };
        assert_eq!(order.total(), Decimal::new(2498, 2));
        assert_eq!(order.unit_count(), 3);
    }

    #[test]
    fn test_order_line_serde_roundtrip() {
        let original = line("Widget", "9.99", 2);
        let json = serde_json::to_string(&original).unwrap();
        let parsed: OrderLine = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, original);
    }
}
