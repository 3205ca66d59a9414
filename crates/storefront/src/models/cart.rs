//! Cart domain types.

use rust_decimal::Decimal;

use super::product::Product;

/// A populated cart line: the live product joined with its quantity.
///
/// Cart lines reference live products; a foreign key removes lines whose
/// product has been deleted, so a line always resolves.
#[derive(Debug, Clone)]
pub struct CartLine {
    /// The referenced product.
    pub product: Product,
    /// Units in the cart; always >= 1.
    pub quantity: u32,
}

impl CartLine {
    /// Exact line total (`quantity x unit price`).
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.product.price.line_total(self.quantity)
    }
}

/// Exact sum over a set of cart lines.
#[must_use]
pub fn cart_total(lines: &[CartLine]) -> Decimal {
    lines.iter().map(CartLine::total).sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cartwheel_core::{Price, ProductId, UserId};
    use chrono::Utc;

    use super::*;

    fn product(title: &str, price: &str) -> Product {
        Product {
            id: ProductId::new(1),
            title: title.to_string(),
            price: Price::parse(price).unwrap(),
            description: String::new(),
            image_path: String::new(),
            owner_id: UserId::new(1),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_line_total() {
        let line = CartLine {
            product: product("Widget", "9.99"),
            quantity: 2,
        };
        assert_eq!(line.total(), Decimal::new(1998, 2));
    }

    #[test]
    fn test_cart_total_exact() {
        let lines = vec![
            CartLine {
                product: product("Widget", "9.99"),
                quantity: 2,
            },
            CartLine {
                product: product("Gadget", "5.00"),
                quantity: 1,
            },
        ];
        assert_eq!(cart_total(&lines), Decimal::new(2498, 2));
    }
}
