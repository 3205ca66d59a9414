//! PDF rendering for invoices.
//!
//! One A4 document per order: a header block, one row per order line, and
//! the grand total. Long orders spill onto continuation pages.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use rust_decimal::Decimal;

use crate::models::Order;

const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);
const MARGIN_LEFT: f32 = 20.0;
const LINE_HEIGHT: f32 = 8.0;
const BOTTOM_MARGIN: f32 = 25.0;

// Column positions, in mm from the left edge.
const COL_TITLE: f32 = MARGIN_LEFT;
const COL_QTY: f32 = 120.0;
const COL_UNIT: f32 = 140.0;
const COL_TOTAL: f32 = 170.0;

/// Render the order as a PDF invoice.
///
/// # Errors
///
/// Returns the underlying PDF library error message if document assembly
/// or serialization fails.
pub fn render(order: &Order) -> Result<Vec<u8>, String> {
    let title = format!("Invoice #{}", order.id);
    let (doc, page, layer) = PdfDocument::new(&title, PAGE_WIDTH, PAGE_HEIGHT, "invoice");

    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| e.to_string())?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| e.to_string())?;

    let mut layer = doc.get_page(page).get_layer(layer);
    let mut y = 270.0;

    // Header
    layer.use_text("Cartwheel", 22.0, Mm(MARGIN_LEFT), Mm(y), &bold);
    y -= LINE_HEIGHT * 1.5;
    layer.use_text(&title, 14.0, Mm(MARGIN_LEFT), Mm(y), &bold);
    y -= LINE_HEIGHT;
    layer.use_text(
        format!("Date: {}", order.created_at.format("%Y-%m-%d")),
        10.0,
        Mm(MARGIN_LEFT),
        Mm(y),
        &regular,
    );
    y -= LINE_HEIGHT;
    layer.use_text(
        format!("Billed to: {}", order.email),
        10.0,
        Mm(MARGIN_LEFT),
        Mm(y),
        &regular,
    );
    y -= LINE_HEIGHT * 2.0;

    // Column headers
    write_row(&layer, &bold, y, "Item", "Qty", "Unit", "Total");
    y -= LINE_HEIGHT;

    // One row per line, paginating as needed.
    for line in &order.lines {
        if y < BOTTOM_MARGIN {
            let (next_page, next_layer) = doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, "invoice");
            layer = doc.get_page(next_page).get_layer(next_layer);
            y = 270.0;

            write_row(&layer, &bold, y, "Item", "Qty", "Unit", "Total");
            y -= LINE_HEIGHT;
        }

        write_row(
            &layer,
            &regular,
            y,
            &line.product.title,
            &line.quantity.to_string(),
            &money(line.product.price.amount()),
            &money(line.total()),
        );
        y -= LINE_HEIGHT;
    }

    // Grand total
    y -= LINE_HEIGHT;
    layer.use_text("Total", 12.0, Mm(COL_UNIT), Mm(y), &bold);
    layer.use_text(money(order.total()), 12.0, Mm(COL_TOTAL), Mm(y), &bold);

    doc.save_to_bytes().map_err(|e| e.to_string())
}

fn write_row(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    y: f32,
    title: &str,
    qty: &str,
    unit: &str,
    total: &str,
) {
    layer.use_text(title, 10.0, Mm(COL_TITLE), Mm(y), font);
    layer.use_text(qty, 10.0, Mm(COL_QTY), Mm(y), font);
    layer.use_text(unit, 10.0, Mm(COL_UNIT), Mm(y), font);
    layer.use_text(total, 10.0, Mm(COL_TOTAL), Mm(y), font);
}

fn money(amount: Decimal) -> String {
    format!("${amount:.2}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use cartwheel_core::{Email, OrderId, Price, ProductId, UserId};

    use crate::models::order::OrderLine;
    use crate::models::product::ProductSnapshot;

    use super::*;

    fn line(title: &str, cents: i64, quantity: u32) -> OrderLine {
        OrderLine {
            product: ProductSnapshot {
                id: ProductId::new(1),
                title: title.to_string(),
                price: Price::new(Decimal::new(cents, 2)).unwrap(),
                description: String::new(),
            },
            quantity,
        }
    }

    fn order(lines: Vec<OrderLine>) -> Order {
        Order {
            id: OrderId::new(42),
            user_id: UserId::new(1),
            email: Email::parse("buyer@example.com").unwrap(),
            lines,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn renders_a_valid_pdf() {
        let bytes = render(&order(vec![line("Walnut Desk", 24_999, 1)])).unwrap();

        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn long_orders_paginate() {
        let lines = (0..80).map(|i| line(&format!("Item {i}"), 999, 2)).collect();

        let single = render(&order(vec![line("Item", 999, 2)])).unwrap();
        let long = render(&order(lines)).unwrap();

        assert!(long.starts_with(b"%PDF"));
        assert!(long.len() > single.len());
    }

    #[test]
    fn money_keeps_two_decimal_places() {
        assert_eq!(money(Decimal::new(2498, 2)), "$24.98");
        assert_eq!(money(Decimal::new(500, 2)), "$5.00");
    }
}
