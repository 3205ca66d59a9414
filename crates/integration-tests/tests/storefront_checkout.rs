//! Integration tests for the cart and checkout flow.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The storefront running (cargo run -p cartwheel-storefront)
//!
//! Run with: cargo test -p cartwheel-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use uuid::Uuid;

use cartwheel_integration_tests::{browser_client, storefront_base_url};

const PASSWORD: &str = "integration-test-pw";

/// A tiny but valid PNG (1x1 transparent pixel).
const PNG_PIXEL: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x62, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// Sign up a fresh user; the client's cookie jar ends up logged in.
async fn sign_up(client: &Client) -> String {
    let email = format!("it-{}@example.com", Uuid::new_v4());
    let resp = client
        .post(format!("{}/auth/register", storefront_base_url()))
        .form(&[
            ("email", email.as_str()),
            ("password", PASSWORD),
            ("password_confirm", PASSWORD),
        ])
        .send()
        .await
        .expect("Failed to register");

    assert!(
        resp.status().is_redirection(),
        "registration should redirect, got {}",
        resp.status()
    );
    email
}

/// Create a listing owned by the client's user, returning its title.
async fn create_listing(client: &Client, price: &str) -> String {
    let title = format!("Test Item {}", Uuid::new_v4());

    let form = reqwest::multipart::Form::new()
        .text("title", title.clone())
        .text("price", price.to_string())
        .text("description", "Created by the integration suite.")
        .part(
            "image",
            reqwest::multipart::Part::bytes(PNG_PIXEL.to_vec())
                .file_name("pixel.png")
                .mime_str("image/png")
                .expect("valid mime"),
        );

    let resp = client
        .post(format!("{}/listings", storefront_base_url()))
        .multipart(form)
        .send()
        .await
        .expect("Failed to create listing");

    assert!(
        resp.status().is_redirection(),
        "listing creation should redirect, got {}",
        resp.status()
    );
    title
}

/// Find the product id for a title on the catalog page.
async fn find_product_id(client: &Client, title: &str) -> String {
    let body = client
        .get(storefront_base_url())
        .send()
        .await
        .expect("Failed to load catalog")
        .text()
        .await
        .expect("Failed to read catalog");

    let title_pos = body.find(title).expect("product should be on the catalog");
    let prefix = &body[..title_pos];
    let link_pos = prefix
        .rfind("/products/")
        .expect("product link should precede the title");

    let id: String = body[link_pos + "/products/".len()..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    assert!(!id.is_empty(), "product link should carry an id");
    id
}

/// Find the first invoice link on the orders page.
async fn find_invoice_path(client: &Client) -> String {
    let body = client
        .get(format!("{}/orders", storefront_base_url()))
        .send()
        .await
        .expect("Failed to load orders")
        .text()
        .await
        .expect("Failed to read orders");

    let invoice_pos = body.find("/invoice").expect("orders page should link an invoice");
    let prefix = &body[..invoice_pos];
    let start = prefix.rfind("/orders/").expect("invoice link should be under /orders/");

    body[start..invoice_pos + "/invoice".len()].to_string()
}

// ============================================================================
// Cart & Checkout
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn purchase_flow_end_to_end() {
    let base = storefront_base_url();

    // Seller lists a product.
    let seller = browser_client();
    sign_up(&seller).await;
    let title = create_listing(&seller, "9.99").await;

    // Buyer puts three units in the cart: two adds of the same product
    // must merge into one line with quantity 2, then one more.
    let buyer = browser_client();
    sign_up(&buyer).await;
    let product_id = find_product_id(&buyer, &title).await;

    for _ in 0..3 {
        let resp = buyer
            .post(format!("{base}/cart/add"))
            .form(&[("product_id", product_id.as_str())])
            .send()
            .await
            .expect("Failed to add to cart");
        assert!(resp.status().is_redirection());
    }

    let cart = buyer
        .get(format!("{base}/cart"))
        .send()
        .await
        .expect("Failed to load cart")
        .text()
        .await
        .expect("Failed to read cart");
    assert!(cart.contains(&title), "cart should show the product");
    assert_eq!(
        cart.matches(&title).count(),
        1,
        "repeat adds should merge into one line"
    );
    assert!(cart.contains("$29.97"), "cart total should be 3 x $9.99");

    // Checkout clears the cart and lands on the order history.
    let resp = buyer
        .post(format!("{base}/cart/checkout"))
        .send()
        .await
        .expect("Failed to checkout");
    assert!(resp.status().is_redirection());
    assert_eq!(
        resp.headers()
            .get("location")
            .and_then(|v| v.to_str().ok()),
        Some("/orders")
    );

    let cart_after = buyer
        .get(format!("{base}/cart"))
        .send()
        .await
        .expect("Failed to reload cart")
        .text()
        .await
        .expect("Failed to read cart");
    assert!(
        cart_after.contains("cart is empty"),
        "cart should be empty after checkout"
    );

    let orders = buyer
        .get(format!("{base}/orders"))
        .send()
        .await
        .expect("Failed to load orders")
        .text()
        .await
        .expect("Failed to read orders");
    assert!(orders.contains(&title), "order should snapshot the product");

    // Invoice downloads as a PDF.
    let invoice_path = find_invoice_path(&buyer).await;
    let resp = buyer
        .get(format!("{base}{invoice_path}"))
        .send()
        .await
        .expect("Failed to download invoice");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("application/pdf")
    );
    let pdf = resp.bytes().await.expect("Failed to read invoice");
    assert!(pdf.starts_with(b"%PDF"), "invoice should be a PDF");

    // The seller rewrites the listing after the sale. The order holds a
    // value copy, so the history must keep the original title and pricing.
    let changed_title = format!("Renamed Item {}", Uuid::new_v4());
    let edit = reqwest::multipart::Form::new()
        .text("title", changed_title.clone())
        .text("price", "19.99")
        .text("description", "Rewritten after the sale.");
    let resp = seller
        .post(format!("{base}/listings/{product_id}"))
        .multipart(edit)
        .send()
        .await
        .expect("Failed to edit listing");
    assert!(resp.status().is_redirection());

    let orders = buyer
        .get(format!("{base}/orders"))
        .send()
        .await
        .expect("Failed to reload orders")
        .text()
        .await
        .expect("Failed to read orders");
    assert!(
        orders.contains(&title),
        "order history should keep the title as sold"
    );
    assert!(
        !orders.contains(&changed_title),
        "a later rename should not leak into order history"
    );
    assert!(
        orders.contains("$29.97"),
        "order total should stay 3 x $9.99 after a price change"
    );

    // Deleting the product must not touch the order or its invoice either.
    let resp = seller
        .post(format!("{base}/listings/{product_id}/delete"))
        .send()
        .await
        .expect("Failed to delete listing");
    assert!(resp.status().is_redirection());

    let orders = buyer
        .get(format!("{base}/orders"))
        .send()
        .await
        .expect("Failed to reload orders")
        .text()
        .await
        .expect("Failed to read orders");
    assert!(
        orders.contains(&title) && orders.contains("$29.97"),
        "order history should survive product deletion"
    );

    let resp = buyer
        .get(format!("{base}{invoice_path}"))
        .send()
        .await
        .expect("Failed to re-download invoice");
    assert_eq!(resp.status(), StatusCode::OK);
    let pdf = resp.bytes().await.expect("Failed to read invoice");
    assert!(
        pdf.starts_with(b"%PDF"),
        "invoice should render from the snapshot after deletion"
    );

    // A third user gets 403 for the buyer's invoice.
    let outsider = browser_client();
    sign_up(&outsider).await;
    let resp = outsider
        .get(format!("{base}{invoice_path}"))
        .send()
        .await
        .expect("Failed to request foreign invoice");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn checkout_with_empty_cart_is_rejected() {
    let base = storefront_base_url();

    let client = browser_client();
    sign_up(&client).await;

    let resp = client
        .post(format!("{base}/cart/checkout"))
        .send()
        .await
        .expect("Failed to checkout");

    assert!(resp.status().is_redirection());
    assert_eq!(
        resp.headers()
            .get("location")
            .and_then(|v| v.to_str().ok()),
        Some("/cart?error=empty")
    );
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn cart_and_invoice_require_login() {
    let base = storefront_base_url();
    let anonymous = browser_client();

    let resp = anonymous
        .get(format!("{base}/cart"))
        .send()
        .await
        .expect("Failed to request cart");
    assert!(resp.status().is_redirection());
    assert_eq!(
        resp.headers()
            .get("location")
            .and_then(|v| v.to_str().ok()),
        Some("/auth/login")
    );

    let resp = anonymous
        .get(format!("{base}/orders/1/invoice"))
        .send()
        .await
        .expect("Failed to request invoice");
    assert!(resp.status().is_redirection());
}
