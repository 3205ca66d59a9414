//! Integration tests for Cartwheel.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and run migrations
//! cargo run -p cartwheel-cli -- migrate
//!
//! # Start the storefront
//! cargo run -p cartwheel-storefront
//!
//! # Run integration tests
//! cargo test -p cartwheel-integration-tests -- --ignored
//! ```
//!
//! The tests drive a running storefront over HTTP with a cookie-holding
//! client, the same way a browser would. They live in `tests/` and are
//! `#[ignore]`d by default so `cargo test` stays self-contained.

use reqwest::Client;

/// Base URL for the storefront (configurable via environment).
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Create an HTTP client that holds session cookies like a browser.
///
/// # Panics
///
/// Panics if the client cannot be constructed.
#[must_use]
pub fn browser_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}
