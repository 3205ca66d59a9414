//! Integration tests for registration and login.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The storefront running (cargo run -p cartwheel-storefront)
//!
//! Run with: cargo test -p cartwheel-integration-tests -- --ignored

use uuid::Uuid;

use cartwheel_integration_tests::{browser_client, storefront_base_url};

const PASSWORD: &str = "integration-test-pw";

fn fresh_email() -> String {
    format!("it-{}@example.com", Uuid::new_v4())
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn register_login_logout_round_trip() {
    let base = storefront_base_url();
    let client = browser_client();
    let email = fresh_email();

    // Register (logs the user straight in).
    let resp = client
        .post(format!("{base}/auth/register"))
        .form(&[
            ("email", email.as_str()),
            ("password", PASSWORD),
            ("password_confirm", PASSWORD),
        ])
        .send()
        .await
        .expect("Failed to register");
    assert!(resp.status().is_redirection());

    // The nav now shows the logged-in links.
    let home = client
        .get(&base)
        .send()
        .await
        .expect("Failed to load home")
        .text()
        .await
        .expect("Failed to read home");
    assert!(home.contains("Log out"));

    // Logout.
    let resp = client
        .post(format!("{base}/auth/logout"))
        .send()
        .await
        .expect("Failed to logout");
    assert!(resp.status().is_redirection());

    let home = client
        .get(&base)
        .send()
        .await
        .expect("Failed to reload home")
        .text()
        .await
        .expect("Failed to read home");
    assert!(home.contains("Log in"));

    // Log back in with the password.
    let resp = client
        .post(format!("{base}/auth/login"))
        .form(&[("email", email.as_str()), ("password", PASSWORD)])
        .send()
        .await
        .expect("Failed to login");
    assert!(resp.status().is_redirection());
    assert_eq!(
        resp.headers()
            .get("location")
            .and_then(|v| v.to_str().ok()),
        Some("/")
    );
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn wrong_password_is_rejected() {
    let base = storefront_base_url();
    let client = browser_client();
    let email = fresh_email();

    client
        .post(format!("{base}/auth/register"))
        .form(&[
            ("email", email.as_str()),
            ("password", PASSWORD),
            ("password_confirm", PASSWORD),
        ])
        .send()
        .await
        .expect("Failed to register");

    let resp = client
        .post(format!("{base}/auth/login"))
        .form(&[("email", email.as_str()), ("password", "not-the-password")])
        .send()
        .await
        .expect("Failed to send login");

    assert!(resp.status().is_redirection());
    assert_eq!(
        resp.headers()
            .get("location")
            .and_then(|v| v.to_str().ok()),
        Some("/auth/login?error=credentials")
    );
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn duplicate_registration_is_rejected() {
    let base = storefront_base_url();
    let email = fresh_email();

    for expected in ["/", "/auth/register?error=email_taken"] {
        let client = browser_client();
        let resp = client
            .post(format!("{base}/auth/register"))
            .form(&[
                ("email", email.as_str()),
                ("password", PASSWORD),
                ("password_confirm", PASSWORD),
            ])
            .send()
            .await
            .expect("Failed to register");

        assert!(resp.status().is_redirection());
        assert_eq!(
            resp.headers()
                .get("location")
                .and_then(|v| v.to_str().ok()),
            Some(expected)
        );
    }
}
