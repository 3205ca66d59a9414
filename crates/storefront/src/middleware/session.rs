//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions.

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use tower_sessions::cookie::Key;
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "cw_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Derive the cookie-signing key from the configured session secret.
///
/// `Key::derive_from` expands the secret through HKDF; it needs at least
/// 32 bytes of input, which config validation guarantees.
fn signing_key(secret: &SecretString) -> Key {
    Key::derive_from(secret.expose_secret().as_bytes())
}

/// Create the session layer with `PostgreSQL` store.
///
/// Session cookies are signed with a key derived from
/// `CARTWHEEL_SESSION_SECRET`, so a tampered session id is rejected before
/// the store is consulted.
///
/// # Arguments
///
/// * `pool` - `PostgreSQL` connection pool
/// * `config` - Storefront configuration (signing secret, cookie security flag)
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &StorefrontConfig,
) -> SessionManagerLayer<PostgresStore, SignedCookie> {
    // Create the PostgreSQL session store
    // Note: The sessions table must be created via migration
    let store = PostgresStore::new(pool.clone());

    // Determine if we're in production (HTTPS)
    let is_secure = config.base_url.starts_with("https://");

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(signing_key(&config.session_secret))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signing_key_is_deterministic() {
        let secret = SecretString::from("a".repeat(32));
        let first = signing_key(&secret);
        let second = signing_key(&secret);
        assert_eq!(first.master(), second.master());
    }

    #[test]
    fn signing_key_varies_with_the_secret() {
        let a = signing_key(&SecretString::from("a".repeat(32)));
        let b = signing_key(&SecretString::from("b".repeat(32)));
        assert_ne!(a.master(), b.master());
    }
}
