//! Database migration command.
//!
//! Applies the storefront's embedded migrations. The storefront binary
//! never migrates on startup; this command is the only migration path.

use secrecy::ExposeSecret;
use sqlx::PgPool;

use super::CommandError;

/// Run the database migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let database_url = super::database_url()?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    tracing::info!("Migrations complete");
    Ok(())
}
