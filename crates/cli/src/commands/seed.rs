//! Database seeding command.
//!
//! Creates a demo user and a handful of products so a fresh install has
//! something to look at. Safe to re-run: an existing demo user is reused.

use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use sqlx::PgPool;

use cartwheel_core::Price;
use cartwheel_storefront::db::products::{NewProduct, ProductRepository};
use cartwheel_storefront::services::auth::{AuthError, AuthService};

use super::CommandError;

const DEMO_EMAIL: &str = "demo@cartwheel.dev";
const DEMO_PASSWORD: &str = "demo-password";

const DEMO_PRODUCTS: &[(&str, i64, &str)] = &[
    (
        "Walnut Writing Desk",
        24_999,
        "Solid walnut, two drawers, finished with hard wax oil.",
    ),
    (
        "Ceramic Pour-Over Set",
        4_850,
        "Dripper, carafe, and two cups in speckled stoneware.",
    ),
    (
        "Wool Throw Blanket",
        8_900,
        "Undyed merino, woven in a herringbone pattern.",
    ),
];

/// Seed the database with demo data.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), CommandError> {
    let database_url = super::database_url()?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    let auth = AuthService::new(&pool);

    let user = match auth.register_with_password(DEMO_EMAIL, DEMO_PASSWORD).await {
        Ok(user) => {
            tracing::info!(email = DEMO_EMAIL, "demo user created");
            user
        }
        Err(AuthError::UserAlreadyExists) => {
            tracing::info!(email = DEMO_EMAIL, "demo user already exists");
            auth.login_with_password(DEMO_EMAIL, DEMO_PASSWORD)
                .await
                .map_err(|e| CommandError::Seed(format!("demo user exists but login failed: {e}")))?
        }
        Err(e) => return Err(CommandError::Seed(e.to_string())),
    };

    seed_products(&pool, user.id).await?;

    tracing::info!("Seeding complete");
    Ok(())
}

async fn seed_products(
    pool: &PgPool,
    owner_id: cartwheel_core::UserId,
) -> Result<(), CommandError> {
    let products = ProductRepository::new(pool);

    let existing = products
        .list_by_owner(owner_id)
        .await
        .map_err(|e| CommandError::Seed(e.to_string()))?;
    if !existing.is_empty() {
        tracing::info!("demo products already present, skipping");
        return Ok(());
    }

    for (title, cents, description) in DEMO_PRODUCTS {
        let price = Price::new(Decimal::new(*cents, 2))
            .map_err(|e| CommandError::Seed(e.to_string()))?;

        products
            .create(NewProduct {
                title,
                price,
                description,
                // Placeholder path; replace by editing the listing with a real upload.
                image_path: "placeholder.png",
                owner_id,
            })
            .await
            .map_err(|e| CommandError::Seed(e.to_string()))?;

        tracing::info!(title, "seeded product");
    }

    Ok(())
}
