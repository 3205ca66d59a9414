//! Catalog route handlers.
//!
//! The catalog is public: anyone can browse products, logged in or not.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};

use cartwheel_core::ProductId;

use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::Product;
use crate::state::AppState;

/// Catalog page template.
#[derive(Template, WebTemplate)]
#[template(path = "shop/index.html")]
pub struct CatalogTemplate {
    pub authenticated: bool,
    pub products: Vec<Product>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "shop/product.html")]
pub struct ProductTemplate {
    pub authenticated: bool,
    pub product: Product,
}

/// Display the product catalog.
pub async fn home(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> Result<CatalogTemplate> {
    let products = ProductRepository::new(state.pool()).list_all().await?;

    Ok(CatalogTemplate {
        authenticated: user.is_some(),
        products,
    })
}

/// Display one product.
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<i32>,
) -> Result<ProductTemplate> {
    let product = ProductRepository::new(state.pool())
        .get(ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(ProductTemplate {
        authenticated: user.is_some(),
        product,
    })
}
