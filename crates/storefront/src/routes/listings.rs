//! Listing management route handlers.
//!
//! Logged-in users manage their own products here. Ownership is enforced
//! twice: the handlers load through owner-scoped queries, and the
//! repository mutations filter on `owner_id` again at the SQL level.
//!
//! Create and update take multipart form data because they carry an image
//! upload alongside the text fields.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};

use cartwheel_core::{Price, ProductId};

use crate::db::RepositoryError;
use crate::db::products::{NewProduct, ProductChanges, ProductRepository};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::Product;
use crate::state::AppState;

/// Largest accepted image upload, in bytes.
const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

// =============================================================================
// Templates
// =============================================================================

/// Own-listings page template.
#[derive(Template, WebTemplate)]
#[template(path = "listings/index.html")]
pub struct ListingsTemplate {
    pub authenticated: bool,
    pub products: Vec<Product>,
}

/// New/edit listing form template.
///
/// `product` is `None` on the create form; on re-render after a validation
/// failure the submitted text fields come back through `draft`.
#[derive(Template, WebTemplate)]
#[template(path = "listings/form.html")]
pub struct ListingFormTemplate {
    pub authenticated: bool,
    pub product: Option<Product>,
    pub draft: ListingDraft,
    pub error: Option<String>,
}

/// Submitted text fields, preserved across a failed validation.
#[derive(Debug, Default, Clone)]
pub struct ListingDraft {
    pub title: String,
    pub price: String,
    pub description: String,
}

// =============================================================================
// Multipart Parsing
// =============================================================================

/// Fields extracted from the listing form.
#[derive(Debug, Default)]
struct ListingUpload {
    title: String,
    price: String,
    description: String,
    image: Option<(String, Vec<u8>)>,
}

impl ListingUpload {
    fn draft(&self) -> ListingDraft {
        ListingDraft {
            title: self.title.clone(),
            price: self.price.clone(),
            description: self.description.clone(),
        }
    }
}

/// Drain the multipart stream into a [`ListingUpload`].
///
/// An image part with no filename (the browser's "no file chosen") is
/// treated as absent.
async fn read_upload(mut multipart: Multipart) -> Result<ListingUpload> {
    let mut upload = ListingUpload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("malformed form data: {e}")))?
    {
        let Some(name) = field.name().map(ToString::to_string) else {
            continue;
        };

        match name.as_str() {
            "title" => {
                upload.title = read_text(field).await?;
            }
            "price" => {
                upload.price = read_text(field).await?;
            }
            "description" => {
                upload.description = read_text(field).await?;
            }
            "image" => {
                let has_file = field.file_name().is_some_and(|f| !f.is_empty());
                if !has_file {
                    continue;
                }

                let content_type = field
                    .content_type()
                    .map(ToString::to_string)
                    .unwrap_or_default();

                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("failed to read upload: {e}")))?;

                if data.len() > MAX_IMAGE_BYTES {
                    return Err(AppError::BadRequest("image is too large".to_string()));
                }

                upload.image = Some((content_type, data.to_vec()));
            }
            _ => {}
        }
    }

    Ok(upload)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("malformed form data: {e}")))
}

/// Validate the text fields, producing a parsed price.
fn validate(upload: &ListingUpload) -> std::result::Result<Price, String> {
    let title_len = upload.title.trim().chars().count();
    if !(3..=120).contains(&title_len) {
        return Err("Title must be between 3 and 120 characters".to_string());
    }

    let description_len = upload.description.trim().chars().count();
    if !(5..=2000).contains(&description_len) {
        return Err("Description must be between 5 and 2000 characters".to_string());
    }

    Price::parse(&upload.price).map_err(|e| format!("Invalid price: {e}"))
}

// =============================================================================
// Handlers
// =============================================================================

/// List the user's own products.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<ListingsTemplate> {
    let products = ProductRepository::new(state.pool())
        .list_by_owner(user.id)
        .await?;

    Ok(ListingsTemplate {
        authenticated: true,
        products,
    })
}

/// Display the new-listing form.
pub async fn new_form(RequireAuth(_user): RequireAuth) -> impl IntoResponse {
    ListingFormTemplate {
        authenticated: true,
        product: None,
        draft: ListingDraft::default(),
        error: None,
    }
}

/// Create a listing from the submitted form.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    multipart: Multipart,
) -> Result<Response> {
    let upload = read_upload(multipart).await?;

    let price = match validate(&upload) {
        Ok(price) => price,
        Err(message) => return Ok(form_error(None, upload.draft(), message)),
    };

    let Some((content_type, data)) = upload.image.as_ref() else {
        return Ok(form_error(None, upload.draft(), "An image is required".to_string()));
    };

    let image_path = match state.files().save_image(content_type, data).await {
        Ok(filename) => filename,
        Err(crate::services::storage::StorageError::UnsupportedImageType(_)) => {
            return Ok(form_error(
                None,
                upload.draft(),
                "Images must be PNG or JPEG".to_string(),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    ProductRepository::new(state.pool())
        .create(NewProduct {
            title: upload.title.trim(),
            price,
            description: &upload.description,
            image_path: &image_path,
            owner_id: user.id,
        })
        .await?;

    Ok(Redirect::to("/listings").into_response())
}

/// Display the edit form for one of the user's products.
pub async fn edit_form(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<Response> {
    let Some(product) = ProductRepository::new(state.pool())
        .get(ProductId::new(id))
        .await?
    else {
        return Err(AppError::NotFound(format!("product {id}")));
    };

    // Someone else's product: bounce to the catalog, revealing nothing.
    if product.owner_id != user.id {
        return Ok(Redirect::to("/").into_response());
    }

    let draft = ListingDraft {
        title: product.title.clone(),
        price: product.price.amount().to_string(),
        description: product.description.clone(),
    };

    Ok(ListingFormTemplate {
        authenticated: true,
        product: Some(product),
        draft,
        error: None,
    }
    .into_response())
}

/// Update one of the user's products.
///
/// A new image replaces the old one on disk; without a new upload the
/// existing image is kept.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Response> {
    let product_id = ProductId::new(id);
    let products = ProductRepository::new(state.pool());

    let Some(product) = products.get(product_id).await? else {
        return Err(AppError::NotFound(format!("product {id}")));
    };

    if product.owner_id != user.id {
        return Ok(Redirect::to("/").into_response());
    }

    let upload = read_upload(multipart).await?;

    let price = match validate(&upload) {
        Ok(price) => price,
        Err(message) => return Ok(form_error(Some(product), upload.draft(), message)),
    };

    let new_image = match upload.image.as_ref() {
        Some((content_type, data)) => {
            match state.files().save_image(content_type, data).await {
                Ok(filename) => Some(filename),
                Err(crate::services::storage::StorageError::UnsupportedImageType(_)) => {
                    return Ok(form_error(
                        Some(product),
                        upload.draft(),
                        "Images must be PNG or JPEG".to_string(),
                    ));
                }
                Err(e) => return Err(e.into()),
            }
        }
        None => None,
    };

    let updated = products
        .update(
            product_id,
            user.id,
            ProductChanges {
                title: upload.title.trim(),
                price,
                description: &upload.description,
                image_path: new_image.as_deref(),
            },
        )
        .await;

    if let Err(e) = updated {
        // The row never pointed at the new file; remove it again.
        if let Some(filename) = new_image.as_deref()
            && let Err(del) = state.files().delete_image(filename).await
        {
            tracing::warn!(error = %del, image = %filename, "failed to remove orphaned image");
        }

        return Err(match e {
            RepositoryError::NotFound => AppError::NotFound(format!("product {id}")),
            other => other.into(),
        });
    }

    // The old image is unreferenced once the row points at the new one.
    if new_image.is_some()
        && let Err(e) = state.files().delete_image(&product.image_path).await
    {
        tracing::warn!(error = %e, image = %product.image_path, "failed to delete replaced image");
    }

    Ok(Redirect::to("/listings").into_response())
}

/// Delete one of the user's products.
///
/// The image file is removed after the row; a file already gone is fine.
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<Response> {
    let deleted_image = ProductRepository::new(state.pool())
        .delete(ProductId::new(id), user.id)
        .await?;

    match deleted_image {
        Some(image_path) => {
            state.files().delete_image(&image_path).await?;
            Ok(Redirect::to("/listings").into_response())
        }
        // Nothing matched the (id, owner) pair.
        None => Ok(Redirect::to("/").into_response()),
    }
}

/// Re-render the form with the submitted fields and an error, as a 422.
fn form_error(product: Option<Product>, draft: ListingDraft, error: String) -> Response {
    let template = ListingFormTemplate {
        authenticated: true,
        product,
        draft,
        error: Some(error),
    };

    (StatusCode::UNPROCESSABLE_ENTITY, template).into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn upload(title: &str, price: &str, description: &str) -> ListingUpload {
        ListingUpload {
            title: title.to_string(),
            price: price.to_string(),
            description: description.to_string(),
            image: None,
        }
    }

    #[test]
    fn accepts_a_well_formed_listing() {
        let price = validate(&upload("Enamel Mug", "12.50", "A sturdy mug for camp coffee."))
            .expect("listing should validate");
        assert_eq!(price.to_string(), "$12.50");
    }

    #[test]
    fn rejects_short_titles() {
        let err = validate(&upload("Mu", "12.50", "A sturdy mug.")).unwrap_err();
        assert!(err.contains("Title"));
    }

    #[test]
    fn rejects_short_descriptions() {
        let err = validate(&upload("Enamel Mug", "12.50", "Mug")).unwrap_err();
        assert!(err.contains("Description"));
    }

    #[test]
    fn rejects_unparseable_prices() {
        let err = validate(&upload("Enamel Mug", "twelve", "A sturdy mug.")).unwrap_err();
        assert!(err.contains("price"));
    }

    #[test]
    fn rejects_negative_prices() {
        assert!(validate(&upload("Enamel Mug", "-1.00", "A sturdy mug.")).is_err());
    }

    #[test]
    fn title_whitespace_does_not_count() {
        assert!(validate(&upload("  a  ", "1.00", "A sturdy mug.")).is_err());
    }
}
