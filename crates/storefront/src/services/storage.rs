//! On-disk file storage for product images and archived invoices.
//!
//! Everything lives under one data directory:
//!
//! ```text
//! <data_dir>/
//!   images/     uploaded product images, served at /images
//!   invoices/   archived invoice PDFs, written at download time
//! ```
//!
//! Image filenames are random UUIDs, so uploads can never collide with or
//! overwrite each other and a stored name can never escape the directory.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Errors from file storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The uploaded content type is not an accepted image format.
    #[error("unsupported image type: {0}")]
    UnsupportedImageType(String),

    /// Filesystem operation failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Handle to the storefront's data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    images_dir: PathBuf,
    invoices_dir: PathBuf,
}

impl FileStore {
    /// Create a file store rooted at `data_dir`, creating the
    /// subdirectories if needed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directories cannot be created.
    pub fn new(data_dir: &Path) -> Result<Self, StorageError> {
        let images_dir = data_dir.join("images");
        let invoices_dir = data_dir.join("invoices");

        std::fs::create_dir_all(&images_dir)?;
        std::fs::create_dir_all(&invoices_dir)?;

        Ok(Self {
            images_dir,
            invoices_dir,
        })
    }

    /// Directory that product images are served from.
    #[must_use]
    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    // =========================================================================
    // Product Images
    // =========================================================================

    /// Save an uploaded image, returning the stored filename.
    ///
    /// The filename is a fresh UUID with an extension derived from the
    /// content type; the caller's original filename is never used.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::UnsupportedImageType` for anything but PNG/JPEG.
    /// Returns `StorageError::Io` if the write fails.
    pub async fn save_image(
        &self,
        content_type: &str,
        data: &[u8],
    ) -> Result<String, StorageError> {
        let extension = match content_type {
            "image/png" => "png",
            "image/jpeg" => "jpg",
            other => return Err(StorageError::UnsupportedImageType(other.to_string())),
        };

        let filename = format!("{}.{extension}", Uuid::new_v4());
        let path = self.images_dir.join(&filename);

        let mut file = tokio::fs::File::create(&path).await?;
        file.write_all(data).await?;
        file.flush().await?;

        Ok(filename)
    }

    /// Delete a stored image by filename.
    ///
    /// Idempotent: deleting a file that is already gone is a success.
    /// Filenames containing path separators are rejected, so a corrupted
    /// database value cannot reach outside the images directory.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the delete fails for any reason other
    /// than the file not existing.
    pub async fn delete_image(&self, filename: &str) -> Result<(), StorageError> {
        if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
            tracing::warn!(filename, "refusing to delete suspicious image path");
            return Ok(());
        }

        match tokio::fs::remove_file(self.images_dir.join(filename)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    // =========================================================================
    // Invoice Archive
    // =========================================================================

    /// Path where the invoice for the given order is archived.
    #[must_use]
    pub fn invoice_path(&self, order_id: cartwheel_core::OrderId) -> PathBuf {
        self.invoices_dir.join(invoice_filename(order_id))
    }
}

/// Download filename for an order's invoice.
#[must_use]
pub fn invoice_filename(order_id: cartwheel_core::OrderId) -> String {
    format!("invoice-{order_id}.pdf")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cartwheel_core::OrderId;

    use super::*;

    #[tokio::test]
    async fn save_image_generates_unique_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();

        let a = store.save_image("image/png", b"fake png").await.unwrap();
        let b = store.save_image("image/png", b"fake png").await.unwrap();

        assert_ne!(a, b);
        assert!(a.ends_with(".png"));
        assert!(dir.path().join("images").join(&a).exists());
    }

    #[tokio::test]
    async fn save_image_maps_jpeg_extension() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();

        let name = store.save_image("image/jpeg", b"fake jpg").await.unwrap();

        assert!(name.ends_with(".jpg"));
    }

    #[tokio::test]
    async fn save_image_rejects_unknown_types() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();

        let err = store.save_image("image/gif", b"gif!").await.unwrap_err();

        assert!(matches!(err, StorageError::UnsupportedImageType(t) if t == "image/gif"));
    }

    #[tokio::test]
    async fn delete_image_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();

        let name = store.save_image("image/png", b"fake png").await.unwrap();

        store.delete_image(&name).await.unwrap();
        store.delete_image(&name).await.unwrap();

        assert!(!dir.path().join("images").join(&name).exists());
    }

    #[tokio::test]
    async fn delete_image_ignores_traversal_attempts() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();

        let outside = dir.path().join("victim.txt");
        std::fs::write(&outside, "do not touch").unwrap();

        store.delete_image("../victim.txt").await.unwrap();

        assert!(outside.exists());
    }

    #[test]
    fn invoice_paths_are_per_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();

        assert_eq!(invoice_filename(OrderId::new(7)), "invoice-7.pdf");
        assert!(
            store
                .invoice_path(OrderId::new(7))
                .ends_with("invoices/invoice-7.pdf")
        );
    }
}
