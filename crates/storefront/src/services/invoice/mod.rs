//! Invoice service.
//!
//! Invoices are rendered on demand from an order's stored line snapshots,
//! never persisted as a source of truth. Each download renders the PDF
//! once, then streams it to two sinks at the same time: the HTTP response
//! and an archive file under the data directory. Archival is best-effort;
//! the download succeeds whether or not the archive write does, and the
//! archive completes whether or not the client stays connected.

mod fanout;
mod pdf;

use std::convert::Infallible;

use axum::body::{Body, Bytes};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use sqlx::PgPool;
use thiserror::Error;

use cartwheel_core::{OrderId, UserId};

use crate::db::RepositoryError;
use crate::db::orders::OrderRepository;
use crate::services::storage::{FileStore, invoice_filename};

/// Chunk size for the fan-out stream.
const CHUNK_SIZE: usize = 8 * 1024;

/// Errors from producing an invoice.
#[derive(Debug, Error)]
pub enum InvoiceError {
    /// No such order.
    #[error("order not found")]
    NotFound,

    /// The order exists but belongs to someone else.
    #[error("order belongs to another user")]
    Forbidden,

    /// PDF assembly failed.
    #[error("failed to render invoice: {0}")]
    Render(String),

    /// Database operation failed.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Invoice service.
pub struct InvoiceService<'a> {
    orders: OrderRepository<'a>,
    files: &'a FileStore,
}

impl<'a> InvoiceService<'a> {
    /// Create a new invoice service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, files: &'a FileStore) -> Self {
        Self {
            orders: OrderRepository::new(pool),
            files,
        }
    }

    /// Render the invoice for `order_id` and stream it as an HTTP response,
    /// archiving a copy on disk as it goes.
    ///
    /// The archive write runs in a detached task, so it finishes even if
    /// the requester disconnects mid-download.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::NotFound` if the order doesn't exist.
    /// Returns `InvoiceError::Forbidden` if `requester` doesn't own the order.
    /// Returns `InvoiceError::Render` if the PDF cannot be produced.
    pub async fn download(
        &self,
        order_id: OrderId,
        requester: UserId,
    ) -> Result<Response, InvoiceError> {
        let order = self
            .orders
            .get(order_id)
            .await?
            .ok_or(InvoiceError::NotFound)?;

        if order.user_id != requester {
            return Err(InvoiceError::Forbidden);
        }

        let document = Bytes::from(pdf::render(&order).map_err(InvoiceError::Render)?);

        tracing::debug!(
            order_id = %order.id,
            bytes = document.len(),
            "invoice rendered"
        );

        let [archive_rx, body_rx] = fanout::fan_out(document, CHUNK_SIZE);

        tokio::spawn(fanout::write_file(
            self.files.invoice_path(order_id),
            archive_rx,
        ));

        let stream = futures::stream::unfold(body_rx, |mut rx| async move {
            rx.recv()
                .await
                .map(|chunk| (Ok::<_, Infallible>(chunk), rx))
        });

        let headers = [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", invoice_filename(order_id)),
            ),
        ];

        Ok((headers, Body::from_stream(stream)).into_response())
    }
}
