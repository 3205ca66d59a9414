//! Order route handlers.
//!
//! Orders are immutable once placed; these handlers only read them. The
//! invoice endpoint owns the interesting behavior: the PDF is rendered on
//! demand and streamed to the client while a copy is archived on disk.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::Response,
};

use cartwheel_core::OrderId;

use crate::db::orders::OrderRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::Order;
use crate::services::invoice::InvoiceService;
use crate::state::AppState;

/// Order history template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersTemplate {
    pub authenticated: bool,
    pub orders: Vec<Order>,
}

/// Display the user's order history, newest first.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<OrdersTemplate> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;

    Ok(OrdersTemplate {
        authenticated: true,
        orders,
    })
}

/// Stream the PDF invoice for one of the user's orders.
///
/// Someone else's order id produces 403, a missing one 404. The archive
/// copy is written by a detached task, so it completes even if the client
/// disconnects mid-download.
pub async fn invoice(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<Response> {
    let response = InvoiceService::new(state.pool(), state.files())
        .download(OrderId::new(id), user.id)
        .await?;

    Ok(response)
}
