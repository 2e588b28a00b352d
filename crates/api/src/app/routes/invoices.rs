use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;

use invoiceai_core::InvoiceId;
use invoiceai_infra::InvoiceFilter;
use invoiceai_invoicing::InvoiceInput;

use crate::app::dto::{self, InvoiceView, ListInvoicesQuery};
use crate::app::errors::{ApiError, json_ok};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

const RESOURCE: &str = "Invoice";

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_invoices).post(create_invoice))
        .route(
            "/:id",
            get(get_invoice).put(update_invoice).delete(delete_invoice),
        )
}

fn parse_id(id: &str) -> Result<InvoiceId, ApiError> {
    id.parse().map_err(ApiError::domain(RESOURCE))
}

pub async fn list_invoices(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<ListInvoicesQuery>,
) -> Result<Response, ApiError> {
    let today = Utc::now().date_naive();
    let filter = InvoiceFilter {
        status: query.status()?,
        search: query.search(),
        today,
    };

    let invoices = services.invoices.list(principal.owner_id(), &filter);
    let views: Vec<InvoiceView<'_>> = invoices.iter().map(|i| InvoiceView::new(i, today)).collect();
    Ok(json_ok(StatusCode::OK, views))
}

pub async fn create_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let input: InvoiceInput = dto::parse_body(&body)?;
    let now = Utc::now();
    let invoice = services
        .invoices
        .create(principal.owner_id(), input, now)
        .map_err(ApiError::domain(RESOURCE))?;

    Ok(json_ok(StatusCode::CREATED, InvoiceView::new(&invoice, now.date_naive())))
}

pub async fn get_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let invoice = services
        .invoices
        .get(principal.owner_id(), &id)
        .map_err(ApiError::domain(RESOURCE))?;

    Ok(json_ok(StatusCode::OK, InvoiceView::new(&invoice, Utc::now().date_naive())))
}

pub async fn update_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let input: InvoiceInput = dto::parse_body(&body)?;
    let now = Utc::now();
    let invoice = services
        .invoices
        .update(principal.owner_id(), &id, input, now)
        .map_err(ApiError::domain(RESOURCE))?;

    Ok(json_ok(StatusCode::OK, InvoiceView::new(&invoice, now.date_naive())))
}

pub async fn delete_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let invoice = services
        .invoices
        .delete(principal.owner_id(), &id)
        .map_err(ApiError::domain(RESOURCE))?;

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "success": true,
            "message": "Invoice deleted",
            "data": { "id": invoice.id },
        })),
    )
        .into_response())
}
