//! Invoice handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Datelike, Utc};
use validator::Validate;

use core_kernel::InvoiceId;
use domain_invoicing::{amount_in_words_line, to_words};

use crate::dto::invoices::*;
use crate::{error::ApiError, AppState};

/// Computes totals and amount in words without saving anything
pub async fn preview_invoice(
    State(state): State<AppState>,
    Json(request): Json<CreateInvoiceRequest>,
) -> Result<Json<PreviewResponse>, ApiError> {
    request.validate()?;
    let draft = request.to_draft()?;
    let preview = state.service.preview(&draft)?;
    Ok(Json(PreviewResponse::from(&preview)))
}

/// Shows the number the next invoice would receive
pub async fn next_number(
    State(state): State<AppState>,
    Query(query): Query<NextNumberQuery>,
) -> Result<Json<NextNumberResponse>, ApiError> {
    query.validate()?;
    let year = query.year.unwrap_or_else(|| Utc::now().year());
    let number = state.service.next_number(year).await?;

    Ok(Json(NextNumberResponse {
        year,
        invoice_number: number.into_inner(),
    }))
}

/// Creates an invoice, allocating its number
pub async fn create_invoice(
    State(state): State<AppState>,
    Json(request): Json<CreateInvoiceRequest>,
) -> Result<(StatusCode, Json<InvoiceResponse>), ApiError> {
    request.validate()?;
    let draft = request.to_draft()?;
    let invoice = state.service.issue(&draft).await?;
    Ok((StatusCode::CREATED, Json(InvoiceResponse::try_from(&invoice)?)))
}

/// Lists invoices
pub async fn list_invoices(
    State(state): State<AppState>,
    Query(query): Query<ListInvoicesQuery>,
) -> Result<Json<Vec<InvoiceResponse>>, ApiError> {
    query.validate()?;
    let invoices = state.service.list(&query.to_query()?).await?;
    let responses = invoices
        .iter()
        .map(InvoiceResponse::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(responses))
}

/// Gets an invoice by ID
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<InvoiceResponse>, ApiError> {
    let invoice = state.service.get(InvoiceId::new(id)).await?;
    Ok(Json(InvoiceResponse::try_from(&invoice)?))
}

/// Records an advance and/or status change
pub async fn record_payment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<PaymentRequest>,
) -> Result<Json<InvoiceResponse>, ApiError> {
    request.validate()?;
    let update = request.to_update()?;
    let invoice = state.service.record_payment(InvoiceId::new(id), &update).await?;
    Ok(Json(InvoiceResponse::try_from(&invoice)?))
}

/// Spells an amount in words
pub async fn amount_in_words(Query(query): Query<AmountInWordsQuery>) -> Json<AmountInWordsResponse> {
    Json(AmountInWordsResponse {
        amount: query.amount,
        words: to_words(query.amount),
        line: amount_in_words_line(query.amount),
    })
}
