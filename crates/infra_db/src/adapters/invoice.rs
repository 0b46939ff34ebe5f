//! PostgreSQL Invoice Adapter
//!
//! Implements the invoicing domain's `InvoiceStorePort` on top of
//! [`InvoiceRepository`], translating between domain types and rows.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresInvoiceAdapter;
//! use domain_invoicing::{InvoiceService, InvoiceStorePort};
//! use std::sync::Arc;
//!
//! let store: Arc<dyn InvoiceStorePort> = Arc::new(PostgresInvoiceAdapter::new(pool));
//! let service = InvoiceService::new(store);
//! ```

use std::time::Instant;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    Currency, DomainPort, HealthCheckResult, HealthCheckable, InvoiceId, Money, PortError, ProductId,
};
use domain_invoicing::{
    CustomerInfo, Invoice, InvoiceNumber, InvoiceQuery, InvoiceStatus, InvoiceStorePort, InvoiceTotals,
    LineItem, NewInvoice, ShippingInfo,
};

use crate::error::DatabaseError;
use crate::repositories::invoice::{
    InvoiceFilter, InvoiceItemRow, InvoicePaymentUpdate, InvoiceRepository, InvoiceStatus as DbInvoiceStatus,
    InvoiceWithItems, NewCustomer, NewInvoiceItem, NewInvoiceRecord,
};

const ADAPTER_ID: &str = "postgres-invoice-adapter";

/// PostgreSQL-backed implementation of `InvoiceStorePort`
///
/// # Error Handling
///
/// Database errors are translated to `PortError` variants:
/// - `DatabaseError::DuplicateEntry` -> `PortError::Conflict`
/// - `DatabaseError::NotFound` -> `PortError::NotFound`
/// - connection failures -> `PortError::Connection`
/// - other errors -> `PortError::Internal`
#[derive(Debug, Clone)]
pub struct PostgresInvoiceAdapter {
    repository: InvoiceRepository,
}

impl PostgresInvoiceAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: InvoiceRepository::new(pool),
        }
    }

    /// Returns a reference to the underlying repository
    pub fn repository(&self) -> &InvoiceRepository {
        &self.repository
    }
}

impl DomainPort for PostgresInvoiceAdapter {}

#[async_trait]
impl HealthCheckable for PostgresInvoiceAdapter {
    /// Runs `SELECT 1` against the pool
    async fn health_check(&self) -> HealthCheckResult {
        let start = Instant::now();
        let result = self.repository.ping().await;
        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(()) => HealthCheckResult::healthy(ADAPTER_ID, latency_ms),
            Err(e) => HealthCheckResult::unhealthy(ADAPTER_ID, latency_ms, format!("Database error: {}", e)),
        }
    }
}

#[async_trait]
impl InvoiceStorePort for PostgresInvoiceAdapter {
    #[instrument(skip(self))]
    async fn latest_invoice_number(&self, year_prefix: &str) -> Result<Option<InvoiceNumber>, PortError> {
        let latest = self
            .repository
            .latest_number_with_prefix(year_prefix)
            .await
            .map_err(db_to_port_error)?;

        debug!(latest = ?latest, "Looked up latest invoice number");
        Ok(latest.map(InvoiceNumber::from))
    }

    #[instrument(skip(self, invoice), fields(invoice_number = %invoice.invoice_number))]
    async fn create_invoice(&self, invoice: &NewInvoice) -> Result<Invoice, PortError> {
        let customer = NewCustomer {
            name: invoice.customer.name.clone(),
            phone_number: invoice.customer.phone_number.clone(),
            address: invoice.customer.address.clone(),
            gstin: invoice.customer.gstin.clone(),
        };
        let totals = &invoice.totals;
        let record = NewInvoiceRecord {
            invoice_number: invoice.invoice_number.to_string(),
            shipping_name: invoice.shipping.as_ref().map(|s| s.name.clone()),
            shipping_address: invoice.shipping.as_ref().map(|s| s.address.clone()),
            invoice_date: invoice.invoice_date,
            due_date: invoice.due_date,
            delivery_date: invoice.delivery_date,
            include_tax: invoice.include_tax,
            currency: totals.grand_total.currency().code().to_string(),
            subtotal: totals.subtotal.amount(),
            total_discount: totals.total_discount.amount(),
            cgst: totals.cgst.amount(),
            sgst: totals.sgst.amount(),
            grand_total: totals.grand_total.amount(),
            advance_paid: totals.advance_amount.amount(),
            balance_due: totals.balance_due.amount(),
            total_in_words: invoice.total_in_words.clone(),
            status: status_to_db(invoice.status),
            notes: invoice.notes.clone(),
        };
        let items = invoice
            .items
            .iter()
            .map(|item| {
                let line_total = item
                    .line_total()
                    .map_err(|e| PortError::validation(e.to_string()))?;
                Ok(NewInvoiceItem {
                    product_id: item.product_id.value(),
                    name: item.name.clone(),
                    hsn: item.hsn.clone(),
                    unit: item.unit.clone(),
                    description: item.description.clone(),
                    unit_price: item.unit_price.amount(),
                    quantity: item.quantity,
                    discount_percent: item.discount_percent,
                    line_total: line_total.amount(),
                })
            })
            .collect::<Result<Vec<_>, PortError>>()?;

        let created = self
            .repository
            .create(customer, record, items)
            .await
            .map_err(db_to_port_error)?;

        row_to_invoice(created)
    }

    #[instrument(skip(self), fields(invoice_id = %id))]
    async fn find_invoice(&self, id: InvoiceId) -> Result<Invoice, PortError> {
        let row = self.repository.get(id.value()).await.map_err(|e| match e {
            DatabaseError::NotFound(_) => PortError::not_found("Invoice", id),
            other => db_to_port_error(other),
        })?;
        row_to_invoice(row)
    }

    #[instrument(skip(self, invoice), fields(invoice_id = %invoice.id))]
    async fn update_invoice(&self, invoice: &Invoice) -> Result<Invoice, PortError> {
        let update = InvoicePaymentUpdate {
            status: status_to_db(invoice.status),
            advance_paid: invoice.totals.advance_amount.amount(),
            balance_due: invoice.totals.balance_due.amount(),
        };

        let row = self
            .repository
            .update_payment(invoice.id.value(), update)
            .await
            .map_err(|e| match e {
                DatabaseError::NotFound(_) => PortError::not_found("Invoice", invoice.id),
                other => db_to_port_error(other),
            })?;
        row_to_invoice(row)
    }

    #[instrument(skip(self))]
    async fn list_invoices(&self, query: &InvoiceQuery) -> Result<Vec<Invoice>, PortError> {
        let filter = InvoiceFilter {
            status: query.status.map(status_to_db),
            search: query.search.clone(),
            limit: query.limit.map(i64::from),
            offset: query.offset.map(i64::from),
        };

        let rows = self.repository.list(&filter).await.map_err(db_to_port_error)?;
        rows.into_iter().map(row_to_invoice).collect()
    }
}

// =============================================================================
// Conversion Functions
// =============================================================================

fn db_to_port_error(e: DatabaseError) -> PortError {
    match e {
        DatabaseError::DuplicateEntry(message) => PortError::conflict(message),
        DatabaseError::NotFound(message) => PortError::NotFound {
            entity_type: "Invoice".to_string(),
            id: message,
        },
        DatabaseError::ConnectionFailed(_) | DatabaseError::PoolExhausted => PortError::Connection {
            message: e.to_string(),
            source: Some(Box::new(e)),
        },
        other => PortError::Internal {
            message: other.to_string(),
            source: Some(Box::new(other)),
        },
    }
}

fn status_to_db(status: InvoiceStatus) -> DbInvoiceStatus {
    match status {
        InvoiceStatus::Draft => DbInvoiceStatus::Draft,
        InvoiceStatus::Final => DbInvoiceStatus::Final,
        InvoiceStatus::Pending => DbInvoiceStatus::Pending,
        InvoiceStatus::Overdue => DbInvoiceStatus::Overdue,
        InvoiceStatus::Paid => DbInvoiceStatus::Paid,
    }
}

fn status_from_db(status: DbInvoiceStatus) -> InvoiceStatus {
    match status {
        DbInvoiceStatus::Draft => InvoiceStatus::Draft,
        DbInvoiceStatus::Final => InvoiceStatus::Final,
        DbInvoiceStatus::Pending => InvoiceStatus::Pending,
        DbInvoiceStatus::Overdue => InvoiceStatus::Overdue,
        DbInvoiceStatus::Paid => InvoiceStatus::Paid,
    }
}

fn row_to_item(row: InvoiceItemRow, currency: Currency) -> LineItem {
    LineItem {
        product_id: ProductId::new(row.product_id),
        name: row.name,
        hsn: row.hsn,
        unit: row.unit,
        description: row.description,
        unit_price: Money::new(row.unit_price, currency),
        quantity: row.quantity,
        discount_percent: row.discount_percent,
    }
}

fn row_to_invoice(data: InvoiceWithItems) -> Result<Invoice, PortError> {
    let row = data.invoice;
    let currency: Currency = row
        .currency
        .parse()
        .map_err(|e| PortError::internal(format!("Invoice {}: {}", row.invoice_id, e)))?;
    let money = |amount| Money::new(amount, currency);

    let shipping = match (row.shipping_name, row.shipping_address) {
        (Some(name), Some(address)) => Some(ShippingInfo { name, address }),
        _ => None,
    };

    Ok(Invoice {
        id: InvoiceId::new(row.invoice_id),
        invoice_number: InvoiceNumber::from(row.invoice_number),
        customer: CustomerInfo {
            name: row.customer_name,
            phone_number: row.customer_phone,
            address: row.customer_address,
            gstin: row.customer_gstin,
        },
        shipping,
        invoice_date: row.invoice_date,
        due_date: row.due_date,
        delivery_date: row.delivery_date,
        items: data.items.into_iter().map(|item| row_to_item(item, currency)).collect(),
        include_tax: row.include_tax,
        totals: InvoiceTotals {
            subtotal: money(row.subtotal),
            total_discount: money(row.total_discount),
            cgst: money(row.cgst),
            sgst: money(row.sgst),
            grand_total: money(row.grand_total),
            advance_amount: money(row.advance_paid),
            balance_due: money(row.balance_due),
        },
        total_in_words: row.total_in_words,
        status: status_from_db(row.status),
        notes: row.notes,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}
