//! Invoice repository implementation
//!
//! Database access for invoices, their line items, and the customers they
//! are billed to. Queries are built at runtime with `query_as` and explicit
//! binds; rows are plain structs the adapter maps into domain types.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, instrument};

use crate::error::DatabaseError;

const INVOICE_COLUMNS: &str = r#"
    i.invoice_id, i.invoice_number,
    c.customer_id, c.name AS customer_name, c.phone_number AS customer_phone,
    c.address AS customer_address, c.gstin AS customer_gstin,
    i.shipping_name, i.shipping_address,
    i.invoice_date, i.due_date, i.delivery_date,
    i.include_tax, i.currency,
    i.subtotal, i.total_discount, i.cgst, i.sgst, i.grand_total,
    i.advance_paid, i.balance_due, i.total_in_words,
    i.status, i.notes, i.created_at, i.updated_at
"#;

/// Repository for invoices and their line items
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: PgPool,
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the newest invoice number starting with `prefix`
    ///
    /// "Newest" is by creation time, with the serial key breaking ties.
    #[instrument(skip(self))]
    pub async fn latest_number_with_prefix(&self, prefix: &str) -> Result<Option<String>, DatabaseError> {
        let number = sqlx::query_scalar::<_, String>(
            r#"
            SELECT invoice_number
            FROM invoices
            WHERE invoice_number LIKE $1 || '%'
            ORDER BY created_at DESC, invoice_id DESC
            LIMIT 1
            "#,
        )
        .bind(prefix)
        .fetch_optional(&self.pool)
        .await?;

        Ok(number)
    }

    /// Creates an invoice with its items in a single transaction
    ///
    /// The customer is upserted by phone number first. A duplicate invoice
    /// number aborts the transaction with `DatabaseError::DuplicateEntry`.
    #[instrument(skip(self, invoice, items), fields(invoice_number = %invoice.invoice_number))]
    pub async fn create(
        &self,
        customer: NewCustomer,
        invoice: NewInvoiceRecord,
        items: Vec<NewInvoiceItem>,
    ) -> Result<InvoiceWithItems, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let customer_id = upsert_customer(&mut tx, &customer).await?;

        let invoice_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO invoices (
                invoice_number, customer_id, shipping_name, shipping_address,
                invoice_date, due_date, delivery_date, include_tax, currency,
                subtotal, total_discount, cgst, sgst, grand_total,
                advance_paid, balance_due, total_in_words, status, notes
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            RETURNING invoice_id
            "#,
        )
        .bind(&invoice.invoice_number)
        .bind(customer_id)
        .bind(&invoice.shipping_name)
        .bind(&invoice.shipping_address)
        .bind(invoice.invoice_date)
        .bind(invoice.due_date)
        .bind(invoice.delivery_date)
        .bind(invoice.include_tax)
        .bind(&invoice.currency)
        .bind(invoice.subtotal)
        .bind(invoice.total_discount)
        .bind(invoice.cgst)
        .bind(invoice.sgst)
        .bind(invoice.grand_total)
        .bind(invoice.advance_paid)
        .bind(invoice.balance_due)
        .bind(&invoice.total_in_words)
        .bind(invoice.status)
        .bind(&invoice.notes)
        .fetch_one(&mut *tx)
        .await?;

        for (position, item) in items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO invoice_items (
                    invoice_id, position, product_id, name, hsn, unit, description,
                    unit_price, quantity, discount_percent, line_total
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                "#,
            )
            .bind(invoice_id)
            .bind(position as i32)
            .bind(item.product_id)
            .bind(&item.name)
            .bind(&item.hsn)
            .bind(&item.unit)
            .bind(&item.description)
            .bind(item.unit_price)
            .bind(item.quantity)
            .bind(item.discount_percent)
            .bind(item.line_total)
            .execute(&mut *tx)
            .await?;
        }

        let created = fetch_invoice(&mut tx, invoice_id).await?;
        tx.commit().await?;

        debug!(invoice_id, items = items.len(), "Invoice row created");
        Ok(created)
    }

    /// Retrieves an invoice with its items
    pub async fn get(&self, invoice_id: i64) -> Result<InvoiceWithItems, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let invoice = fetch_invoice(&mut tx, invoice_id).await?;
        tx.commit().await?;
        Ok(invoice)
    }

    /// Writes status and payment amounts back to an invoice
    #[instrument(skip(self, update))]
    pub async fn update_payment(
        &self,
        invoice_id: i64,
        update: InvoicePaymentUpdate,
    ) -> Result<InvoiceWithItems, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE invoices
            SET status = $2,
                advance_paid = $3,
                balance_due = $4,
                updated_at = clock_timestamp()
            WHERE invoice_id = $1
            "#,
        )
        .bind(invoice_id)
        .bind(update.status)
        .bind(update.advance_paid)
        .bind(update.balance_due)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Invoice", invoice_id));
        }

        let updated = fetch_invoice(&mut tx, invoice_id).await?;
        tx.commit().await?;
        Ok(updated)
    }

    /// Lists invoices newest first with optional status and search filters
    ///
    /// The search term matches invoice number or customer name
    /// case-insensitively, or a substring of the phone number.
    #[instrument(skip(self))]
    pub async fn list(&self, filter: &InvoiceFilter) -> Result<Vec<InvoiceWithItems>, DatabaseError> {
        let pattern = filter.search.as_deref().map(|term| format!("%{}%", escape_like(term.trim())));

        let rows = sqlx::query_as::<_, InvoiceRow>(&format!(
            r#"
            SELECT {INVOICE_COLUMNS}
            FROM invoices i
            JOIN customers c ON c.customer_id = i.customer_id
            WHERE ($1::invoice_status IS NULL OR i.status = $1)
              AND ($2::text IS NULL
                   OR i.invoice_number ILIKE $2
                   OR c.name ILIKE $2
                   OR c.phone_number LIKE $2)
            ORDER BY i.created_at DESC, i.invoice_id DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(filter.status)
        .bind(pattern)
        .bind(filter.limit)
        .bind(filter.offset.unwrap_or(0))
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<i64> = rows.iter().map(|row| row.invoice_id).collect();
        let mut items_by_invoice: HashMap<i64, Vec<InvoiceItemRow>> = HashMap::new();
        if !ids.is_empty() {
            let items = sqlx::query_as::<_, InvoiceItemRow>(
                r#"
                SELECT item_id, invoice_id, position, product_id, name, hsn, unit, description,
                       unit_price, quantity, discount_percent, line_total
                FROM invoice_items
                WHERE invoice_id = ANY($1)
                ORDER BY invoice_id, position
                "#,
            )
            .bind(ids.as_slice())
            .fetch_all(&self.pool)
            .await?;

            for item in items {
                items_by_invoice.entry(item.invoice_id).or_default().push(item);
            }
        }

        Ok(rows
            .into_iter()
            .map(|invoice| {
                let items = items_by_invoice.remove(&invoice.invoice_id).unwrap_or_default();
                InvoiceWithItems { invoice, items }
            })
            .collect())
    }

    /// Checks database connectivity
    pub async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}

async fn upsert_customer(
    tx: &mut Transaction<'_, Postgres>,
    customer: &NewCustomer,
) -> Result<i64, DatabaseError> {
    let customer_id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO customers (name, phone_number, address, gstin)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (phone_number) DO UPDATE
        SET name = EXCLUDED.name,
            address = COALESCE(EXCLUDED.address, customers.address),
            gstin = COALESCE(EXCLUDED.gstin, customers.gstin),
            updated_at = now()
        RETURNING customer_id
        "#,
    )
    .bind(&customer.name)
    .bind(&customer.phone_number)
    .bind(&customer.address)
    .bind(&customer.gstin)
    .fetch_one(&mut **tx)
    .await?;

    Ok(customer_id)
}

async fn fetch_invoice(
    tx: &mut Transaction<'_, Postgres>,
    invoice_id: i64,
) -> Result<InvoiceWithItems, DatabaseError> {
    let invoice = sqlx::query_as::<_, InvoiceRow>(&format!(
        r#"
        SELECT {INVOICE_COLUMNS}
        FROM invoices i
        JOIN customers c ON c.customer_id = i.customer_id
        WHERE i.invoice_id = $1
        "#
    ))
    .bind(invoice_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| DatabaseError::not_found("Invoice", invoice_id))?;

    let items = sqlx::query_as::<_, InvoiceItemRow>(
        r#"
        SELECT item_id, invoice_id, position, product_id, name, hsn, unit, description,
               unit_price, quantity, discount_percent, line_total
        FROM invoice_items
        WHERE invoice_id = $1
        ORDER BY position
        "#,
    )
    .bind(invoice_id)
    .fetch_all(&mut **tx)
    .await?;

    Ok(InvoiceWithItems { invoice, items })
}

/// Escapes LIKE wildcards in user-supplied search text
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Invoice status as stored in the `invoice_status` enum type
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "invoice_status", rename_all = "UPPERCASE")]
pub enum InvoiceStatus {
    Draft,
    Final,
    Pending,
    Overdue,
    Paid,
}

/// Database row for an invoice joined with its customer
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InvoiceRow {
    pub invoice_id: i64,
    pub invoice_number: String,
    pub customer_id: i64,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: Option<String>,
    pub customer_gstin: Option<String>,
    pub shipping_name: Option<String>,
    pub shipping_address: Option<String>,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub delivery_date: Option<NaiveDate>,
    pub include_tax: bool,
    pub currency: String,
    pub subtotal: Decimal,
    pub total_discount: Decimal,
    pub cgst: Decimal,
    pub sgst: Decimal,
    pub grand_total: Decimal,
    pub advance_paid: Decimal,
    pub balance_due: Decimal,
    pub total_in_words: String,
    pub status: InvoiceStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database row for an invoice line item
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InvoiceItemRow {
    pub item_id: i64,
    pub invoice_id: i64,
    pub position: i32,
    pub product_id: i64,
    pub name: String,
    pub hsn: Option<String>,
    pub unit: Option<String>,
    pub description: Option<String>,
    pub unit_price: Decimal,
    pub quantity: i64,
    pub discount_percent: Decimal,
    pub line_total: Decimal,
}

/// An invoice row together with its items in position order
#[derive(Debug, Clone)]
pub struct InvoiceWithItems {
    pub invoice: InvoiceRow,
    pub items: Vec<InvoiceItemRow>,
}

/// Customer data upserted by phone number
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub name: String,
    pub phone_number: String,
    pub address: Option<String>,
    pub gstin: Option<String>,
}

/// Data for creating a new invoice row
#[derive(Debug, Clone)]
pub struct NewInvoiceRecord {
    pub invoice_number: String,
    pub shipping_name: Option<String>,
    pub shipping_address: Option<String>,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub delivery_date: Option<NaiveDate>,
    pub include_tax: bool,
    pub currency: String,
    pub subtotal: Decimal,
    pub total_discount: Decimal,
    pub cgst: Decimal,
    pub sgst: Decimal,
    pub grand_total: Decimal,
    pub advance_paid: Decimal,
    pub balance_due: Decimal,
    pub total_in_words: String,
    pub status: InvoiceStatus,
    pub notes: Option<String>,
}

/// Data for creating a line item row
#[derive(Debug, Clone)]
pub struct NewInvoiceItem {
    pub product_id: i64,
    pub name: String,
    pub hsn: Option<String>,
    pub unit: Option<String>,
    pub description: Option<String>,
    pub unit_price: Decimal,
    pub quantity: i64,
    pub discount_percent: Decimal,
    pub line_total: Decimal,
}

/// Status and payment columns written by a payment update
#[derive(Debug, Clone, Copy)]
pub struct InvoicePaymentUpdate {
    pub status: InvoiceStatus,
    pub advance_paid: Decimal,
    pub balance_due: Decimal,
}

/// Filters for listing invoices
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    pub status: Option<InvoiceStatus>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("INV-0001"), "INV-0001");
    }
}
