//! Invoicing Domain Ports
//!
//! The `InvoiceStorePort` trait is the only persistence capability the
//! domain needs. Two adapters implement it:
//!
//! - **Postgres Adapter** (`infra_db`): the production store
//! - **In-memory Adapter** (`test_utils`): for tests without a database
//!
//! # Uniqueness
//!
//! Implementations must enforce uniqueness of invoice numbers and report a
//! duplicate as [`PortError::Conflict`], distinct from every other failure.
//! The invoice service relies on that signal to retry allocation.
//!
//! ```rust,ignore
//! let store: Arc<dyn InvoiceStorePort> = Arc::new(PostgresInvoiceAdapter::new(pool));
//! let service = InvoiceService::new(store);
//! let invoice = service.issue(&draft).await?;
//! ```

use async_trait::async_trait;

use core_kernel::{DomainPort, HealthCheckable, InvoiceId, PortError};

use crate::invoice::{Invoice, InvoiceStatus, NewInvoice};
use crate::numbering::InvoiceNumber;

/// Query parameters for listing invoices
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceQuery {
    /// Filter by status
    pub status: Option<InvoiceStatus>,
    /// Case-insensitive match on invoice number, customer name, or phone
    pub search: Option<String>,
    /// Limit results
    pub limit: Option<u32>,
    /// Offset for pagination
    pub offset: Option<u32>,
}

impl InvoiceQuery {
    /// Creates a query filtering by status
    pub fn by_status(status: InvoiceStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Adds a search term
    pub fn search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        self.search = if term.trim().is_empty() { None } else { Some(term) };
        self
    }

    /// Adds pagination to the query
    pub fn paginate(mut self, limit: u32, offset: u32) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }

    /// Returns true when the invoice satisfies the status and search filters
    ///
    /// Pagination is not considered.
    pub fn matches(&self, invoice: &Invoice) -> bool {
        if let Some(status) = self.status {
            if invoice.status != status {
                return false;
            }
        }

        match &self.search {
            None => true,
            Some(term) => {
                let term = term.trim().to_lowercase();
                invoice.invoice_number.as_str().to_lowercase().contains(&term)
                    || invoice.customer.name.to_lowercase().contains(&term)
                    || invoice.customer.phone_number.contains(&term)
            }
        }
    }
}

/// Persistence capability consumed by the invoicing domain
#[async_trait]
pub trait InvoiceStorePort: DomainPort + HealthCheckable {
    /// Returns the most recently created invoice number starting with `year_prefix`
    ///
    /// Ordering is by creation time, newest first.
    async fn latest_invoice_number(&self, year_prefix: &str) -> Result<Option<InvoiceNumber>, PortError>;

    /// Persists a new invoice
    ///
    /// # Errors
    ///
    /// `PortError::Conflict` if the invoice number is already taken.
    async fn create_invoice(&self, invoice: &NewInvoice) -> Result<Invoice, PortError>;

    /// Finds an invoice by key
    async fn find_invoice(&self, id: InvoiceId) -> Result<Invoice, PortError>;

    /// Writes back status and payment amounts of an existing invoice
    async fn update_invoice(&self, invoice: &Invoice) -> Result<Invoice, PortError>;

    /// Lists invoices, newest first
    async fn list_invoices(&self, query: &InvoiceQuery) -> Result<Vec<Invoice>, PortError>;
}
