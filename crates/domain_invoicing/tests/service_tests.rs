//! Tests for invoice issuing and payment recording

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal_macros::dec;

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, InvoiceId, Money, PortError, ProductId};

use domain_invoicing::{
    AdvanceInput, CustomerInfo, Invoice, InvoiceDraft, InvoiceNumber, InvoiceQuery, InvoiceService,
    InvoiceStatus, InvoiceStorePort, InvoicingError, LineItem, NewInvoice, PaymentUpdate,
};

/// Store that can be told to serve stale "latest number" reads, the way a
/// concurrent writer committing in between would look to the service
#[derive(Default)]
struct ScriptedStore {
    invoices: Mutex<Vec<Invoice>>,
    stale_reads: AtomicU32,
    create_calls: AtomicU32,
    fail_creates: bool,
}

impl ScriptedStore {
    fn with_stale_reads(count: u32) -> Self {
        Self {
            stale_reads: AtomicU32::new(count),
            ..Default::default()
        }
    }
}

impl DomainPort for ScriptedStore {}

#[async_trait]
impl HealthCheckable for ScriptedStore {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::healthy("scripted", 0)
    }
}

#[async_trait]
impl InvoiceStorePort for ScriptedStore {
    async fn latest_invoice_number(&self, year_prefix: &str) -> Result<Option<InvoiceNumber>, PortError> {
        let stale = self
            .stale_reads
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if stale {
            return Ok(None);
        }
        let invoices = self.invoices.lock().unwrap();
        Ok(invoices
            .iter()
            .rev()
            .find(|inv| inv.invoice_number.as_str().starts_with(year_prefix))
            .map(|inv| inv.invoice_number.clone()))
    }

    async fn create_invoice(&self, invoice: &NewInvoice) -> Result<Invoice, PortError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_creates {
            return Err(PortError::connection("database unavailable"));
        }
        let mut invoices = self.invoices.lock().unwrap();
        if invoices.iter().any(|inv| inv.invoice_number == invoice.invoice_number) {
            return Err(PortError::conflict(format!("duplicate {}", invoice.invoice_number)));
        }
        let id = InvoiceId::new(invoices.len() as i64 + 1);
        let created = Invoice::from_new(id, invoice.clone(), Utc::now());
        invoices.push(created.clone());
        Ok(created)
    }

    async fn find_invoice(&self, id: InvoiceId) -> Result<Invoice, PortError> {
        self.invoices
            .lock()
            .unwrap()
            .iter()
            .find(|inv| inv.id == id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Invoice", id))
    }

    async fn update_invoice(&self, invoice: &Invoice) -> Result<Invoice, PortError> {
        let mut invoices = self.invoices.lock().unwrap();
        let slot = invoices
            .iter_mut()
            .find(|inv| inv.id == invoice.id)
            .ok_or_else(|| PortError::not_found("Invoice", invoice.id))?;
        *slot = invoice.clone();
        Ok(invoice.clone())
    }

    async fn list_invoices(&self, query: &InvoiceQuery) -> Result<Vec<Invoice>, PortError> {
        Ok(self
            .invoices
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|inv| query.matches(inv))
            .cloned()
            .collect())
    }
}

fn draft_on(year: i32) -> InvoiceDraft {
    let date = NaiveDate::from_ymd_opt(year, 6, 1).unwrap();
    let items = vec![
        LineItem::new(ProductId::new(11), "Dokra Horse", Money::inr(dec!(2400)), 1),
        LineItem::new(ProductId::new(12), "Kantha Stole", Money::inr(dec!(850)), 2).with_discount(dec!(10)),
    ];
    InvoiceDraft::new(CustomerInfo::new("Ravi Menon", "9000012345"), date, items)
}

// ============================================================================
// Issuing
// ============================================================================

mod issue_tests {
    use super::*;

    #[tokio::test]
    async fn test_sequential_issues_are_numbered_in_order() {
        let store = Arc::new(ScriptedStore::default());
        let service = InvoiceService::new(store.clone());

        let first = service.issue(&draft_on(2024)).await.unwrap();
        let second = service.issue(&draft_on(2024)).await.unwrap();

        assert_eq!(first.invoice_number.as_str(), "2024/25-INV-0001");
        assert_eq!(second.invoice_number.as_str(), "2024/25-INV-0002");
    }

    #[tokio::test]
    async fn test_new_year_restarts_sequence() {
        let service = InvoiceService::new(Arc::new(ScriptedStore::default()));

        service.issue(&draft_on(2024)).await.unwrap();
        let next_year = service.issue(&draft_on(2025)).await.unwrap();

        assert_eq!(next_year.invoice_number.as_str(), "2025/26-INV-0001");
    }

    #[tokio::test]
    async fn test_issued_invoice_carries_computed_totals() {
        let service = InvoiceService::new(Arc::new(ScriptedStore::default()));
        let draft = draft_on(2024).with_advance(AdvanceInput::Percent(dec!(50)));

        let invoice = service.issue(&draft).await.unwrap();

        // 2400 + 765 × 2 = 3930, plus 12% GST
        assert_eq!(invoice.totals.subtotal.amount(), dec!(3930));
        assert_eq!(invoice.totals.grand_total.amount(), dec!(4401.60));
        assert_eq!(invoice.balance_due(), dec!(2200.80));
        assert_eq!(
            invoice.total_in_words,
            "Four Thousand Four Hundred and One and Sixty Paise Only"
        );
    }

    #[tokio::test]
    async fn test_conflict_is_retried_with_fresh_lookup() {
        let store = Arc::new(ScriptedStore::default());
        let service = InvoiceService::new(store.clone());
        service.issue(&draft_on(2024)).await.unwrap();

        // Next lookup misses the existing invoice, as if it committed concurrently
        store.stale_reads.store(1, Ordering::SeqCst);
        let invoice = service.issue(&draft_on(2024)).await.unwrap();

        assert_eq!(invoice.invoice_number.as_str(), "2024/25-INV-0002");
        assert_eq!(store.create_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausted_retries_report_allocation_conflict() {
        let store = Arc::new(ScriptedStore::with_stale_reads(0));
        let service = InvoiceService::new(store.clone()).with_max_attempts(3);
        service.issue(&draft_on(2024)).await.unwrap();

        store.stale_reads.store(10, Ordering::SeqCst);
        let result = service.issue(&draft_on(2024)).await;

        match result {
            Err(InvoicingError::AllocationConflict { attempts, last_number }) => {
                assert_eq!(attempts, 3);
                assert_eq!(last_number, "2024/25-INV-0001");
            }
            other => panic!("expected AllocationConflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_draft_allocates_nothing() {
        let store = Arc::new(ScriptedStore::default());
        let service = InvoiceService::new(store.clone());
        let mut draft = draft_on(2024);
        draft.items[0].quantity = 0;

        let result = service.issue(&draft).await;

        assert!(matches!(result, Err(InvoicingError::InvalidLineItem { index: 0, .. })));
        assert_eq!(store.create_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_store_failure_is_not_retried() {
        let store = Arc::new(ScriptedStore {
            fail_creates: true,
            ..Default::default()
        });
        let service = InvoiceService::new(store.clone());

        let result = service.issue(&draft_on(2024)).await;

        assert!(matches!(result, Err(InvoicingError::Persistence(_))));
        assert_eq!(store.create_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_next_number_does_not_reserve() {
        let service = InvoiceService::new(Arc::new(ScriptedStore::default()));

        let peek = service.next_number(2024).await.unwrap();
        let issued = service.issue(&draft_on(2024)).await.unwrap();

        assert_eq!(peek, issued.invoice_number);
    }
}

// ============================================================================
// Payments
// ============================================================================

mod payment_tests {
    use super::*;

    #[tokio::test]
    async fn test_record_advance() {
        let service = InvoiceService::new(Arc::new(ScriptedStore::default()));
        let invoice = service.issue(&draft_on(2024)).await.unwrap();

        let update = PaymentUpdate {
            status: Some(InvoiceStatus::Pending),
            advance_paid: Some(dec!(1000)),
        };
        let saved = service.record_payment(invoice.id, &update).await.unwrap();

        assert_eq!(saved.status, InvoiceStatus::Pending);
        assert_eq!(saved.totals.advance_amount.amount(), dec!(1000));
        assert_eq!(saved.balance_due(), dec!(3401.60));
    }

    #[tokio::test]
    async fn test_paid_overrides_arithmetic() {
        let service = InvoiceService::new(Arc::new(ScriptedStore::default()));
        let invoice = service.issue(&draft_on(2024)).await.unwrap();

        let update = PaymentUpdate {
            status: Some(InvoiceStatus::Paid),
            advance_paid: Some(dec!(10)),
        };
        let saved = service.record_payment(invoice.id, &update).await.unwrap();

        assert!(saved.totals.balance_due.is_zero());
        assert!(saved.totals.advance_amount.is_zero());

        let found = service.get(invoice.id).await.unwrap();
        assert_eq!(found.status, InvoiceStatus::Paid);
    }

    #[tokio::test]
    async fn test_reopening_paid_invoice_rederives_balance() {
        let service = InvoiceService::new(Arc::new(ScriptedStore::default()));
        let invoice = service
            .issue(&draft_on(2024).with_status(InvoiceStatus::Paid))
            .await
            .unwrap();
        assert!(invoice.totals.balance_due.is_zero());

        let update = PaymentUpdate {
            status: Some(InvoiceStatus::Pending),
            advance_paid: None,
        };
        let reopened = service.record_payment(invoice.id, &update).await.unwrap();

        assert_eq!(reopened.balance_due(), reopened.totals.grand_total.amount());
    }

    #[tokio::test]
    async fn test_unknown_invoice() {
        let service = InvoiceService::new(Arc::new(ScriptedStore::default()));
        let result = service.record_payment(InvoiceId::new(404), &PaymentUpdate::default()).await;

        assert!(matches!(result, Err(InvoicingError::InvoiceNotFound(_))));
    }
}

// ============================================================================
// Listing
// ============================================================================

mod list_tests {
    use super::*;

    #[tokio::test]
    async fn test_filters_by_status_and_search() {
        let service = InvoiceService::new(Arc::new(ScriptedStore::default()));
        service.issue(&draft_on(2024)).await.unwrap();
        let mut other = draft_on(2024).with_status(InvoiceStatus::Final);
        other.customer = CustomerInfo::new("Meera Iyer", "9811122233");
        service.issue(&other).await.unwrap();

        let finals = service.list(&InvoiceQuery::by_status(InvoiceStatus::Final)).await.unwrap();
        assert_eq!(finals.len(), 1);
        assert_eq!(finals[0].customer.name, "Meera Iyer");

        let by_name = service.list(&InvoiceQuery::default().search("ravi")).await.unwrap();
        assert_eq!(by_name.len(), 1);

        let by_number = service.list(&InvoiceQuery::default().search("inv-0002")).await.unwrap();
        assert_eq!(by_number.len(), 1);
        assert_eq!(by_number[0].customer.phone_number, "9811122233");
    }
}
