//! In-memory invoice store
//!
//! An `InvoiceStorePort` backed by a `Vec`, enforcing the same
//! invoice-number uniqueness the PostgreSQL schema does. It can also hold
//! "latest number" reads at a barrier so several allocators observe the
//! same history before any of them writes, which is how two overlapping
//! requests look to the service in production.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Barrier;

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, InvoiceId, PortError};
use domain_invoicing::{Invoice, InvoiceNumber, InvoiceQuery, InvoiceStorePort, NewInvoice};

const ADAPTER_ID: &str = "in-memory-invoice-store";

#[derive(Default)]
struct StoreState {
    invoices: Vec<Invoice>,
    next_id: i64,
}

struct ReadGate {
    barrier: Arc<Barrier>,
    remaining: u32,
}

/// In-memory invoice store for tests
#[derive(Default)]
pub struct InMemoryInvoiceStore {
    state: Mutex<StoreState>,
    gate: Mutex<Option<ReadGate>>,
    unavailable: AtomicBool,
    create_attempts: AtomicU32,
    conflicts: AtomicU32,
}

impl InMemoryInvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `readers` calls to `latest_invoice_number` wait for
    /// each other after reading, so they all see the same latest number
    pub fn synchronize_reads(&self, readers: u32) {
        if let Ok(mut gate) = self.gate.lock() {
            *gate = (readers > 0).then(|| ReadGate {
                barrier: Arc::new(Barrier::new(readers as usize)),
                remaining: readers,
            });
        }
    }

    /// Makes every call fail with a connection error until switched back
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Number of `create_invoice` calls, successful or not
    pub fn create_attempts(&self) -> u32 {
        self.create_attempts.load(Ordering::SeqCst)
    }

    /// Number of creates rejected as duplicates
    pub fn conflicts(&self) -> u32 {
        self.conflicts.load(Ordering::SeqCst)
    }

    /// Stored invoice numbers in creation order
    pub fn numbers(&self) -> Vec<InvoiceNumber> {
        self.state
            .lock()
            .map(|state| state.invoices.iter().map(|inv| inv.invoice_number.clone()).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.state.lock().map(|state| state.invoices.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn state(&self) -> Result<MutexGuard<'_, StoreState>, PortError> {
        self.state
            .lock()
            .map_err(|_| PortError::internal("in-memory store lock poisoned"))
    }

    fn check_available(&self) -> Result<(), PortError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(PortError::connection("in-memory store marked unavailable"))
        } else {
            Ok(())
        }
    }

    fn take_gate(&self) -> Option<Arc<Barrier>> {
        let mut gate = self.gate.lock().ok()?;
        let current = gate.as_mut()?;
        let barrier = current.barrier.clone();
        current.remaining -= 1;
        if current.remaining == 0 {
            *gate = None;
        }
        Some(barrier)
    }
}

impl DomainPort for InMemoryInvoiceStore {}

#[async_trait]
impl HealthCheckable for InMemoryInvoiceStore {
    async fn health_check(&self) -> HealthCheckResult {
        match self.check_available() {
            Ok(()) => HealthCheckResult::healthy(ADAPTER_ID, 0),
            Err(err) => HealthCheckResult::unhealthy(ADAPTER_ID, 0, err.to_string()),
        }
    }
}

#[async_trait]
impl InvoiceStorePort for InMemoryInvoiceStore {
    async fn latest_invoice_number(&self, year_prefix: &str) -> Result<Option<InvoiceNumber>, PortError> {
        self.check_available()?;
        let latest = self
            .state()?
            .invoices
            .iter()
            .rev()
            .find(|inv| inv.invoice_number.as_str().starts_with(year_prefix))
            .map(|inv| inv.invoice_number.clone());

        if let Some(barrier) = self.take_gate() {
            barrier.wait().await;
        }
        Ok(latest)
    }

    async fn create_invoice(&self, invoice: &NewInvoice) -> Result<Invoice, PortError> {
        self.create_attempts.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let mut state = self.state()?;
        if state
            .invoices
            .iter()
            .any(|inv| inv.invoice_number == invoice.invoice_number)
        {
            self.conflicts.fetch_add(1, Ordering::SeqCst);
            return Err(PortError::conflict(format!(
                "invoice number {} already exists",
                invoice.invoice_number
            )));
        }

        state.next_id += 1;
        let created = Invoice::from_new(InvoiceId::new(state.next_id), invoice.clone(), Utc::now());
        state.invoices.push(created.clone());
        Ok(created)
    }

    async fn find_invoice(&self, id: InvoiceId) -> Result<Invoice, PortError> {
        self.check_available()?;
        self.state()?
            .invoices
            .iter()
            .find(|inv| inv.id == id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Invoice", id))
    }

    async fn update_invoice(&self, invoice: &Invoice) -> Result<Invoice, PortError> {
        self.check_available()?;
        let mut state = self.state()?;
        let slot = state
            .invoices
            .iter_mut()
            .find(|inv| inv.id == invoice.id)
            .ok_or_else(|| PortError::not_found("Invoice", invoice.id))?;
        *slot = invoice.clone();
        Ok(invoice.clone())
    }

    async fn list_invoices(&self, query: &InvoiceQuery) -> Result<Vec<Invoice>, PortError> {
        self.check_available()?;
        let offset = query.offset.unwrap_or(0) as usize;
        let limit = query.limit.map(|l| l as usize).unwrap_or(usize::MAX);

        Ok(self
            .state()?
            .invoices
            .iter()
            .rev()
            .filter(|inv| query.matches(inv))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}
