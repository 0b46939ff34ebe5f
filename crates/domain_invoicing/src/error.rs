//! Invoicing domain errors

use core_kernel::{MoneyError, PortError};
use thiserror::Error;

/// Errors that can occur in the invoicing domain
#[derive(Debug, Error)]
pub enum InvoicingError {
    /// A line item failed validation; the whole computation is rejected
    #[error("Invalid line item at position {index}: {reason}")]
    InvalidLineItem {
        index: usize,
        reason: String,
    },

    /// The advance input is out of range
    #[error("Invalid advance: {0}")]
    InvalidAdvance(String),

    /// The invoice-level discount is out of range
    #[error("Invalid discount: {0}")]
    InvalidDiscount(String),

    /// A stored invoice number has no numeric trailing group
    #[error("Malformed invoice number '{number}': {reason}")]
    MalformedSequence {
        number: String,
        reason: String,
    },

    /// Every allocation attempt collided with an existing invoice number
    #[error("Invoice number allocation conflicted after {attempts} attempt(s), last tried {last_number}")]
    AllocationConflict {
        attempts: u32,
        last_number: String,
    },

    /// Unknown invoice status text
    #[error("Invalid invoice status: {0}")]
    InvalidStatus(String),

    /// Invoice not found
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(String),

    /// Calculation error
    #[error("Calculation error: {0}")]
    Calculation(#[from] MoneyError),

    /// The persistence port failed for a reason other than a conflict
    #[error("Persistence error: {0}")]
    Persistence(#[source] PortError),
}

impl InvoicingError {
    pub fn invalid_line_item(index: usize, reason: impl Into<String>) -> Self {
        InvoicingError::InvalidLineItem {
            index,
            reason: reason.into(),
        }
    }

    pub fn malformed_sequence(number: impl Into<String>, reason: impl Into<String>) -> Self {
        InvoicingError::MalformedSequence {
            number: number.into(),
            reason: reason.into(),
        }
    }

    /// Returns true for errors caused by the caller's input
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            InvoicingError::InvalidLineItem { .. }
                | InvoicingError::InvalidAdvance(_)
                | InvoicingError::InvalidDiscount(_)
                | InvoicingError::InvalidStatus(_)
        )
    }
}

impl From<PortError> for InvoicingError {
    fn from(error: PortError) -> Self {
        match error {
            PortError::NotFound { id, .. } => InvoicingError::InvoiceNotFound(id),
            other => InvoicingError::Persistence(other),
        }
    }
}
