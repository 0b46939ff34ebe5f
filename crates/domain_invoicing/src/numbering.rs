//! Invoice number sequence allocation
//!
//! Invoice numbers have the shape `{year}/{yy}-INV-{sequence}` where `yy`
//! is the following year modulo 100 and the sequence is zero-padded to four
//! digits, e.g. `2024/25-INV-0007`.
//!
//! The allocator derives the next number from the most recently created
//! number for the year. It reserves nothing: two overlapping allocations can
//! produce the same number, and the store's unique constraint decides which
//! write wins (see [`crate::service`]).

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::InvoicingError;

/// Marker between the year part and the sequence
pub const INVOICE_MARKER: &str = "INV";

/// Minimum digits in the sequence group
pub const SEQUENCE_WIDTH: usize = 4;

/// A human-readable invoice number
///
/// Treated as opaque once stored: numbers read back from persistence are
/// wrapped as-is and only their trailing sequence group is ever inspected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceNumber(String);

impl InvoiceNumber {
    /// Formats the number for a year and sequence
    pub fn format(year: i32, sequence: u32) -> Self {
        let year_short = (year + 1).rem_euclid(100);
        Self(format!(
            "{year}/{year_short:02}-{INVOICE_MARKER}-{sequence:0width$}",
            width = SEQUENCE_WIDTH
        ))
    }

    /// Returns the number as text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the trailing sequence value
    pub fn sequence(&self) -> Result<u32, InvoicingError> {
        trailing_sequence(&self.0)
    }

    /// Returns true when the number belongs to the given year
    pub fn is_for_year(&self, year: i32) -> bool {
        self.0.starts_with(&year_prefix(year))
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for InvoiceNumber {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<InvoiceNumber> for String {
    fn from(number: InvoiceNumber) -> String {
        number.0
    }
}

impl AsRef<str> for InvoiceNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The prefix shared by every invoice number of a year, e.g. `"2024/"`
pub fn year_prefix(year: i32) -> String {
    format!("{year}/")
}

/// The numbering year for an invoice date
///
/// Numbering follows the calendar year of the invoice date.
pub fn invoice_year(date: NaiveDate) -> i32 {
    date.year()
}

/// Extracts the digit run after the last `-`
///
/// # Errors
///
/// `MalformedSequence` if there is no `-`, the trailing group is empty or
/// contains a non-digit, or the value does not fit a `u32`.
pub fn trailing_sequence(number: &str) -> Result<u32, InvoicingError> {
    let (_, tail) = number
        .rsplit_once('-')
        .ok_or_else(|| InvoicingError::malformed_sequence(number, "no '-' before the sequence group"))?;

    if tail.is_empty() || !tail.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InvoicingError::malformed_sequence(
            number,
            "trailing group is not numeric",
        ));
    }

    tail.parse::<u32>()
        .map_err(|_| InvoicingError::malformed_sequence(number, "sequence is out of range"))
}

/// Computes the number following `latest` for `current_year`
///
/// `None` starts the year's sequence at 1.
pub fn next_after(current_year: i32, latest: Option<&str>) -> Result<InvoiceNumber, InvoicingError> {
    let sequence = match latest {
        None => 1,
        Some(latest) => trailing_sequence(latest)?
            .checked_add(1)
            .ok_or_else(|| InvoicingError::malformed_sequence(latest, "sequence cannot be incremented"))?,
    };
    Ok(InvoiceNumber::format(current_year, sequence))
}

/// Produces the next invoice number for `current_year`
///
/// `lookup_latest` receives the year prefix (e.g. `"2024/"`) and returns the
/// most recently created invoice number starting with it, if any.
///
/// # Errors
///
/// `MalformedSequence` if the latest stored number has no numeric trailing
/// group. The allocator does not fall back to 1 in that case, since doing so
/// would hand out a number that may already exist.
pub fn next_invoice_number<F>(current_year: i32, lookup_latest: F) -> Result<InvoiceNumber, InvoicingError>
where
    F: FnOnce(&str) -> Option<String>,
{
    let latest = lookup_latest(&year_prefix(current_year));
    next_after(current_year, latest.as_deref())
}
