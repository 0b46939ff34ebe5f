//! Custom Test Assertions
//!
//! Assertion helpers for domain types that give more meaningful failure
//! messages than `assert_eq!` on the raw structs.

use std::collections::HashSet;

use rust_decimal::Decimal;

use core_kernel::Money;
use domain_invoicing::{trailing_sequence, Invoice, InvoiceNumber, InvoiceTotals};

/// Asserts that two Money values are approximately equal within a tolerance
///
/// # Panics
///
/// Panics if the currencies don't match or the amounts differ by more than tolerance
pub fn assert_money_approx_eq(actual: &Money, expected: &Money, tolerance: Decimal) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );

    let diff = (actual.amount() - expected.amount()).abs();
    assert!(
        diff <= tolerance,
        "Money amounts differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual.amount(),
        expected.amount(),
        diff,
        tolerance
    );
}

/// Asserts that a Money value equals `expected` once rounded to paise
pub fn assert_money_eq(actual: &Money, expected: Decimal) {
    let rounded = actual.round_to_currency().amount();
    assert_eq!(
        rounded,
        expected,
        "Expected {} {}, got {} (unrounded {})",
        actual.currency().symbol(),
        expected,
        rounded,
        actual.amount()
    );
}

/// Asserts that a Money value is zero
pub fn assert_money_zero(money: &Money) {
    assert!(
        money.is_zero(),
        "Expected zero money, got {} {}",
        money.currency().symbol(),
        money.amount()
    );
}

/// Asserts the arithmetic relations every set of totals must satisfy
///
/// `grand_total = subtotal + cgst + sgst` and
/// `balance_due = grand_total - advance_amount`, unless the totals are
/// settled (advance and balance both zero).
pub fn assert_totals_consistent(totals: &InvoiceTotals) {
    let expected_grand = totals.subtotal + totals.cgst + totals.sgst;
    assert_eq!(
        totals.grand_total, expected_grand,
        "grand_total {} != subtotal {} + cgst {} + sgst {}",
        totals.grand_total.amount(),
        totals.subtotal.amount(),
        totals.cgst.amount(),
        totals.sgst.amount()
    );

    let settled = totals.advance_amount.is_zero() && totals.balance_due.is_zero();
    if !settled {
        assert_eq!(
            totals.balance_due,
            totals.grand_total - totals.advance_amount,
            "balance_due {} != grand_total {} - advance {}",
            totals.balance_due.amount(),
            totals.grand_total.amount(),
            totals.advance_amount.amount()
        );
    }
}

/// Asserts that no invoice number occurs twice
pub fn assert_numbers_unique(numbers: &[InvoiceNumber]) {
    let mut seen = HashSet::new();
    for number in numbers {
        assert!(seen.insert(number.as_str()), "Invoice number {} allocated twice", number);
    }
}

/// Asserts that the numbers carry sequences `1..=n` in some order
pub fn assert_sequence_contiguous(numbers: &[InvoiceNumber]) {
    let mut sequences: Vec<u32> = numbers
        .iter()
        .map(|number| {
            trailing_sequence(number.as_str())
                .unwrap_or_else(|err| panic!("Invoice number {} is malformed: {}", number, err))
        })
        .collect();
    sequences.sort_unstable();

    let expected: Vec<u32> = (1..=numbers.len() as u32).collect();
    assert_eq!(sequences, expected, "Sequences are not contiguous from 1");
}

/// Asserts that an invoice has been fully paid off
pub fn assert_settled(invoice: &Invoice) {
    assert!(invoice.status.is_paid(), "Expected PAID, got {}", invoice.status);
    assert_money_zero(&invoice.totals.advance_amount);
    assert_money_zero(&invoice.totals.balance_due);
}
