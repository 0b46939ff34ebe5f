//! Tests for invoice number allocation

use chrono::NaiveDate;
use proptest::prelude::*;

use domain_invoicing::numbering::invoice_year;
use domain_invoicing::{next_after, next_invoice_number, trailing_sequence, year_prefix, InvoiceNumber, InvoicingError};

mod format_tests {
    use super::*;

    #[test]
    fn test_format_pads_sequence() {
        assert_eq!(InvoiceNumber::format(2024, 1).as_str(), "2024/25-INV-0001");
        assert_eq!(InvoiceNumber::format(2024, 42).as_str(), "2024/25-INV-0042");
    }

    #[test]
    fn test_sequence_grows_past_four_digits() {
        assert_eq!(InvoiceNumber::format(2024, 12345).as_str(), "2024/25-INV-12345");
    }

    #[test]
    fn test_year_short_is_following_year() {
        assert_eq!(InvoiceNumber::format(2009, 1).as_str(), "2009/10-INV-0001");
        assert_eq!(InvoiceNumber::format(2099, 1).as_str(), "2099/00-INV-0001");
    }

    #[test]
    fn test_year_membership() {
        let number = InvoiceNumber::format(2024, 9);
        assert!(number.is_for_year(2024));
        assert!(!number.is_for_year(2025));
        assert_eq!(year_prefix(2024), "2024/");
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let json = serde_json::to_string(&InvoiceNumber::format(2024, 3)).unwrap();
        assert_eq!(json, "\"2024/25-INV-0003\"");
    }

    #[test]
    fn test_numbering_year_is_calendar_year() {
        let march = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        let april = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        assert_eq!(invoice_year(march), 2025);
        assert_eq!(invoice_year(april), 2025);
    }
}

mod sequence_tests {
    use super::*;

    #[test]
    fn test_trailing_sequence() {
        assert_eq!(trailing_sequence("2024/25-INV-0007").unwrap(), 7);
        assert_eq!(trailing_sequence("legacy-15").unwrap(), 15);
    }

    #[test]
    fn test_trailing_sequence_rejects_non_numeric() {
        for bad in ["2024/25-INV-", "2024/25-INV-00a1", "no separator", "2024/25-INV-+12"] {
            assert!(
                matches!(trailing_sequence(bad), Err(InvoicingError::MalformedSequence { .. })),
                "{bad} should be malformed"
            );
        }
    }

    #[test]
    fn test_trailing_sequence_overflow() {
        assert!(trailing_sequence("2024/25-INV-99999999999").is_err());
    }

    #[test]
    fn test_next_after_year_reset() {
        // A lookup scoped to the new year finds nothing, so the sequence restarts
        assert_eq!(next_after(2025, None).unwrap().as_str(), "2025/26-INV-0001");
    }

    #[test]
    fn test_next_from_lookup() {
        let number = next_invoice_number(2024, |prefix| {
            assert_eq!(prefix, "2024/");
            Some("2024/25-INV-0099".to_string())
        })
        .unwrap();
        assert_eq!(number.as_str(), "2024/25-INV-0100");
        assert_eq!(number.sequence().unwrap(), 100);
    }

    #[test]
    fn test_first_of_year() {
        assert_eq!(next_invoice_number(2024, |_| None).unwrap().as_str(), "2024/25-INV-0001");
    }

    #[test]
    fn test_malformed_latest_does_not_restart() {
        let result = next_invoice_number(2024, |_| Some("2024/25-INV-DRAFT".to_string()));
        assert!(matches!(result, Err(InvoicingError::MalformedSequence { .. })));
    }
}

proptest! {
    #[test]
    fn prop_next_increments_by_one(year in 2000i32..2100i32, sequence in 1u32..1_000_000u32) {
        let latest = InvoiceNumber::format(year, sequence);
        let next = next_after(year, Some(latest.as_str())).unwrap();

        prop_assert_eq!(next.sequence().unwrap(), sequence + 1);
        prop_assert!(next.is_for_year(year));
    }

    #[test]
    fn prop_format_then_parse(year in 2000i32..2100i32, sequence in 0u32..10_000_000u32) {
        let number = InvoiceNumber::format(year, sequence);
        prop_assert_eq!(trailing_sequence(number.as_str()).unwrap(), sequence);
    }
}
