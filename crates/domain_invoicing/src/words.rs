//! Amount-in-words formatting in the Indian numbering system
//!
//! Amounts are spelled group by group, most significant first:
//! crore (1,00,00,000), lakh (1,00,000), thousand, hundred, and the
//! remainder below one hundred. Group counts are themselves spelled
//! recursively, so `150,00,00,000` reads "One Hundred and Fifty Crore".
//!
//! ```rust
//! use domain_invoicing::words::to_words;
//! use rust_decimal_macros::dec;
//!
//! assert_eq!(
//!     to_words(dec!(1234567.89)),
//!     "Twelve Lakh Thirty-Four Thousand Five Hundred and Sixty-Seven and Eighty-Nine Paise"
//! );
//! ```

use core_kernel::round_half_up;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

const ONES: [&str; 20] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten",
    "Eleven", "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen",
    "Eighteen", "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

/// Place-value groups, visited most significant first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlaceValue {
    Crore,
    Lakh,
    Thousand,
    Hundred,
}

impl PlaceValue {
    const ORDER: [PlaceValue; 4] = [
        PlaceValue::Crore,
        PlaceValue::Lakh,
        PlaceValue::Thousand,
        PlaceValue::Hundred,
    ];

    fn size(self) -> u128 {
        match self {
            PlaceValue::Crore => 10_000_000,
            PlaceValue::Lakh => 100_000,
            PlaceValue::Thousand => 1_000,
            PlaceValue::Hundred => 100,
        }
    }

    fn name(self) -> &'static str {
        match self {
            PlaceValue::Crore => "Crore",
            PlaceValue::Lakh => "Lakh",
            PlaceValue::Thousand => "Thousand",
            PlaceValue::Hundred => "Hundred",
        }
    }
}

/// Spells a currency amount in words
///
/// The amount is rounded half-up to the nearest paisa first. A nonzero
/// paise part adds `" and {paise} Paise"`. Zero reads `"Zero"`, negative
/// amounts are prefixed with `"Minus "`.
///
/// Amounts beyond `u128` rupees are not representable by `Decimal` in the
/// first place, so the function is total over its input type.
pub fn to_words(amount: Decimal) -> String {
    if amount.is_sign_negative() && !round_half_up(amount, 2).is_zero() {
        return format!("Minus {}", to_words(amount.abs()));
    }

    let rounded = round_half_up(amount.abs(), 2);
    let rupees = rounded.trunc();
    let paise = ((rounded - rupees) * Decimal::ONE_HUNDRED).to_u128().unwrap_or(0);

    let mut words = integer_to_words(rupees.to_u128().unwrap_or(0));
    if paise > 0 {
        words.push_str(" and ");
        words.push_str(&integer_to_words(paise));
        words.push_str(" Paise");
    }
    words
}

/// The form printed on invoices: the amount in words followed by "Only"
pub fn amount_in_words_line(amount: Decimal) -> String {
    format!("{} Only", to_words(amount))
}

/// Spells a whole number using Indian grouping
pub fn integer_to_words(value: u128) -> String {
    if value == 0 {
        return "Zero".to_string();
    }

    let mut remaining = value;
    let mut segments: Vec<String> = Vec::new();

    for place in PlaceValue::ORDER {
        let count = remaining / place.size();
        if count > 0 {
            segments.push(format!("{} {}", integer_to_words(count), place.name()));
            remaining %= place.size();
        }
    }

    if remaining > 0 {
        let tail = below_hundred(remaining as usize);
        if segments.is_empty() {
            segments.push(tail);
        } else {
            segments.push(format!("and {tail}"));
        }
    }

    segments.join(" ")
}

fn below_hundred(value: usize) -> String {
    debug_assert!(value < 100);
    if value < 20 {
        ONES[value].to_string()
    } else if value % 10 == 0 {
        TENS[value / 10].to_string()
    } else {
        format!("{}-{}", TENS[value / 10], ONES[value % 10])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_zero() {
        assert_eq!(to_words(Decimal::ZERO), "Zero");
    }

    #[test]
    fn test_negative() {
        assert_eq!(to_words(dec!(-5)), "Minus Five");
    }

    #[test]
    fn test_teens_and_tens() {
        assert_eq!(integer_to_words(13), "Thirteen");
        assert_eq!(integer_to_words(40), "Forty");
        assert_eq!(integer_to_words(25), "Twenty-Five");
    }

    #[test]
    fn test_and_before_remainder() {
        assert_eq!(integer_to_words(105), "One Hundred and Five");
        assert_eq!(integer_to_words(100_005), "One Lakh and Five");
        assert_eq!(integer_to_words(2_000), "Two Thousand");
    }

    #[test]
    fn test_paise() {
        assert_eq!(to_words(dec!(0.5)), "Zero and Fifty Paise");
        assert_eq!(to_words(dec!(10.005)), "Ten and One Paise");
    }

    #[test]
    fn test_rounding_carries_into_rupees() {
        assert_eq!(to_words(dec!(1.999)), "Two");
    }

    #[test]
    fn test_invoice_line() {
        assert_eq!(amount_in_words_line(dec!(1120)), "One Thousand One Hundred and Twenty Only");
    }
}
