//! Strongly-typed identifiers for domain entities
//!
//! Records are keyed by database-assigned serial numbers. Newtype wrappers
//! keep an invoice key from being passed where a product key is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates an identifier from a raw serial value
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw serial value
            pub fn value(&self) -> i64 {
                self.0
            }

            /// Returns the identifier prefix for display
            pub fn prefix() -> &'static str {
                $prefix
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                // Strip prefix if present
                let raw = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                Ok(Self(raw.parse()?))
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> i64 {
                id.0
            }
        }
    };
}

define_id!(InvoiceId, "INV");
define_id!(InvoiceItemId, "ITEM");
define_id!(CustomerId, "CUST");
define_id!(ProductId, "PROD");
define_id!(ShippingId, "SHIP");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoice_id_display() {
        let id = InvoiceId::new(42);
        assert_eq!(id.to_string(), "INV-42");
    }

    #[test]
    fn test_id_parsing() {
        let original = ProductId::new(7);
        let parsed: ProductId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);

        let bare: ProductId = "7".parse().unwrap();
        assert_eq!(bare, original);
    }

    #[test]
    fn test_raw_conversion() {
        let customer_id = CustomerId::from(11);
        let back: i64 = customer_id.into();
        assert_eq!(back, 11);
    }
}
