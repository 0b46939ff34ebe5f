//! Property-Based Test Generators
//!
//! Proptest strategies that only produce values the calculator accepts, so
//! properties can focus on the arithmetic instead of validation.

use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{Money, ProductId};
use domain_invoicing::{AdvanceInput, LineItem};

/// Unit prices from 0.00 to 99,999.99 rupees
pub fn unit_price_strategy() -> impl Strategy<Value = Money> {
    (0i64..10_000_000i64).prop_map(|paise| Money::inr(Decimal::new(paise, 2)))
}

/// Quantities from 1 to 50
pub fn quantity_strategy() -> impl Strategy<Value = i64> {
    1i64..=50i64
}

/// Percentages from 0 to 100 with two decimal places
pub fn percentage_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Whole percentages, mostly zero, as shop discounts usually are
pub fn discount_strategy() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        3 => Just(Decimal::ZERO),
        1 => (1i64..=100i64).prop_map(Decimal::from),
    ]
}

/// Valid line items
pub fn line_item_strategy() -> impl Strategy<Value = LineItem> {
    (1i64..10_000i64, unit_price_strategy(), quantity_strategy(), discount_strategy()).prop_map(
        |(product, price, quantity, discount)| {
            LineItem::new(ProductId::new(product), format!("Item {product}"), price, quantity)
                .with_discount(discount)
        },
    )
}

/// One to ten valid line items
pub fn line_items_strategy() -> impl Strategy<Value = Vec<LineItem>> {
    prop::collection::vec(line_item_strategy(), 1..=10)
}

/// Advance inputs in either mode
pub fn advance_strategy() -> impl Strategy<Value = AdvanceInput> {
    prop_oneof![
        percentage_strategy().prop_map(AdvanceInput::Percent),
        (0i64..10_000_000i64).prop_map(|paise| AdvanceInput::Amount(Decimal::new(paise, 2))),
    ]
}

/// Amounts in rupees with paise, up to 99 crore
pub fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..99_999_999_999i64).prop_map(|paise| Decimal::new(paise, 2))
}

/// Sequence numbers that fit the four-digit field and beyond
pub fn sequence_strategy() -> impl Strategy<Value = u32> {
    prop_oneof![
        4 => 1u32..=9_999u32,
        1 => 10_000u32..=1_000_000u32,
    ]
}

/// Calendar years the numbering scheme supports
pub fn year_strategy() -> impl Strategy<Value = i32> {
    2000i32..=2099i32
}
