//! Pre-built Test Fixtures
//!
//! Ready-to-use test data for customers, dates, and catalogue items. The
//! named fixtures are fixed so expected totals can be written down by hand;
//! `CustomerFixtures::random` uses `fake` when the values do not matter.

use chrono::NaiveDate;
use fake::faker::address::en::{BuildingNumber, CityName, StreetName};
use fake::faker::name::en::Name;
use fake::Fake;
use rust_decimal_macros::dec;

use core_kernel::{Money, ProductId};
use domain_invoicing::{CustomerInfo, LineItem, ShippingInfo};

/// Fixture for customer data
pub struct CustomerFixtures;

impl CustomerFixtures {
    /// A walk-in retail customer with no address on file
    pub fn walk_in() -> CustomerInfo {
        CustomerInfo::new("Ananya Rao", "9845012345")
    }

    /// A registered business buyer with address and GSTIN
    pub fn gallery() -> CustomerInfo {
        let mut customer = CustomerInfo::new("Kalakriti Gallery", "9811122233")
            .with_address("14 Residency Road, Bengaluru");
        customer.gstin = Some("29ABCDE1234F1Z5".to_string());
        customer
    }

    /// A customer with a generated name, phone, and address
    pub fn random() -> CustomerInfo {
        let name: String = Name().fake();
        let phone: u64 = (6_000_000_000u64..10_000_000_000u64).fake();
        let building: String = BuildingNumber().fake();
        let street: String = StreetName().fake();
        let city: String = CityName().fake();

        CustomerInfo::new(name, phone.to_string()).with_address(format!("{building} {street}, {city}"))
    }
}

/// Fixture for shipping data
pub struct ShippingFixtures;

impl ShippingFixtures {
    pub fn warehouse() -> ShippingInfo {
        ShippingInfo {
            name: "Kalakriti Warehouse".to_string(),
            address: "Plot 7, Peenya Industrial Area, Bengaluru".to_string(),
        }
    }
}

/// Fixture for dates
pub struct DateFixtures;

impl DateFixtures {
    /// Invoice date used by most tests (June 1, 2024)
    pub fn invoice_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date")
    }

    /// Due date fifteen days after `invoice_date`
    pub fn due_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 16).expect("valid date")
    }

    /// Last day of the 2024 sequence
    pub fn year_end() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 12, 31).expect("valid date")
    }

    /// First day of the 2025 sequence
    pub fn new_year() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date")
    }
}

/// Fixture for catalogue line items
pub struct ItemFixtures;

impl ItemFixtures {
    /// Brass Dokra figurine, 2 x 1,500.00, no discount
    pub fn dokra_figurine() -> LineItem {
        LineItem::new(ProductId::new(101), "Dokra Figurine", Money::inr(dec!(1500.00)), 2)
            .with_hsn("7419")
            .with_unit("pcs")
    }

    /// Pattachitra scroll, 1 x 4,000.00 at 10% off
    pub fn pattachitra_scroll() -> LineItem {
        LineItem::new(ProductId::new(102), "Pattachitra Scroll", Money::inr(dec!(4000.00)), 1)
            .with_hsn("9701")
            .with_unit("pcs")
            .with_discount(dec!(10))
    }

    /// Channapatna toy set, 3 x 333.33, no discount
    pub fn channapatna_set() -> LineItem {
        LineItem::new(ProductId::new(103), "Channapatna Toy Set", Money::inr(dec!(333.33)), 3)
            .with_hsn("9503")
            .with_unit("set")
    }

    /// The figurine and scroll together
    ///
    /// Subtotal 6,600.00, discount 400.00, CGST and SGST 396.00 each, grand
    /// total 7,392.00 with tax.
    pub fn standard_order() -> Vec<LineItem> {
        vec![Self::dokra_figurine(), Self::pattachitra_scroll()]
    }
}
