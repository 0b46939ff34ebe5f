//! PostgreSQL adapter tests
//!
//! These start a container and need Docker:
//! `cargo test -p test_utils -- --ignored`

use rust_decimal_macros::dec;

use domain_invoicing::{
    Invoice, InvoiceDraft, InvoiceNumber, InvoiceQuery, InvoiceStatus, InvoiceStorePort, NewInvoice,
};
use test_utils::{
    assert_money_eq, CustomerFixtures, InvoiceDraftBuilder, ShippingFixtures, TestDatabase,
};

fn numbered(draft: &InvoiceDraft, sequence: u32) -> NewInvoice {
    let preview = draft.compute().unwrap();
    draft.to_new_invoice(InvoiceNumber::format(draft.numbering_year(), sequence), &preview)
}

async fn create(db: &TestDatabase, draft: &InvoiceDraft, sequence: u32) -> Invoice {
    db.adapter().create_invoice(&numbered(draft, sequence)).await.unwrap()
}

// ============================================================================
// Creation and uniqueness
// ============================================================================

mod create_tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_create_round_trips_amounts_and_items() {
        let db = TestDatabase::new().await.unwrap();
        let draft = InvoiceDraftBuilder::new()
            .with_customer(CustomerFixtures::gallery())
            .with_shipping(ShippingFixtures::warehouse())
            .with_advance_percent(dec!(25))
            .with_notes("Handle with care")
            .build();

        let invoice = create(&db, &draft, 1).await;
        let found = db.adapter().find_invoice(invoice.id).await.unwrap();

        assert_eq!(found.invoice_number.as_str(), "2024/25-INV-0001");
        assert_eq!(found.items.len(), 2);
        assert_eq!(found.items[1].discount_percent, dec!(10));
        assert_eq!(found.customer.gstin.as_deref(), Some("29ABCDE1234F1Z5"));
        assert_eq!(found.shipping, draft.shipping);
        assert_money_eq(&found.totals.grand_total, dec!(7392.00));
        assert_money_eq(&found.totals.advance_amount, dec!(1848.00));
        assert_money_eq(&found.totals.balance_due, dec!(5544.00));
        assert_eq!(found.total_in_words, "Seven Thousand Three Hundred and Ninety-Two Only");
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_duplicate_number_is_conflict() {
        let db = TestDatabase::new().await.unwrap();
        let draft = InvoiceDraftBuilder::new().build();

        create(&db, &draft, 1).await;
        let err = db.adapter().create_invoice(&numbered(&draft, 1)).await.unwrap_err();

        assert!(err.is_conflict(), "expected conflict, got {err}");
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_customer_is_reused_by_phone() {
        let db = TestDatabase::new().await.unwrap();
        let draft = InvoiceDraftBuilder::new().build();

        create(&db, &draft, 1).await;
        create(&db, &draft, 2).await;

        let customers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(customers, 1);
    }
}

// ============================================================================
// Lookup, payment, listing
// ============================================================================

mod query_tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_latest_number_is_newest_for_prefix() {
        let db = TestDatabase::new().await.unwrap();
        let draft_2024 = InvoiceDraftBuilder::new().build();
        let draft_2025 = InvoiceDraftBuilder::new().in_year(2025).build();

        create(&db, &draft_2024, 1).await;
        create(&db, &draft_2024, 2).await;
        create(&db, &draft_2025, 1).await;

        let adapter = db.adapter();
        let latest = adapter.latest_invoice_number("2024/").await.unwrap();
        assert_eq!(latest, Some(InvoiceNumber::format(2024, 2)));
        assert_eq!(adapter.latest_invoice_number("2026/").await.unwrap(), None);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_paid_update_is_persisted() {
        let db = TestDatabase::new().await.unwrap();
        let draft = InvoiceDraftBuilder::new().with_advance_amount(dec!(1000)).build();
        let mut invoice = create(&db, &draft, 1).await;

        invoice
            .apply_payment(&domain_invoicing::PaymentUpdate {
                status: Some(InvoiceStatus::Paid),
                advance_paid: None,
            })
            .unwrap();
        db.adapter().update_invoice(&invoice).await.unwrap();

        let found = db.adapter().find_invoice(invoice.id).await.unwrap();
        assert_eq!(found.status, InvoiceStatus::Paid);
        assert_money_eq(&found.totals.balance_due, dec!(0));
        assert_money_eq(&found.totals.advance_amount, dec!(0));
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_list_filters_by_status_and_search() {
        let db = TestDatabase::new().await.unwrap();
        let pending = InvoiceDraftBuilder::new()
            .with_customer(CustomerFixtures::gallery())
            .with_status(InvoiceStatus::Pending)
            .build();
        let draft = InvoiceDraftBuilder::new().build();

        create(&db, &draft, 1).await;
        create(&db, &pending, 2).await;

        let adapter = db.adapter();
        let by_status = adapter
            .list_invoices(&InvoiceQuery::by_status(InvoiceStatus::Pending))
            .await
            .unwrap();
        assert_eq!(by_status.len(), 1);
        assert_eq!(by_status[0].customer.name, "Kalakriti Gallery");

        let by_search = adapter
            .list_invoices(&InvoiceQuery::default().search("ananya"))
            .await
            .unwrap();
        assert_eq!(by_search.len(), 1);
        assert_eq!(by_search[0].invoice_number.as_str(), "2024/25-INV-0001");

        let all = adapter.list_invoices(&InvoiceQuery::default()).await.unwrap();
        assert_eq!(all[0].invoice_number.as_str(), "2024/25-INV-0002");
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_missing_invoice_is_not_found() {
        let db = TestDatabase::new().await.unwrap();
        let err = db
            .adapter()
            .find_invoice(core_kernel::InvoiceId::new(404))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
