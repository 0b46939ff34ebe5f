//! Router tests against the in-memory invoice store

use std::str::FromStr;
use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use interface_api::{config::ApiConfig, create_router};
use test_utils::InMemoryInvoiceStore;

fn server_with(store: Arc<InMemoryInvoiceStore>) -> TestServer {
    TestServer::new(create_router(store, ApiConfig::default())).unwrap()
}

fn server() -> TestServer {
    server_with(Arc::new(InMemoryInvoiceStore::new()))
}

fn decimal_at(body: &Value, pointer: &str) -> Decimal {
    let raw = body
        .pointer(pointer)
        .unwrap_or_else(|| panic!("missing {pointer} in {body}"));
    match raw {
        Value::String(s) => Decimal::from_str(s).unwrap(),
        other => Decimal::from_str(&other.to_string()).unwrap(),
    }
}

fn order() -> Value {
    json!({
        "customer": { "name": "Ananya Rao", "phone_number": "9845012345" },
        "invoice_date": "2024-06-01",
        "due_date": "2024-06-16",
        "items": [
            { "product_id": 101, "name": "Dokra Figurine", "unit_price": "1500.00", "quantity": 2 },
            { "product_id": 102, "name": "Pattachitra Scroll", "unit_price": "4000.00", "quantity": 1, "discount_percent": "10" }
        ]
    })
}

// ============================================================================
// Health
// ============================================================================

mod health_tests {
    use super::*;

    #[tokio::test]
    async fn test_health() {
        let response = server().get("/health").await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["status"], "healthy");
    }

    #[tokio::test]
    async fn test_readiness_reports_unavailable_store() {
        let store = Arc::new(InMemoryInvoiceStore::new());
        store.set_available(false);

        let response = server_with(store).get("/health/ready").await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    }
}

// ============================================================================
// Preview
// ============================================================================

mod preview_tests {
    use super::*;

    #[tokio::test]
    async fn test_preview_computes_totals_and_words() {
        let response = server().post("/api/v1/invoices/preview").json(&order()).await;
        response.assert_status_ok();
        let body = response.json::<Value>();

        assert_eq!(decimal_at(&body, "/totals/subtotal"), dec!(6600));
        assert_eq!(decimal_at(&body, "/totals/total_discount"), dec!(400));
        assert_eq!(decimal_at(&body, "/totals/cgst"), dec!(396));
        assert_eq!(decimal_at(&body, "/totals/sgst"), dec!(396));
        assert_eq!(decimal_at(&body, "/totals/grand_total"), dec!(7392));
        assert_eq!(body["totals"]["grand_total_formatted"], "7,392.00");
        assert_eq!(body["total_in_words"], "Seven Thousand Three Hundred and Ninety-Two Only");
        assert_eq!(body["lines"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_preview_does_not_store() {
        let store = Arc::new(InMemoryInvoiceStore::new());
        server_with(store.clone())
            .post("/api/v1/invoices/preview")
            .json(&order())
            .await
            .assert_status_ok();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_tax_free_preview() {
        let mut body = order();
        body["include_tax"] = json!(false);

        let response = server().post("/api/v1/invoices/preview").json(&body).await;
        let body = response.json::<Value>();

        assert_eq!(decimal_at(&body, "/totals/cgst"), dec!(0));
        assert_eq!(decimal_at(&body, "/totals/grand_total"), dec!(6600));
    }

    #[tokio::test]
    async fn test_paid_status_zeroes_balance() {
        let mut body = order();
        body["status"] = json!("paid");
        body["advance_percent"] = json!("50");

        let response = server().post("/api/v1/invoices/preview").json(&body).await;
        let body = response.json::<Value>();

        assert_eq!(decimal_at(&body, "/totals/grand_total"), dec!(7392));
        assert_eq!(decimal_at(&body, "/totals/advance_amount"), dec!(0));
        assert_eq!(decimal_at(&body, "/totals/balance_due"), dec!(0));
    }

    #[tokio::test]
    async fn test_zero_quantity_is_rejected() {
        let mut body = order();
        body["items"][0]["quantity"] = json!(0);

        let response = server().post("/api/v1/invoices/preview").json(&body).await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.json::<Value>()["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_both_advance_modes_rejected() {
        let mut body = order();
        body["advance_percent"] = json!("10");
        body["advance_amount"] = json!("100");

        let response = server().post("/api/v1/invoices/preview").json(&body).await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_unknown_status_is_bad_request() {
        let mut body = order();
        body["status"] = json!("SHIPPED");

        let response = server().post("/api/v1/invoices/preview").json(&body).await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_amount_beyond_decimal_range_is_bad_request() {
        let mut body = order();
        body["items"][0]["unit_price"] = json!("79228162514264337593543950335");

        let response = server().post("/api/v1/invoices/preview").json(&body).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["error"], "bad_request");
    }

    #[tokio::test]
    async fn test_invoice_discount_shows_in_line_breakdown() {
        let body = json!({
            "customer": { "name": "Ananya Rao", "phone_number": "9845012345" },
            "invoice_date": "2024-06-01",
            "include_tax": false,
            "discount_percent": "10",
            "items": [
                { "product_id": 101, "name": "Dokra Figurine", "unit_price": "100", "quantity": 1 }
            ]
        });

        let preview = server().post("/api/v1/invoices/preview").json(&body).await.json::<Value>();
        assert_eq!(decimal_at(&preview, "/totals/subtotal"), dec!(90));
        assert_eq!(decimal_at(&preview, "/lines/0/line_total"), dec!(90));

        let created = server().post("/api/v1/invoices").json(&body).await.json::<Value>();
        assert_eq!(decimal_at(&created, "/items/0/discount_percent"), dec!(10));
        assert_eq!(decimal_at(&created, "/items/0/line_total"), dec!(90));
    }
}

// ============================================================================
// Issuing and numbering
// ============================================================================

mod issue_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_allocates_sequential_numbers() {
        let server = server();

        let first = server.post("/api/v1/invoices").json(&order()).await;
        first.assert_status(StatusCode::CREATED);
        let second = server.post("/api/v1/invoices").json(&order()).await;

        assert_eq!(first.json::<Value>()["invoice_number"], "2024/25-INV-0001");
        assert_eq!(second.json::<Value>()["invoice_number"], "2024/25-INV-0002");
    }

    #[tokio::test]
    async fn test_next_number_previews_without_reserving() {
        let server = server();

        let response = server
            .get("/api/v1/invoices/next-number")
            .add_query_param("year", 2024)
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["invoice_number"], "2024/25-INV-0001");

        server.post("/api/v1/invoices").json(&order()).await;
        let response = server
            .get("/api/v1/invoices/next-number")
            .add_query_param("year", 2024)
            .await;
        assert_eq!(response.json::<Value>()["invoice_number"], "2024/25-INV-0002");
    }

    #[tokio::test]
    async fn test_get_and_missing_invoice() {
        let server = server();
        let created = server.post("/api/v1/invoices").json(&order()).await.json::<Value>();
        let id = created["id"].as_i64().unwrap();

        let found = server.get(&format!("/api/v1/invoices/{id}")).await;
        found.assert_status_ok();
        assert_eq!(found.json::<Value>()["invoice_number"], created["invoice_number"]);

        server
            .get("/api/v1/invoices/9999")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_store_outage_is_server_error() {
        let store = Arc::new(InMemoryInvoiceStore::new());
        store.set_available(false);

        let response = server_with(store).post("/api/v1/invoices").json(&order()).await;
        assert!(response.status_code().is_server_error());
    }
}

// ============================================================================
// Payments
// ============================================================================

mod payment_tests {
    use super::*;

    #[tokio::test]
    async fn test_advance_then_paid() {
        let server = server();
        let created = server.post("/api/v1/invoices").json(&order()).await.json::<Value>();
        let id = created["id"].as_i64().unwrap();

        let partial = server
            .put(&format!("/api/v1/invoices/{id}/payment"))
            .json(&json!({ "advance_paid": "2000", "status": "PENDING" }))
            .await;
        partial.assert_status_ok();
        let body = partial.json::<Value>();
        assert_eq!(body["status"], "PENDING");
        assert_eq!(decimal_at(&body, "/totals/balance_due"), dec!(5392));

        let paid = server
            .put(&format!("/api/v1/invoices/{id}/payment"))
            .json(&json!({ "status": "PAID" }))
            .await
            .json::<Value>();
        assert_eq!(paid["status"], "PAID");
        assert_eq!(decimal_at(&paid, "/totals/advance_amount"), dec!(0));
        assert_eq!(decimal_at(&paid, "/totals/balance_due"), dec!(0));
    }

    #[tokio::test]
    async fn test_negative_advance_rejected() {
        let server = server();
        let created = server.post("/api/v1/invoices").json(&order()).await.json::<Value>();
        let id = created["id"].as_i64().unwrap();

        server
            .put(&format!("/api/v1/invoices/{id}/payment"))
            .json(&json!({ "advance_paid": "-1" }))
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }
}

// ============================================================================
// Listing
// ============================================================================

mod list_tests {
    use super::*;

    #[tokio::test]
    async fn test_list_filters_by_status_and_search() {
        let server = server();
        server.post("/api/v1/invoices").json(&order()).await;

        let mut pending = order();
        pending["customer"] = json!({ "name": "Kalakriti Gallery", "phone_number": "9811122233" });
        pending["status"] = json!("PENDING");
        server.post("/api/v1/invoices").json(&pending).await;

        let all = server.get("/api/v1/invoices").await.json::<Value>();
        assert_eq!(all.as_array().unwrap().len(), 2);
        assert_eq!(all[0]["invoice_number"], "2024/25-INV-0002");

        let by_status = server
            .get("/api/v1/invoices")
            .add_query_param("status", "pending")
            .await
            .json::<Value>();
        assert_eq!(by_status.as_array().unwrap().len(), 1);

        let by_search = server
            .get("/api/v1/invoices")
            .add_query_param("search", "ananya")
            .await
            .json::<Value>();
        assert_eq!(by_search.as_array().unwrap().len(), 1);
        assert_eq!(by_search[0]["customer"]["name"], "Ananya Rao");
    }
}

// ============================================================================
// Amount in words
// ============================================================================

mod words_tests {
    use super::*;

    #[tokio::test]
    async fn test_amount_in_words() {
        let response = server()
            .get("/api/v1/amount-in-words")
            .add_query_param("amount", "1234567.89")
            .await;
        response.assert_status_ok();
        let body = response.json::<Value>();

        assert_eq!(
            body["words"],
            "Twelve Lakh Thirty-Four Thousand Five Hundred and Sixty-Seven and Eighty-Nine Paise"
        );
        assert!(body["line"].as_str().unwrap().ends_with(" Only"));
    }
}
