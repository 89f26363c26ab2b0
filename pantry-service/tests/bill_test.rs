mod common;

use common::TestApp;
use pantry_service::models::{BillOutcome, BillReport, RowLabel};
use rust_decimal_macros::dec;
use serde_json::{json, Value};

async fn seeded_app() -> TestApp {
    let app = TestApp::spawn().await;
    app.set_rate("Tea", dec!(10)).await;
    app.set_rate("Coffee", dec!(15)).await;
    app.set_rate("Lays", dec!(20)).await;
    app
}

#[tokio::test]
async fn bill_nets_returns_and_adds_gst() {
    let app = seeded_app().await;
    app.record_ok("2024-01-05", "A1", "100", "Tea", 2, "Issued").await;
    app.record_ok("2024-01-05", "A1", "100", "Tea", 1, "Returned").await;
    app.record_ok("2024-01-05", "A1", "100", "Mentos", 3, "Issued").await;

    let report: BillReport = app.admin_get("/bills").await.json().await.unwrap();
    assert!(report.warnings.is_empty());

    let BillOutcome::Ready(bill) = report.outcome else {
        panic!("expected a bill");
    };
    assert_eq!(bill.items, vec!["Tea", "Coffee", "Lays"]);
    assert_eq!(bill.rows.len(), 1);

    let row = &bill.rows[0];
    assert_eq!(bill.quantity(row, "Tea"), Some(1));
    assert_eq!(bill.quantity(row, "Coffee"), Some(0));
    assert_eq!(row.subtotal, dec!(10.00));
    assert_eq!(row.tax, dec!(0.50));
    assert_eq!(row.total, dec!(10.50));

    let total = bill.total_row.expect("total row on by default");
    assert_eq!(total.label, RowLabel::Total);
    assert_eq!(total.total, dec!(10.50));
}

#[tokio::test]
async fn bill_without_entries_is_empty_input() {
    let app = seeded_app().await;

    let body: Value = app.admin_get("/bills").await.json().await.unwrap();
    assert_eq!(body["outcome"], json!({ "status": "empty_input" }));
}

#[tokio::test]
async fn bill_window_excludes_old_entries() {
    let app = seeded_app().await;
    app.record_ok("2020-01-05", "A1", "100", "Tea", 1, "Issued").await;

    let report: BillReport = app
        .admin_get("/bills?window=this_month")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(report.outcome, BillOutcome::EmptyInput);
}

#[tokio::test]
async fn export_is_a_csv_attachment() {
    let app = seeded_app().await;
    app.record_ok("2024-01-05", "A1", "007", "Tea", 1, "Issued").await;
    app.record_ok("2024-01-06", "B2", "008", "Coffee", 2, "Issued").await;

    let response = app.admin_get("/bills/export?amounts=true").await;
    assert_eq!(response.status().as_u16(), 200);

    let headers = response.headers().clone();
    assert!(headers["content-type"].to_str().unwrap().starts_with("text/csv"));
    assert!(headers["content-disposition"]
        .to_str()
        .unwrap()
        .contains("Pantry_Final_Billing.csv"));
    assert_eq!(headers["cache-control"], "no-store");

    let text = response.text().await.unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "Date,APM ID,Coupon No,Tea,Tea Amount,Coffee,Coffee Amount,Lays,Lays Amount,Subtotal,GST 5%,Total"
    );
    assert_eq!(lines[1], "2024-01-05,A1,007,1,10.00,0,0.00,0,0.00,10.00,0.50,10.50");
    assert_eq!(lines[2], "2024-01-06,B2,008,0,0.00,2,30.00,0,0.00,30.00,1.50,31.50");
    assert_eq!(lines[3], "Total,,,1,10.00,2,30.00,0,0.00,40.00,2.00,42.00");
}

#[tokio::test]
async fn export_without_total_row_or_entries() {
    let app = seeded_app().await;

    let text = app
        .admin_get("/bills/export?total_row=false")
        .await
        .text()
        .await
        .unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines, vec!["Date,APM ID,Coupon No,Tea,Coffee,Lays,Subtotal,GST 5%,Total"]);
}

#[tokio::test]
async fn usage_reports_issued_returned_and_net() {
    let app = seeded_app().await;
    app.record_ok("2024-01-05", "A1", "1", "Tea", 4, "Issued").await;
    app.record_ok("2024-01-06", "A1", "2", "Tea", 1, "Returned").await;
    app.record_ok("2024-01-06", "B2", "3", "Lays", 2, "Issued").await;

    let body: Value = app.admin_get("/usage?person=a1").await.json().await.unwrap();
    assert_eq!(
        body["rows"],
        json!([{ "person_id": "A1", "item": "Tea", "issued": 4, "returned": 1, "net": 3 }])
    );
}
